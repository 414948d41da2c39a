//! Host side of autopilot.
//!
//! The agent loop in `autopilot-core` drives one page; this crate runs the
//! machine-level machinery around it: discovering IDE debugging endpoints,
//! attaching an agent to each workbench page, lease locks between
//! concurrently running instances, relaunch prompting, and weekly ROI
//! accounting.

pub mod coordinator;
pub mod error;
pub mod focus;
pub mod lock;
pub mod relaunch;
pub mod roi;
pub mod store;

pub use coordinator::{Coordinator, CoordinatorOptions, STATS_INTERVAL, SYNC_INTERVAL};
pub use error::HostError;
pub use focus::FocusSignal;
pub use lock::{InstanceLock, LockLease, COORDINATION_LOCK_TIMEOUT, FREE_TIER_LOCK_TIMEOUT};
pub use relaunch::{LogNotifier, Notifier, RelaunchCommand, RelaunchGate, RELAUNCH_COOLDOWN};
pub use roi::{RoiStats, RoiTracker};
pub use store::{FileStore, HostState, MemoryStore, StateStore};
