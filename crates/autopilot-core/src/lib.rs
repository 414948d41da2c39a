//! Autopilot core: the in-page automation agent, expressed as host-side logic.
//!
//! The agent discovers "continue the agent" controls in an IDE's embedded chat
//! UI, classifies them, clicks the safe ones, rotates through conversation
//! tabs, and renders a live overlay. It talks to the page exclusively through
//! the [`dom::PageDom`] and [`overlay::OverlaySurface`] traits so that the
//! transport (CDP in production, fakes in tests) stays out of the loop logic.
//!
//! Cancellation is cooperative: every loop captures a session epoch at start
//! and exits on its next wake when the epoch has moved on. See
//! [`lifecycle::AgentHandle`].

pub mod agent_loop;
pub mod classify;
pub mod config;
pub mod dom;
pub mod error;
pub mod flavor;
pub mod lifecycle;
pub mod overlay;
pub mod stats;
pub mod tracker;

pub use agent_loop::AgentLoop;
pub use classify::{ActionCategory, Classification, DenyList};
pub use config::{AgentConfig, PartialConfig, Tier};
pub use dom::{ElementHandle, ElementInfo, PageDom};
pub use error::AgentError;
pub use flavor::{FlavorSpec, IdeFlavor};
pub use lifecycle::{AgentHandle, StartOutcome};
pub use overlay::{OverlayRenderer, OverlaySurface, SlotStatus};
pub use stats::{Analytics, SessionSummary, StatsSnapshot};
pub use tracker::{CompletionState, ConversationTracker};
