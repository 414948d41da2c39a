//! Lease-based instance locks.
//!
//! Multiple autopilot processes may run on one machine (one per IDE window,
//! or stale ones left over from crashes). A lock is a lease in the shared
//! state document: holder id plus last heartbeat. A lease whose heartbeat is
//! older than the timeout is dead and can be taken over; no explicit release
//! is ever required for correctness, only for promptness.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::HostError;
use crate::store::StateStore;

/// Free-tier single-instance lease timeout.
pub const FREE_TIER_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Cross-window coordination lease timeout.
pub const COORDINATION_LOCK_TIMEOUT: Duration = Duration::from_secs(15);

pub const FREE_TIER_LOCK_KEY: &str = "free-tier-instance";
pub const COORDINATION_LOCK_KEY: &str = "coordinator";

/// A lease in the state document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockLease {
    pub holder_id: String,
    pub last_heartbeat_ms: u64,
}

/// Handle to one named lease lock.
pub struct InstanceLock {
    store: Arc<dyn StateStore>,
    key: String,
    holder_id: String,
    timeout: Duration,
}

impl InstanceLock {
    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            holder_id: uuid::Uuid::new_v4().to_string(),
            timeout,
        }
    }

    pub fn holder_id(&self) -> &str {
        &self.holder_id
    }

    fn now_ms() -> u64 {
        chrono::Utc::now().timestamp_millis() as u64
    }

    /// Try to take (or retake) the lease. Returns whether we now hold it.
    pub fn try_acquire(&self) -> Result<bool, HostError> {
        self.try_acquire_at(Self::now_ms())
    }

    pub fn try_acquire_at(&self, now_ms: u64) -> Result<bool, HostError> {
        let mut state = self.store.load()?;

        if let Some(lease) = state.locks.get(&self.key) {
            let expired =
                now_ms.saturating_sub(lease.last_heartbeat_ms) > self.timeout.as_millis() as u64;
            if lease.holder_id != self.holder_id && !expired {
                debug!(key = %self.key, holder = %lease.holder_id, "lock held elsewhere");
                return Ok(false);
            }
            if expired && lease.holder_id != self.holder_id {
                info!(key = %self.key, stale_holder = %lease.holder_id, "taking over expired lease");
            }
        }

        state.locks.insert(
            self.key.clone(),
            LockLease {
                holder_id: self.holder_id.clone(),
                last_heartbeat_ms: now_ms,
            },
        );
        self.store.save(&state)?;
        Ok(true)
    }

    /// Refresh the lease heartbeat. Returns false when the lease was lost to
    /// another holder in the meantime.
    pub fn heartbeat(&self) -> Result<bool, HostError> {
        self.heartbeat_at(Self::now_ms())
    }

    pub fn heartbeat_at(&self, now_ms: u64) -> Result<bool, HostError> {
        let mut state = self.store.load()?;
        match state.locks.get_mut(&self.key) {
            Some(lease) if lease.holder_id == self.holder_id => {
                lease.last_heartbeat_ms = now_ms;
                self.store.save(&state)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Drop the lease if we hold it.
    pub fn release(&self) -> Result<(), HostError> {
        let mut state = self.store.load()?;
        if state
            .locks
            .get(&self.key)
            .is_some_and(|lease| lease.holder_id == self.holder_id)
        {
            state.locks.remove(&self.key);
            self.store.save(&state)?;
            debug!(key = %self.key, "lock released");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
