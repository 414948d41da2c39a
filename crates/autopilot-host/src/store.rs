//! Persistent host state.
//!
//! All cross-process state (lock leases, weekly ROI counters) lives in one
//! JSON document. Every instance on the machine reads and rewrites the whole
//! document; the file is small and contention is resolved by the lease
//! timestamps inside it, not by file locking.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HostError;
use crate::lock::LockLease;
use crate::roi::RoiStats;

/// The machine-wide state document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostState {
    /// Lease locks by key.
    #[serde(default)]
    pub locks: HashMap<String, LockLease>,
    /// Weekly ROI counters.
    #[serde(default)]
    pub roi: RoiStats,
}

/// Storage backend for [`HostState`].
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<HostState, HostError>;
    fn save(&self, state: &HostState) -> Result<(), HostError>;
}

/// JSON file store, default location `~/.autopilot/state.json`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the default per-user location.
    pub fn default_location() -> Result<Self, HostError> {
        let home = dirs::home_dir().ok_or(HostError::NoStateDir)?;
        Ok(Self::new(home.join(".autopilot").join("state.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<HostState, HostError> {
        if !self.path.exists() {
            return Ok(HostState::default());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| HostError::StateRead {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, state: &HostState) -> Result<(), HostError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| HostError::StateWrite {
                path: self.path.clone(),
                reason: format!("Failed to create parent directory: {}", e),
            })?;
        }

        // Write-then-rename so a crash mid-write never leaves a torn file.
        let tmp = self.path.with_extension("json.tmp");
        let payload = serde_json::to_vec_pretty(state)?;
        fs::write(&tmp, payload).map_err(|e| HostError::StateWrite {
            path: tmp.clone(),
            reason: e.to_string(),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| HostError::StateWrite {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        debug!("host state saved to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store for tests and single-process setups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<HostState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<HostState, HostError> {
        Ok(self.state.lock().clone())
    }

    fn save(&self, state: &HostState) -> Result<(), HostError> {
        *self.state.lock() = state.clone();
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
