//! Host coordinator error types.

use std::path::PathBuf;

use thiserror::Error;

use autopilot_browser::CdpError;

/// Errors from the host side: state persistence, locks, coordination.
#[derive(Debug, Error)]
pub enum HostError {
    /// State file could not be read.
    #[error("Failed to read state at {path}: {reason}")]
    StateRead { path: PathBuf, reason: String },

    /// State file could not be written.
    #[error("Failed to write state at {path}: {reason}")]
    StateWrite { path: PathBuf, reason: String },

    /// State payload did not parse.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level failure talking to an endpoint.
    #[error(transparent)]
    Cdp(#[from] CdpError),

    /// No writable location for host state.
    #[error("No home directory available for state storage")]
    NoStateDir,
}
