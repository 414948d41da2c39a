//! Agent error types.

use thiserror::Error;

/// Errors surfaced by the agent core.
///
/// Most DOM faults are swallowed at the traversal layer (a vanished frame or
/// element is expected, not exceptional); what reaches this enum is the
/// transport telling us the page itself is gone.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A DOM query could not be executed at all.
    #[error("DOM query failed: {0}")]
    Dom(String),

    /// An overlay operation could not be executed.
    #[error("overlay operation failed: {0}")]
    Overlay(String),

    /// The hosting page/target is no longer reachable.
    #[error("page detached")]
    PageDetached,

    /// Malformed data returned by the DOM surface.
    #[error("invalid DOM payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}
