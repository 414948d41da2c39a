//! Page DOM abstraction.
//!
//! The agent never touches a real DOM. It sees the page through [`PageDom`]:
//! flattened selector queries and click dispatch. Implementations are expected
//! to enumerate the root document plus every same-origin nested
//! `iframe`/`frame` document, concatenating per-document results in document
//! order, frame-depth-first. Cross-origin subtrees are silently omitted;
//! partial visibility is normal and never an error.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AgentError;

/// Opaque handle to an element found by the most recent scan.
///
/// Handles are only valid until the next scan; clicking a stale handle is a
/// no-op failure, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub u64);

/// Snapshot of one candidate element, as observed at scan time.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementInfo {
    /// Handle for a later click.
    #[serde(rename = "token")]
    pub handle: ElementHandle,
    /// Trimmed text content.
    #[serde(default)]
    pub text: String,
    /// Associated command string, when the control carries one (terminal
    /// command approvals). Falls back to `text` for deny-list matching.
    #[serde(default)]
    pub command_text: Option<String>,
    /// Computed `display: none`.
    #[serde(default)]
    pub display_none: bool,
    /// Rendered width in CSS pixels.
    #[serde(default)]
    pub width: f64,
    /// Computed `pointer-events: none`.
    #[serde(default)]
    pub pointer_events_none: bool,
    /// `disabled` attribute/property.
    #[serde(default)]
    pub disabled: bool,
}

impl ElementInfo {
    /// Whether the element is visually enabled: rendered, clickable, and not
    /// disabled.
    pub fn is_enabled(&self) -> bool {
        !self.display_none && self.width > 0.0 && !self.pointer_events_none && !self.disabled
    }

    /// Text the deny-list is matched against.
    pub fn command_or_text(&self) -> &str {
        self.command_text.as_deref().unwrap_or(&self.text)
    }
}

/// Frame-flattened view of the page.
#[async_trait]
pub trait PageDom: Send + Sync {
    /// Query all documents for a selector and return element snapshots.
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, AgentError>;

    /// Dispatch a synthetic click on a previously scanned element.
    ///
    /// Returns `false` when the element has since been removed; the tick
    /// carries on.
    async fn click(&self, handle: ElementHandle) -> Result<bool, AgentError>;
}
