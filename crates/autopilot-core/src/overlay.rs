//! Overlay reconciliation.
//!
//! The overlay is a floating panel listing every tracked conversation with a
//! status and elapsed time. The renderer owns the diff: it compares the
//! tracker's current labels against the slots it has already materialized and
//! issues only incremental create/update/remove operations. The panel itself
//! is created once per show and never rebuilt while visible.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::tracker::{CompletionState, ConversationTracker};

/// Visual status of an overlay slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Waiting,
    Working,
    Done,
}

impl From<CompletionState> for SlotStatus {
    fn from(state: CompletionState) -> Self {
        match state {
            CompletionState::Waiting => SlotStatus::Waiting,
            CompletionState::Working => SlotStatus::Working,
            CompletionState::Done => SlotStatus::Done,
        }
    }
}

/// The drawing surface the renderer issues operations to.
///
/// The production implementation manipulates overlay DOM nodes through the
/// injected helper; tests record the operations.
#[async_trait]
pub trait OverlaySurface: Send + Sync {
    /// Create the overlay root anchored to the given panel. Must be
    /// idempotent: a second show while visible is a no-op.
    async fn show(&self, panel_selector: &str) -> Result<(), AgentError>;

    /// Display the "scanning for conversations" placeholder.
    async fn set_waiting(&self) -> Result<(), AgentError>;

    /// Create or in-place update the slot for a label.
    async fn upsert_slot(
        &self,
        label: &str,
        status: SlotStatus,
        elapsed_secs: u64,
    ) -> Result<(), AgentError>;

    /// Remove the slot for a vanished label.
    async fn remove_slot(&self, label: &str) -> Result<(), AgentError>;

    /// Fade out and remove the overlay root.
    async fn hide(&self) -> Result<(), AgentError>;
}

/// Incremental overlay renderer.
pub struct OverlayRenderer {
    surface: std::sync::Arc<dyn OverlaySurface>,
    panel_selector: String,
    shown: bool,
    /// Labels currently materialized as visual slots, in render order.
    rendered: Vec<String>,
}

impl OverlayRenderer {
    pub fn new(surface: std::sync::Arc<dyn OverlaySurface>, panel_selector: &str) -> Self {
        Self {
            surface,
            panel_selector: panel_selector.to_string(),
            shown: false,
            rendered: Vec::new(),
        }
    }

    /// Ensure the overlay root exists. Safe to call every tick.
    pub async fn show(&mut self) -> Result<(), AgentError> {
        if self.shown {
            return Ok(());
        }
        self.surface.show(&self.panel_selector).await?;
        self.surface.set_waiting().await?;
        self.shown = true;
        Ok(())
    }

    /// Reconcile the visual slots against the tracker.
    ///
    /// After this returns, the number of visual slots equals the number of
    /// distinct tracked labels: removals happen before upserts, and upserts
    /// update in place rather than recreating.
    pub async fn update(&mut self, tracker: &ConversationTracker) -> Result<(), AgentError> {
        if !self.shown {
            return Ok(());
        }

        if tracker.is_empty() {
            for label in std::mem::take(&mut self.rendered) {
                self.surface.remove_slot(&label).await?;
            }
            self.surface.set_waiting().await?;
            return Ok(());
        }

        let current: Vec<String> = tracker.labels().iter().map(|l| l.to_string()).collect();

        let stale: Vec<String> = self
            .rendered
            .iter()
            .filter(|label| !current.contains(*label))
            .cloned()
            .collect();
        for label in stale {
            self.surface.remove_slot(&label).await?;
        }

        for slot in tracker.slots() {
            let elapsed = slot.first_seen_at.elapsed().as_secs();
            self.surface
                .upsert_slot(&slot.label, slot.state.into(), elapsed)
                .await?;
        }

        self.rendered = current;
        Ok(())
    }

    /// Tear down the overlay. Safe to call when not shown.
    pub async fn hide(&mut self) -> Result<(), AgentError> {
        if !self.shown {
            return Ok(());
        }
        self.surface.hide().await?;
        self.shown = false;
        self.rendered.clear();
        Ok(())
    }

    /// Whether the overlay root currently exists.
    pub fn is_shown(&self) -> bool {
        self.shown
    }
}

#[cfg(test)]
#[path = "overlay_tests.rs"]
mod tests;
