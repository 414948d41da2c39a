//! Conversation tracker.
//!
//! Tracks the ordered list of conversation tab labels and a per-label
//! completion state. Labels carry a ticking duration suffix in the UI
//! ("Fix bug 3m"); the suffix is stripped before comparison so a ticking
//! clock never looks like a tab change.

use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Trailing duration suffix: whitespace + digits + s/m/h at end of string.
static TIME_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\d+[smh]$").expect("static regex"));

/// Strip a trailing duration suffix from a tab label.
pub fn strip_time_suffix(label: &str) -> String {
    TIME_SUFFIX.replace(label.trim(), "").trim().to_string()
}

/// Completion state of one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionState {
    /// Seen, not yet driven.
    Waiting,
    /// Actively being driven.
    Working,
    /// Completion signal observed. Never regresses automatically.
    Done,
}

/// Tracked state for one conversation tab.
#[derive(Debug, Clone)]
pub struct ConversationSlot {
    pub label: String,
    pub state: CompletionState,
    /// When the label was first observed. Survives label re-observation so
    /// elapsed time is monotonic while the label exists.
    pub first_seen_at: Instant,
}

/// Stable ordered view of the open conversations.
#[derive(Debug, Default)]
pub struct ConversationTracker {
    slots: Vec<ConversationSlot>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile against the labels of a fresh tab scan.
    ///
    /// Raw labels are suffix-stripped and deduplicated (two tabs collapsing to
    /// the same stripped label are tracked as one slot). Slots for vanished
    /// labels are dropped; surviving slots keep their state and first-seen
    /// timestamp.
    pub fn update_labels<S: AsRef<str>>(&mut self, raw_labels: &[S]) {
        let now = Instant::now();
        let mut labels: Vec<String> = Vec::with_capacity(raw_labels.len());
        for raw in raw_labels {
            let label = strip_time_suffix(raw.as_ref());
            if label.is_empty() || labels.iter().any(|l| l == &label) {
                continue;
            }
            labels.push(label);
        }

        let mut next = Vec::with_capacity(labels.len());
        for label in labels {
            match self.slots.iter().find(|s| s.label == label) {
                Some(existing) => next.push(existing.clone()),
                None => next.push(ConversationSlot {
                    label,
                    state: CompletionState::Waiting,
                    first_seen_at: now,
                }),
            }
        }
        self.slots = next;
    }

    /// Mark a conversation as actively driven. Only upgrades `Waiting`;
    /// a `Done` conversation stays done.
    pub fn mark_working(&mut self, raw_label: &str) {
        let label = strip_time_suffix(raw_label);
        if let Some(slot) = self.slots.iter_mut().find(|s| s.label == label) {
            if slot.state == CompletionState::Waiting {
                slot.state = CompletionState::Working;
            }
        }
    }

    /// Mark a conversation as finished. This is the only transition to
    /// `Done`; absence of the completion signal on later ticks leaves it
    /// untouched.
    pub fn mark_done(&mut self, raw_label: &str) {
        let label = strip_time_suffix(raw_label);
        if let Some(slot) = self.slots.iter_mut().find(|s| s.label == label) {
            slot.state = CompletionState::Done;
        }
    }

    /// Current labels, in tab order.
    pub fn labels(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.label.as_str()).collect()
    }

    /// Current slots, in tab order.
    pub fn slots(&self) -> &[ConversationSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop all tracked state.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
