//! Session analytics.
//!
//! Counters live on the click path: every dispatched click and every withheld
//! banned click is tracked here, categorized as file-edit or terminal-command,
//! and attributed as an "away action" when the IDE window was unfocused at
//! click time. Counters are session-scoped and reset on collection.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::classify::ActionCategory;

/// Rough seconds of human attention saved per auto-click, used for the
/// estimated-time-saved figures.
pub const SECONDS_PER_CLICK: u64 = 5;

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub clicks: u64,
    pub blocked: u64,
    pub file_edits: u64,
    pub terminal_commands: u64,
    pub actions_while_away: u64,
}

/// Session summary derived from a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub clicks: u64,
    pub file_edits: u64,
    pub terminal_commands: u64,
    pub blocked: u64,
    /// Estimated minutes saved as an inclusive (low, high) range; `None` when
    /// there were no clicks.
    pub estimated_minutes_saved: Option<(u64, u64)>,
}

/// Thread-safe session counters shared between the agent loop and the
/// coordinator's collection timer.
#[derive(Debug, Default)]
pub struct Analytics {
    clicks: AtomicU64,
    blocked: AtomicU64,
    file_edits: AtomicU64,
    terminal_commands: AtomicU64,
    actions_while_away: AtomicU64,
    window_focused: AtomicBool,
}

impl Analytics {
    pub fn new() -> Self {
        let analytics = Self::default();
        analytics.window_focused.store(true, Ordering::SeqCst);
        analytics
    }

    /// Record a dispatched click. Returns `true` when it counted as an away
    /// action.
    pub fn track_click(&self, category: ActionCategory) -> bool {
        self.clicks.fetch_add(1, Ordering::SeqCst);
        match category {
            ActionCategory::TerminalCommand => {
                self.terminal_commands.fetch_add(1, Ordering::SeqCst);
            }
            ActionCategory::FileEdit => {
                self.file_edits.fetch_add(1, Ordering::SeqCst);
            }
        }

        let away = !self.window_focused.load(Ordering::SeqCst);
        if away {
            self.actions_while_away.fetch_add(1, Ordering::SeqCst);
        }
        away
    }

    /// Record a withheld banned click.
    pub fn track_blocked(&self) {
        self.blocked.fetch_add(1, Ordering::SeqCst);
    }

    /// Update the focus flag from the host's focus-change subscription.
    pub fn set_focused(&self, focused: bool) {
        self.window_focused.store(focused, Ordering::SeqCst);
    }

    pub fn is_focused(&self) -> bool {
        self.window_focused.load(Ordering::SeqCst)
    }

    /// Consume-once away-action counter: returns the count and zeroes it.
    pub fn take_away_actions(&self) -> u64 {
        self.actions_while_away.swap(0, Ordering::SeqCst)
    }

    /// Current counter values without resetting.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            clicks: self.clicks.load(Ordering::SeqCst),
            blocked: self.blocked.load(Ordering::SeqCst),
            file_edits: self.file_edits.load(Ordering::SeqCst),
            terminal_commands: self.terminal_commands.load(Ordering::SeqCst),
            actions_while_away: self.actions_while_away.load(Ordering::SeqCst),
        }
    }

    /// Snapshot and zero all counters (collection semantics).
    pub fn reset(&self) -> StatsSnapshot {
        StatsSnapshot {
            clicks: self.clicks.swap(0, Ordering::SeqCst),
            blocked: self.blocked.swap(0, Ordering::SeqCst),
            file_edits: self.file_edits.swap(0, Ordering::SeqCst),
            terminal_commands: self.terminal_commands.swap(0, Ordering::SeqCst),
            actions_while_away: self.actions_while_away.swap(0, Ordering::SeqCst),
        }
    }

    /// Derive the session summary from the live counters.
    pub fn session_summary(&self) -> SessionSummary {
        summarize(&self.snapshot())
    }
}

/// Derive a summary from a snapshot.
///
/// The time estimate assumes [`SECONDS_PER_CLICK`] per click with a ±20 %
/// band, floored at one minute once there is at least one click.
pub fn summarize(snapshot: &StatsSnapshot) -> SessionSummary {
    let estimated = if snapshot.clicks > 0 {
        let base_secs = snapshot.clicks * SECONDS_PER_CLICK;
        let low = ((base_secs as f64 * 0.8) / 60.0).floor() as u64;
        let high = ((base_secs as f64 * 1.2) / 60.0).ceil() as u64;
        Some((low.max(1), high))
    } else {
        None
    };

    SessionSummary {
        clicks: snapshot.clicks,
        file_edits: snapshot.file_edits,
        terminal_commands: snapshot.terminal_commands,
        blocked: snapshot.blocked,
        estimated_minutes_saved: estimated,
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
