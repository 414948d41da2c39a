//! Relaunch prompting and user-facing notifications.
//!
//! The coordinator never restarts an IDE itself. When a previously healthy
//! endpoint disappears it asks the user to relaunch with debugging enabled,
//! at most once per cooldown window per port.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::roi::RoiStats;

/// Minimum gap between relaunch prompts for the same port.
pub const RELAUNCH_COOLDOWN: Duration = Duration::from_secs(60);

/// The command line a relaunch needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RelaunchCommand {
    pub fn for_port(program: &str, port: u16) -> Self {
        Self {
            program: program.to_string(),
            args: vec![format!("--remote-debugging-port={port}")],
        }
    }

    /// Copy-pasteable form for notifications.
    pub fn shell_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// User-facing notification sink.
///
/// The coordinator decides *when* to tell the user something; implementations
/// decide *how* (OS notification, IDE toast, log line).
pub trait Notifier: Send + Sync {
    /// A known endpoint went away; the user should relaunch with this command.
    fn relaunch_prompt(&self, port: u16, command: &RelaunchCommand);

    /// Actions were taken while the window was unfocused.
    fn away_actions(&self, count: u64);

    /// A week of activity finished.
    fn weekly_summary(&self, stats: &RoiStats);

    /// A gated capability was requested on the free tier.
    fn upgrade_required(&self, capability: &str);
}

/// Notifier that writes to the log. The default sink for headless runs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn relaunch_prompt(&self, port: u16, command: &RelaunchCommand) {
        warn!(port, "endpoint lost; relaunch with: {}", command.shell_line());
    }

    fn away_actions(&self, count: u64) {
        info!("handled {count} action(s) while you were away");
    }

    fn weekly_summary(&self, stats: &RoiStats) {
        info!(
            clicks = stats.clicks_this_week,
            blocked = stats.blocked_this_week,
            sessions = stats.sessions_this_week,
            minutes_saved = stats.estimated_minutes_saved(),
            "weekly summary"
        );
    }

    fn upgrade_required(&self, capability: &str) {
        warn!("{capability} requires the pro tier");
    }
}

/// Per-port cooldown gate for relaunch prompts.
#[derive(Debug, Default)]
pub struct RelaunchGate {
    last_prompt_ms: AtomicU64,
}

impl RelaunchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a prompt may fire now; firing arms the cooldown.
    pub fn should_prompt(&self) -> bool {
        self.should_prompt_at(chrono::Utc::now().timestamp_millis() as u64)
    }

    pub fn should_prompt_at(&self, now_ms: u64) -> bool {
        let last = self.last_prompt_ms.load(Ordering::SeqCst);
        if last != 0 && now_ms.saturating_sub(last) < RELAUNCH_COOLDOWN.as_millis() as u64 {
            return false;
        }
        self.last_prompt_ms
            .compare_exchange(last, now_ms, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
