//! Agent lifecycle: session epochs, start/stop, supersession.
//!
//! The epoch is the system's only cancellation mechanism. A loop captures the
//! epoch at spawn time and, on every wake, keeps going only while the global
//! running flag is set and the live epoch still equals its captured one.
//! Stopping or superseding therefore never races the loop mid-tick: the stale
//! loop finishes its current tick and exits silently on its next check, at
//! worst one tick interval later.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::agent_loop::AgentLoop;
use crate::config::AgentConfig;
use crate::dom::PageDom;
use crate::overlay::OverlaySurface;
use crate::stats::Analytics;

/// State shared between the handle and every loop it has ever spawned.
#[derive(Debug)]
pub(crate) struct SessionState {
    running: AtomicBool,
    epoch: AtomicU64,
    /// Live configuration. Loops re-read this each tick, so interval and
    /// deny-list changes apply without a restart; only mode changes supersede.
    config: RwLock<AgentConfig>,
}

impl SessionState {
    fn new(config: AgentConfig) -> Self {
        Self {
            running: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            config: RwLock::new(config),
        }
    }

    /// Liveness check for a loop holding a captured epoch.
    pub(crate) fn is_live(&self, captured_epoch: u64) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.epoch.load(Ordering::SeqCst) == captured_epoch
    }

    pub(crate) fn config(&self) -> AgentConfig {
        self.config.read().clone()
    }
}

/// The `{flavor, background}` tuple that identifies a running mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunKey {
    flavor: crate::flavor::IdeFlavor,
    background: bool,
}

/// Outcome of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new loop was launched under the given epoch.
    Started { epoch: u64 },
    /// Already running in the requested mode; configuration was refreshed in
    /// place and no epoch change occurred.
    Unchanged,
}

/// Handle to the agent driving one page.
pub struct AgentHandle {
    state: Arc<SessionState>,
    analytics: Arc<Analytics>,
    dom: Arc<dyn PageDom>,
    overlay: Arc<dyn OverlaySurface>,
    current: Mutex<Option<RunKey>>,
}

impl AgentHandle {
    pub fn new(dom: Arc<dyn PageDom>, overlay: Arc<dyn OverlaySurface>) -> Self {
        Self {
            state: Arc::new(SessionState::new(AgentConfig::default())),
            analytics: Arc::new(Analytics::new()),
            dom,
            overlay,
            current: Mutex::new(None),
        }
    }

    /// Start (or restart) the agent with the given configuration.
    ///
    /// Idempotent per `{ide_flavor, background_mode}`: starting again in the
    /// same mode refreshes the live config and returns
    /// [`StartOutcome::Unchanged`]. A different mode increments the epoch,
    /// momentarily drops the running flag, re-asserts it under the new epoch
    /// and launches the matching loop variant; the superseded loop observes
    /// the stale epoch on its next wake and exits.
    pub fn start(&self, config: AgentConfig) -> StartOutcome {
        let key = RunKey {
            flavor: config.ide_flavor,
            background: config.effective_background_mode(),
        };

        let mut current = self.current.lock();
        *self.state.config.write() = config;

        if self.state.running.load(Ordering::SeqCst) && *current == Some(key) {
            debug!(flavor = ?key.flavor, background = key.background, "agent already running, config refreshed");
            return StartOutcome::Unchanged;
        }

        // Supersede: stale loops must observe either the dropped flag or the
        // bumped epoch, whichever they read first.
        self.state.running.store(false, Ordering::SeqCst);
        let epoch = self.state.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.running.store(true, Ordering::SeqCst);
        *current = Some(key);

        info!(epoch, flavor = ?key.flavor, background = key.background, "starting agent loop");

        let agent_loop = AgentLoop::new(
            self.dom.clone(),
            self.overlay.clone(),
            self.state.clone(),
            self.analytics.clone(),
            key.flavor,
            key.background,
            epoch,
        );
        tokio::spawn(agent_loop.run());

        StartOutcome::Started { epoch }
    }

    /// Stop the agent and tear down the overlay once.
    ///
    /// The running loop self-terminates on its next liveness check; stopping
    /// is bounded by one tick's sleep, not instantaneous.
    pub async fn stop(&self) {
        let was_running = self.state.running.swap(false, Ordering::SeqCst);
        *self.current.lock() = None;
        if was_running {
            info!("agent stopped");
            if let Err(e) = self.overlay.hide().await {
                debug!("overlay teardown failed: {e}");
            }
        }
    }

    /// Current session epoch.
    pub fn epoch(&self) -> u64 {
        self.state.epoch.load(Ordering::SeqCst)
    }

    /// Whether a loop is currently authorized to run.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// The session analytics shared with the loop.
    pub fn analytics(&self) -> &Arc<Analytics> {
        &self.analytics
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
