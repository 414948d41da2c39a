//! Host coordinator.
//!
//! One coordinator per autopilot process. Every sync pass it sweeps the
//! debugging port range, connects to endpoints that appeared, prompts for a
//! relaunch when a known endpoint vanishes, attaches an agent to every
//! workbench page, and keeps the injected helper alive across page reloads.
//! A slower cadence folds per-session counters into the weekly ROI totals.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use autopilot_browser::discovery;
use autopilot_browser::{CdpClient, CdpDom};
use autopilot_core::config::{AgentConfig, PartialConfig, Tier};
use autopilot_core::lifecycle::AgentHandle;
use autopilot_core::stats::{summarize, SessionSummary, StatsSnapshot};

use crate::focus::FocusSignal;
use crate::lock::{
    InstanceLock, COORDINATION_LOCK_KEY, COORDINATION_LOCK_TIMEOUT, FREE_TIER_LOCK_KEY,
    FREE_TIER_LOCK_TIMEOUT,
};
use crate::relaunch::{Notifier, RelaunchCommand, RelaunchGate};
use crate::roi::RoiTracker;
use crate::store::StateStore;

/// Endpoint sweep cadence.
pub const SYNC_INTERVAL: Duration = Duration::from_secs(5);

/// ROI collection cadence.
pub const STATS_INTERVAL: Duration = Duration::from_secs(30);

/// Coordinator construction options.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Program name used in relaunch prompts.
    pub ide_program: String,
    /// Initial agent configuration.
    pub initial_config: AgentConfig,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            ide_program: "code".to_string(),
            initial_config: AgentConfig::default(),
        }
    }
}

/// One attached workbench page and its agent.
struct TargetState {
    dom: Arc<CdpDom>,
    agent: AgentHandle,
}

/// One live debugging endpoint and its targets.
struct EndpointState {
    client: Arc<CdpClient>,
    targets: HashMap<String, TargetState>,
}

pub struct Coordinator {
    notifier: Arc<dyn Notifier>,
    roi: RoiTracker,
    coordination_lock: InstanceLock,
    free_lock: InstanceLock,
    endpoints: Mutex<HashMap<u16, EndpointState>>,
    /// Relaunch cooldown gates outlive the endpoint entries they guard, so a
    /// dead endpoint cannot re-prompt every sweep.
    gates: Mutex<HashMap<u16, Arc<RelaunchGate>>>,
    config: RwLock<AgentConfig>,
    ide_program: String,
    /// Driven by per-page focus probes each sweep; external sources may push
    /// through it too.
    focus: FocusSignal,
    /// Whether the free-tier standby notice has already been shown.
    standby_notified: AtomicBool,
    /// Whether the free-tier background-mode notice has already been shown.
    background_notified: AtomicBool,
    in_standby: AtomicBool,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        options: CoordinatorOptions,
        focus: FocusSignal,
    ) -> Self {
        Self {
            notifier,
            roi: RoiTracker::new(store.clone()),
            coordination_lock: InstanceLock::new(
                store.clone(),
                COORDINATION_LOCK_KEY,
                COORDINATION_LOCK_TIMEOUT,
            ),
            free_lock: InstanceLock::new(store, FREE_TIER_LOCK_KEY, FREE_TIER_LOCK_TIMEOUT),
            endpoints: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            config: RwLock::new(options.initial_config),
            ide_program: options.ide_program,
            focus,
            standby_notified: AtomicBool::new(false),
            background_notified: AtomicBool::new(false),
            in_standby: AtomicBool::new(false),
        }
    }

    /// Current agent configuration.
    pub fn config(&self) -> AgentConfig {
        self.config.read().clone()
    }

    /// The focus signal, for sources beyond the built-in page probes.
    pub fn focus(&self) -> &FocusSignal {
        &self.focus
    }

    /// Replace the configuration and run one sweep immediately. Returns the
    /// number of attached workbench targets.
    pub async fn start(&self, config: AgentConfig) -> usize {
        self.note_gated_background(&config);
        *self.config.write() = config;
        self.sync().await;

        let endpoints = self.endpoints.lock().await;
        endpoints.values().map(|e| e.targets.len()).sum()
    }

    /// Merge a partial config over the current one and push the result to
    /// every running agent. Mode changes restart agents; everything else
    /// applies in place.
    pub async fn update_config(&self, partial: PartialConfig) {
        let merged = {
            let mut cfg = self.config.write();
            let merged = partial.apply(&cfg);
            *cfg = merged.clone();
            merged
        };
        info!(?merged, "configuration updated");
        self.note_gated_background(&merged);

        let endpoints = self.endpoints.lock().await;
        for endpoint in endpoints.values() {
            for target in endpoint.targets.values() {
                target.agent.start(merged.clone());
            }
        }
    }

    /// Background mode on the free tier silently runs as simple mode; tell
    /// the user why, once.
    fn note_gated_background(&self, config: &AgentConfig) {
        if config.background_mode
            && !config.effective_background_mode()
            && !self.background_notified.swap(true, Ordering::SeqCst)
        {
            self.notifier.upgrade_required("background mode");
        }
    }

    /// Aggregate session summary across every attached target.
    pub async fn session_summary(&self) -> SessionSummary {
        summarize(&self.aggregate_snapshot(false).await)
    }

    /// Consume-once away-action total across every attached target.
    pub async fn take_away_actions(&self) -> u64 {
        let endpoints = self.endpoints.lock().await;
        let mut total = 0;
        for endpoint in endpoints.values() {
            for target in endpoint.targets.values() {
                total += target.agent.analytics().take_away_actions();
            }
        }
        total
    }

    /// Zero every target's counters and return the combined pre-reset totals.
    pub async fn reset_stats(&self) -> StatsSnapshot {
        self.aggregate_snapshot(true).await
    }

    async fn aggregate_snapshot(&self, reset: bool) -> StatsSnapshot {
        let endpoints = self.endpoints.lock().await;
        let mut total = StatsSnapshot::default();
        for endpoint in endpoints.values() {
            for target in endpoint.targets.values() {
                let analytics = target.agent.analytics();
                let snap = if reset {
                    analytics.reset()
                } else {
                    analytics.snapshot()
                };
                total.clicks += snap.clicks;
                total.blocked += snap.blocked;
                total.file_edits += snap.file_edits;
                total.terminal_commands += snap.terminal_commands;
                total.actions_while_away += snap.actions_while_away;
            }
        }
        total
    }

    /// Drive the coordinator until the task is dropped.
    pub async fn run(self: Arc<Self>) {
        let mut sync_tick = tokio::time::interval(SYNC_INTERVAL);
        let mut stats_tick = tokio::time::interval(STATS_INTERVAL);
        let mut focus_rx = self.focus.subscribe();
        let mut focus_open = true;

        info!("coordinator started");
        loop {
            tokio::select! {
                _ = sync_tick.tick() => self.sync().await,
                _ = stats_tick.tick() => self.collect_stats().await,
                changed = focus_rx.changed(), if focus_open => {
                    match changed {
                        Ok(()) => {
                            let focused = *focus_rx.borrow();
                            self.handle_focus(focused).await;
                        }
                        Err(_) => focus_open = false,
                    }
                }
            }
        }
    }

    /// One endpoint sweep.
    pub async fn sync(&self) {
        let cfg = self.config();

        if cfg.tier == Tier::Free {
            match self.free_lock.try_acquire() {
                Ok(true) => {
                    if self.in_standby.swap(false, Ordering::SeqCst) {
                        info!("single-instance lease acquired, leaving standby");
                    }
                }
                Ok(false) => {
                    self.enter_standby().await;
                    return;
                }
                Err(e) => {
                    warn!("instance lock check failed: {e}");
                    return;
                }
            }
        }

        // Only one coordinator may drive the endpoints at a time; a second
        // process polling the same pages would double-dispatch clicks.
        match self.coordination_lock.try_acquire() {
            Ok(true) => {}
            Ok(false) => {
                debug!("another coordinator holds the polling lease, skipping sweep");
                return;
            }
            Err(e) => {
                warn!("coordination lease check failed: {e}");
                return;
            }
        }

        let discovered = match discovery::discover().await {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!("endpoint sweep failed: {e}");
                return;
            }
        };
        let live_ports: HashSet<u16> = discovered.iter().map(|e| e.port).collect();

        let mut endpoints = self.endpoints.lock().await;

        // Endpoints that answered before but not now: the instance is gone
        // or was restarted without the debugging flag.
        let lost: Vec<u16> = endpoints
            .keys()
            .filter(|port| !live_ports.contains(port))
            .copied()
            .collect();
        for port in lost {
            if let Some(endpoint) = endpoints.remove(&port) {
                warn!(port, "debugging endpoint lost");
                for target in endpoint.targets.values() {
                    target.agent.stop().await;
                }
                let gate = self.gate_for(port).await;
                if gate.should_prompt() {
                    let command = RelaunchCommand::for_port(&self.ide_program, port);
                    self.notifier.relaunch_prompt(port, &command);
                }
            }
        }

        // New endpoints.
        for found in &discovered {
            if endpoints.contains_key(&found.port) {
                continue;
            }
            match CdpClient::connect(&found.http_url()).await {
                Ok(client) => {
                    info!(port = found.port, browser = %found.version.browser, "endpoint connected");
                    endpoints.insert(
                        found.port,
                        EndpointState {
                            client: Arc::new(client),
                            targets: HashMap::new(),
                        },
                    );
                }
                Err(e) => warn!(port = found.port, "endpoint connect failed: {e}"),
            }
        }

        // Reconcile targets per endpoint.
        for (port, endpoint) in endpoints.iter_mut() {
            self.sync_endpoint(*port, endpoint, &cfg).await;
        }

        self.probe_focus(&endpoints).await;
    }

    /// Fold per-page `document.hasFocus()` into the focus signal. The user
    /// counts as present while any attached page has focus; with no targets
    /// the signal is left alone.
    async fn probe_focus(&self, endpoints: &HashMap<u16, EndpointState>) {
        let mut any_targets = false;
        let mut any_focused = false;
        for endpoint in endpoints.values() {
            for target in endpoint.targets.values() {
                any_targets = true;
                match target.dom.page_has_focus().await {
                    Ok(true) => any_focused = true,
                    Ok(false) => {}
                    Err(e) => debug!("focus probe failed: {e}"),
                }
            }
        }
        if any_targets && self.focus.is_focused() != any_focused {
            self.focus.set_focused(any_focused);
        }
    }

    /// Attach agents to new workbench pages, drop vanished ones, and keep
    /// the page helper installed on the rest.
    async fn sync_endpoint(&self, port: u16, endpoint: &mut EndpointState, cfg: &AgentConfig) {
        let pages = match endpoint.client.workbench_pages().await {
            Ok(pages) => pages,
            Err(e) => {
                debug!(port, "page listing failed: {e}");
                return;
            }
        };
        let page_ids: HashSet<&str> = pages.iter().map(|p| p.id.as_str()).collect();

        let gone: Vec<String> = endpoint
            .targets
            .keys()
            .filter(|id| !page_ids.contains(id.as_str()))
            .cloned()
            .collect();
        for id in gone {
            if let Some(target) = endpoint.targets.remove(&id) {
                debug!(port, target_id = %id, "workbench page gone");
                target.agent.stop().await;
            }
        }

        for page in pages {
            if let Some(target) = endpoint.targets.get(&page.id) {
                // A reload wipes the injected helper; restore it quietly.
                if let Err(e) = target.dom.ensure_injected().await {
                    debug!(port, target_id = %page.id, "helper re-injection failed: {e}");
                }
                continue;
            }

            let session = match endpoint.client.attach_page(&page.id).await {
                Ok(session) => Arc::new(session),
                Err(e) => {
                    warn!(port, target_id = %page.id, "attach failed: {e}");
                    continue;
                }
            };
            let dom = Arc::new(CdpDom::new(session));
            if let Err(e) = dom.ensure_injected().await {
                warn!(port, target_id = %page.id, "helper injection failed: {e}");
                continue;
            }

            let agent = AgentHandle::new(dom.clone(), dom.clone());
            agent.start(cfg.clone());
            if let Err(e) = self.roi.record_session() {
                debug!("session count failed: {e}");
            }
            info!(port, target_id = %page.id, title = %page.title, "agent attached");
            endpoint.targets.insert(page.id, TargetState { dom, agent });
        }
    }

    /// Fold every agent's counters into the weekly totals. Crossing a week
    /// boundary surfaces the finished week once.
    pub async fn collect_stats(&self) {
        let endpoints = self.endpoints.lock().await;
        for endpoint in endpoints.values() {
            for target in endpoint.targets.values() {
                let snapshot = target.agent.analytics().reset();
                match self.roi.record(snapshot.clicks, snapshot.blocked) {
                    Ok(Some(finished)) => self.notifier.weekly_summary(&finished),
                    Ok(None) => {}
                    Err(e) => warn!("roi collection failed: {e}"),
                }
            }
        }
    }

    /// Propagate focus to every agent's analytics; on regain, surface the
    /// actions handled while away.
    async fn handle_focus(&self, focused: bool) {
        let endpoints = self.endpoints.lock().await;
        let mut away_total = 0u64;
        for endpoint in endpoints.values() {
            for target in endpoint.targets.values() {
                target.agent.analytics().set_focused(focused);
                if focused {
                    away_total += target.agent.analytics().take_away_actions();
                }
            }
        }
        if focused && away_total > 0 {
            self.notifier.away_actions(away_total);
        }
    }

    /// Another free-tier instance holds the lease; stop everything local.
    async fn enter_standby(&self) {
        if !self.in_standby.swap(true, Ordering::SeqCst) {
            info!("another instance holds the single-instance lease, standing by");
        }
        if !self.standby_notified.swap(true, Ordering::SeqCst) {
            self.notifier.upgrade_required("running multiple instances");
        }
        let endpoints = self.endpoints.lock().await;
        for endpoint in endpoints.values() {
            for target in endpoint.targets.values() {
                target.agent.stop().await;
            }
        }
    }

    /// Stop all agents and release the leases.
    pub async fn shutdown(&self) {
        let mut endpoints = self.endpoints.lock().await;
        for (_, endpoint) in endpoints.drain() {
            for target in endpoint.targets.values() {
                target.agent.stop().await;
            }
        }
        if let Err(e) = self.free_lock.release() {
            debug!("free-tier lease release failed: {e}");
        }
        if let Err(e) = self.coordination_lock.release() {
            debug!("coordination lease release failed: {e}");
        }
        info!("coordinator shut down");
    }

    async fn gate_for(&self, port: u16) -> Arc<RelaunchGate> {
        self.gates
            .lock()
            .await
            .entry(port)
            .or_insert_with(|| Arc::new(RelaunchGate::new()))
            .clone()
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
