//! The cooperative polling loop.
//!
//! One loop drives one page. Each tick runs to completion; sleeping is the
//! only suspension point, and liveness is re-checked after every sleep and
//! before any further action, so a superseded loop can never act again after
//! its epoch goes stale. Both flavors share this tick shape; the selectors
//! and pacing come from the [`FlavorSpec`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::classify::{classify, Classification};
use crate::dom::PageDom;
use crate::flavor::{FlavorSpec, IdeFlavor};
use crate::lifecycle::SessionState;
use crate::overlay::{OverlayRenderer, OverlaySurface};
use crate::stats::Analytics;
use crate::tracker::{strip_time_suffix, ConversationTracker};

/// A single agent loop bound to one session epoch.
pub struct AgentLoop {
    dom: Arc<dyn PageDom>,
    overlay: Arc<dyn OverlaySurface>,
    renderer: OverlayRenderer,
    state: Arc<SessionState>,
    analytics: Arc<Analytics>,
    spec: &'static FlavorSpec,
    background: bool,
    epoch: u64,
    tracker: ConversationTracker,
    /// Round-robin tab rotation index; persists across ticks.
    rotation: usize,
}

impl AgentLoop {
    pub(crate) fn new(
        dom: Arc<dyn PageDom>,
        overlay: Arc<dyn OverlaySurface>,
        state: Arc<SessionState>,
        analytics: Arc<Analytics>,
        flavor: IdeFlavor,
        background: bool,
        epoch: u64,
    ) -> Self {
        let spec = FlavorSpec::for_flavor(flavor);
        let renderer = OverlayRenderer::new(overlay.clone(), spec.panel_selector);
        Self {
            dom,
            overlay,
            renderer,
            state,
            analytics,
            spec,
            background,
            epoch,
            tracker: ConversationTracker::new(),
            rotation: 0,
        }
    }

    /// Run until stopped or superseded. Exits silently; cleanup beyond the
    /// overlay is the caller's business.
    pub async fn run(mut self) {
        debug!(epoch = self.epoch, background = self.background, "agent loop started");

        if !self.background {
            // Entering simple mode dismisses any overlay a previous
            // background session left behind.
            if let Err(e) = self.overlay.hide().await {
                trace!("overlay hide on simple start failed: {e}");
            }
        }

        while self.live() {
            if self.background {
                self.background_tick().await;
            } else {
                self.simple_tick().await;
            }

            let delay = if self.background {
                self.spec.cycle_delay
            } else {
                Duration::from_millis(self.state.config().effective_poll_interval_ms())
            };
            sleep(delay).await;
        }

        debug!(epoch = self.epoch, "agent loop exited");
    }

    fn live(&self) -> bool {
        self.state.is_live(self.epoch)
    }

    /// Minimal single-tab tick: scan, classify, click.
    async fn simple_tick(&mut self) {
        self.scan_and_click().await;
    }

    /// Full multi-tab tick: click, track tabs, rotate, detect completion,
    /// render.
    async fn background_tick(&mut self) {
        let clicked = self.scan_and_click().await;

        sleep(self.spec.post_click_delay).await;
        if !self.live() {
            return;
        }

        if let Some(selector) = self.spec.new_tab_selector {
            self.cycle_new_tab(selector).await;
            sleep(self.spec.new_tab_delay).await;
            if !self.live() {
                return;
            }
        }

        let tabs = match self.dom.query_all(self.spec.tab_selector).await {
            Ok(tabs) => tabs,
            Err(e) => {
                debug!("tab scan failed: {e}");
                Vec::new()
            }
        };
        let labels: Vec<String> = tabs.iter().map(|t| t.text.clone()).collect();
        self.tracker.update_labels(&labels);

        // Rotate focus so every conversation eventually gets a frontmost
        // cycle, even though only one tab is visible at a time.
        let mut active_label = None;
        if !tabs.is_empty() {
            let target = &tabs[self.rotation % tabs.len()];
            self.rotation = self.rotation.wrapping_add(1);
            active_label = Some(strip_time_suffix(&target.text));
            match self.dom.click(target.handle).await {
                Ok(true) => trace!("rotated to tab {:?}", active_label),
                Ok(false) => trace!("tab vanished before rotation click"),
                Err(e) => debug!("tab rotation click failed: {e}"),
            }
        }

        sleep(self.spec.settle_delay).await;
        if !self.live() {
            return;
        }

        if let Some(label) = active_label.as_deref() {
            if clicked > 0 {
                self.tracker.mark_working(label);
            }
            if self.completion_signal_present().await {
                self.tracker.mark_done(label);
            }
        }

        if let Err(e) = self.renderer.show().await {
            debug!("overlay show failed: {e}");
        }
        if let Err(e) = self.renderer.update(&self.tracker).await {
            debug!("overlay update failed: {e}");
        }
    }

    /// Click the flavor's new-conversation control so tab rotation keeps
    /// cycling even while a conversation holds the frontmost slot.
    async fn cycle_new_tab(&self, selector: &str) {
        let control = match self.dom.query_all(selector).await {
            Ok(elements) => elements.into_iter().next(),
            Err(e) => {
                debug!("new-tab scan failed: {e}");
                None
            }
        };
        if let Some(control) = control {
            match self.dom.click(control.handle).await {
                Ok(true) => trace!("clicked new-tab control"),
                Ok(false) => trace!("new-tab control vanished before click"),
                Err(e) => debug!("new-tab click failed: {e}"),
            }
        }
    }

    /// Whether the flavor's "conversation finished" signal is visible.
    ///
    /// Flavors without a completion signal always report `false`, leaving
    /// completion state untouched.
    async fn completion_signal_present(&self) -> bool {
        if self.spec.done_marker_texts.is_empty() {
            return false;
        }
        match self.dom.query_all(self.spec.done_marker_selector).await {
            Ok(elements) => elements
                .iter()
                .any(|el| self.spec.done_marker_texts.contains(&el.text.trim())),
            Err(e) => {
                trace!("completion scan failed: {e}");
                false
            }
        }
    }

    /// Scan for candidates across all button selectors, click every
    /// clickable one, withhold and count every banned one. Returns the number
    /// of dispatched clicks.
    async fn scan_and_click(&mut self) -> u64 {
        let deny = self.state.config().effective_deny_list();
        let mut seen = HashSet::new();
        let mut clicked = 0u64;

        for selector in self.spec.button_selectors {
            let elements = match self.dom.query_all(selector).await {
                Ok(elements) => elements,
                Err(e) => {
                    debug!("scan failed for {selector}: {e}");
                    continue;
                }
            };

            for el in elements {
                // The selector lists overlap; classify each element once.
                if !seen.insert(el.handle) {
                    continue;
                }

                match classify(&el, &deny) {
                    Classification::Clickable(category) => {
                        match self.dom.click(el.handle).await {
                            Ok(true) => {
                                self.analytics.track_click(category);
                                clicked += 1;
                                debug!("clicked {:?} ({:?})", el.text, category);
                            }
                            Ok(false) => trace!("candidate vanished before click"),
                            Err(e) => debug!("click dispatch failed: {e}"),
                        }
                    }
                    Classification::Banned => {
                        self.analytics.track_blocked();
                        warn!("blocked banned command: {:?}", el.command_or_text());
                    }
                    Classification::Excluded => {}
                }
            }
        }

        clicked
    }
}

#[cfg(test)]
#[path = "agent_loop_tests.rs"]
mod tests;
