use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::*;
use crate::classify::DenyList;
use crate::config::AgentConfig;
use crate::dom::{ElementHandle, ElementInfo};
use crate::error::AgentError;
use crate::lifecycle::AgentHandle;
use crate::overlay::SlotStatus;

fn element(token: u64, text: &str) -> ElementInfo {
    ElementInfo {
        handle: ElementHandle(token),
        text: text.to_string(),
        command_text: None,
        display_none: false,
        width: 80.0,
        pointer_events_none: false,
        disabled: false,
    }
}

/// Scripted page: routes queries by selector, records clicks.
#[derive(Default)]
struct FakeDom {
    buttons: Mutex<Vec<ElementInfo>>,
    tabs: Mutex<Vec<ElementInfo>>,
    new_tabs: Mutex<Vec<ElementInfo>>,
    markers: Mutex<Vec<ElementInfo>>,
    clicks: Mutex<Vec<u64>>,
}

impl FakeDom {
    fn clicked_tokens(&self) -> Vec<u64> {
        self.clicks.lock().clone()
    }
}

#[async_trait::async_trait]
impl PageDom for FakeDom {
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, AgentError> {
        let spec_a = FlavorSpec::for_flavor(IdeFlavor::A);
        if selector == spec_a.tab_selector {
            Ok(self.tabs.lock().clone())
        } else if spec_a.new_tab_selector == Some(selector) {
            Ok(self.new_tabs.lock().clone())
        } else if selector == spec_a.done_marker_selector {
            Ok(self.markers.lock().clone())
        } else {
            Ok(self.buttons.lock().clone())
        }
    }

    async fn click(&self, handle: ElementHandle) -> Result<bool, AgentError> {
        self.clicks.lock().push(handle.0);
        Ok(true)
    }
}

/// Records overlay operations; enough to observe reconciliation.
#[derive(Default)]
struct FakeSurface {
    upserts: Mutex<Vec<(String, SlotStatus)>>,
    hides: Mutex<u32>,
}

#[async_trait::async_trait]
impl crate::overlay::OverlaySurface for FakeSurface {
    async fn show(&self, _panel_selector: &str) -> Result<(), AgentError> {
        Ok(())
    }
    async fn set_waiting(&self) -> Result<(), AgentError> {
        Ok(())
    }
    async fn upsert_slot(
        &self,
        label: &str,
        status: SlotStatus,
        _elapsed_secs: u64,
    ) -> Result<(), AgentError> {
        self.upserts.lock().push((label.to_string(), status));
        Ok(())
    }
    async fn remove_slot(&self, _label: &str) -> Result<(), AgentError> {
        Ok(())
    }
    async fn hide(&self) -> Result<(), AgentError> {
        *self.hides.lock() += 1;
        Ok(())
    }
}

fn simple_config() -> AgentConfig {
    AgentConfig {
        ide_flavor: IdeFlavor::A,
        background_mode: false,
        ..Default::default()
    }
}

fn background_config() -> AgentConfig {
    AgentConfig {
        ide_flavor: IdeFlavor::A,
        background_mode: true,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_simple_loop_clicks_accept_buttons() {
    let dom = Arc::new(FakeDom::default());
    dom.buttons.lock().push(element(1, "Accept"));
    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom.clone(), surface);

    handle.start(simple_config());
    tokio::time::sleep(Duration::from_secs(3)).await;
    handle.stop().await;

    assert!(dom.clicked_tokens().contains(&1));
    let snap = handle.analytics().snapshot();
    assert!(snap.clicks >= 1);
    assert!(snap.file_edits >= 1);
    assert_eq!(snap.blocked, 0);
}

#[tokio::test(start_paused = true)]
async fn test_banned_command_is_blocked_not_clicked() {
    let dom = Arc::new(FakeDom::default());
    let mut banned = element(7, "Run");
    banned.command_text = Some("Run: rm -rf /tmp && rm -rf /".to_string());
    dom.buttons.lock().push(banned);

    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom.clone(), surface);

    let mut cfg = simple_config();
    cfg.deny_list = vec!["rm -rf /".to_string()];
    handle.start(cfg);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    handle.stop().await;

    assert!(!dom.clicked_tokens().contains(&7));
    let snap = handle.analytics().snapshot();
    assert_eq!(snap.clicks, 0);
    assert!(snap.blocked >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_background_loop_rotates_tabs_round_robin() {
    let dom = Arc::new(FakeDom::default());
    {
        let mut tabs = dom.tabs.lock();
        tabs.push(element(100, "One"));
        tabs.push(element(101, "Two"));
        tabs.push(element(102, "Three"));
    }
    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom.clone(), surface);

    handle.start(background_config());
    // Enough virtual time for several full background cycles.
    tokio::time::sleep(Duration::from_secs(30)).await;
    handle.stop().await;

    let tab_clicks: Vec<u64> = dom
        .clicked_tokens()
        .into_iter()
        .filter(|t| *t >= 100)
        .collect();
    assert!(tab_clicks.len() >= 3, "expected several rotations, got {tab_clicks:?}");
    assert_eq!(&tab_clicks[..3], &[100, 101, 102]);
}

#[tokio::test(start_paused = true)]
async fn test_background_loop_clicks_new_tab_control_each_cycle() {
    let dom = Arc::new(FakeDom::default());
    dom.new_tabs.lock().push(element(50, "+"));
    dom.tabs.lock().push(element(100, "One"));

    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom.clone(), surface);

    handle.start(background_config());
    tokio::time::sleep(Duration::from_secs(20)).await;
    handle.stop().await;

    let new_tab_clicks = dom.clicked_tokens().iter().filter(|t| **t == 50).count();
    assert!(
        new_tab_clicks >= 2,
        "expected the new-tab control clicked every cycle, got {new_tab_clicks}"
    );
    // Rotation still reaches the conversation tab afterwards.
    assert!(dom.clicked_tokens().contains(&100));
}

#[tokio::test(start_paused = true)]
async fn test_completion_signal_marks_tab_done() {
    let dom = Arc::new(FakeDom::default());
    dom.tabs.lock().push(element(100, "Fix bug 3m"));
    dom.markers.lock().push(element(200, "Good"));

    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom.clone(), surface.clone());

    handle.start(background_config());
    tokio::time::sleep(Duration::from_secs(15)).await;
    handle.stop().await;

    let upserts = surface.upserts.lock();
    assert!(
        upserts
            .iter()
            .any(|(label, status)| label == "Fix bug" && *status == SlotStatus::Done),
        "expected a done slot for the stripped label, got {upserts:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_completion_signal_leaves_state_waiting() {
    let dom = Arc::new(FakeDom::default());
    dom.tabs.lock().push(element(100, "Task"));

    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom.clone(), surface.clone());

    handle.start(background_config());
    tokio::time::sleep(Duration::from_secs(15)).await;
    handle.stop().await;

    let upserts = surface.upserts.lock();
    assert!(!upserts.is_empty());
    assert!(upserts.iter().all(|(_, status)| *status != SlotStatus::Done));
}

#[tokio::test(start_paused = true)]
async fn test_simple_mode_hides_leftover_overlay() {
    let dom = Arc::new(FakeDom::default());
    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom, surface.clone());

    handle.start(simple_config());
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.stop().await;

    assert!(*surface.hides.lock() >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_candidates_across_selectors_click_once() {
    // Flavor B scans overlapping selectors; the same handle must be
    // classified and clicked at most once per tick.
    let dom = Arc::new(FakeDom::default());
    dom.buttons.lock().push(element(1, "Accept"));

    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom.clone(), surface);

    let cfg = AgentConfig {
        ide_flavor: IdeFlavor::B,
        background_mode: false,
        ..Default::default()
    };
    handle.start(cfg);

    // One poll interval: exactly one tick.
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.stop().await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let clicks = dom.clicked_tokens();
    let per_tick = clicks.iter().filter(|t| **t == 1).count();
    // FlavorSpec B has two button selectors that both return this element.
    let snap = handle.analytics().snapshot();
    assert_eq!(snap.clicks as usize, per_tick);
}

#[tokio::test(start_paused = true)]
async fn test_deny_list_update_applies_without_restart() {
    let dom = Arc::new(FakeDom::default());
    let mut candidate = element(7, "Run");
    candidate.command_text = Some("shutdown -h now".to_string());
    dom.buttons.lock().push(candidate);

    let surface = Arc::new(FakeSurface::default());
    let handle = AgentHandle::new(dom.clone(), surface);

    let mut cfg = simple_config();
    cfg.deny_list = vec![];
    handle.start(cfg.clone());
    tokio::time::sleep(Duration::from_secs(2)).await;
    let before = handle.analytics().snapshot();
    assert!(before.clicks >= 1);
    assert_eq!(before.blocked, 0);

    // Same mode, new deny-list: no supersession, but the next ticks block.
    cfg.deny_list = vec!["shutdown".to_string()];
    assert_eq!(handle.start(cfg), crate::lifecycle::StartOutcome::Unchanged);
    handle.analytics().reset();
    tokio::time::sleep(Duration::from_secs(2)).await;
    handle.stop().await;

    let after = handle.analytics().snapshot();
    assert_eq!(after.clicks, 0);
    assert!(after.blocked >= 1);
}
