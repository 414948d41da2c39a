use std::sync::Arc;

use parking_lot::Mutex as PlMutex;

use super::*;
use crate::focus::FocusSignal;
use crate::relaunch::{LogNotifier, RelaunchCommand};
use crate::roi::RoiStats;
use crate::store::MemoryStore;

fn coordinator() -> Arc<Coordinator> {
    Arc::new(Coordinator::new(
        Arc::new(MemoryStore::new()),
        Arc::new(LogNotifier),
        CoordinatorOptions::default(),
        FocusSignal::new(),
    ))
}

#[derive(Default)]
struct RecordingNotifier {
    upgrades: PlMutex<Vec<String>>,
    aways: PlMutex<Vec<u64>>,
}

impl crate::relaunch::Notifier for RecordingNotifier {
    fn relaunch_prompt(&self, _port: u16, _command: &RelaunchCommand) {}
    fn away_actions(&self, count: u64) {
        self.aways.lock().push(count);
    }
    fn weekly_summary(&self, _stats: &RoiStats) {}
    fn upgrade_required(&self, capability: &str) {
        self.upgrades.lock().push(capability.to_string());
    }
}

#[tokio::test]
async fn test_update_config_merges_over_current() {
    let coordinator = coordinator();
    assert!(!coordinator.config().background_mode);

    coordinator
        .update_config(PartialConfig {
            background_mode: Some(true),
            poll_interval_ms: Some(250),
            ..Default::default()
        })
        .await;

    let cfg = coordinator.config();
    assert!(cfg.background_mode);
    assert_eq!(cfg.poll_interval_ms, 250);
    // Untouched fields survive the merge.
    assert_eq!(cfg.ide_flavor, AgentConfig::default().ide_flavor);

    coordinator
        .update_config(PartialConfig {
            deny_list: Some(vec!["shutdown".to_string()]),
            ..Default::default()
        })
        .await;
    let cfg = coordinator.config();
    assert!(cfg.background_mode);
    assert_eq!(cfg.deny_list, vec!["shutdown".to_string()]);
}

#[tokio::test]
async fn test_stats_collection_with_no_endpoints_is_harmless() {
    let coordinator = coordinator();
    coordinator.collect_stats().await;
    coordinator.shutdown().await;
}

#[tokio::test]
async fn test_summary_with_no_targets_is_empty() {
    let coordinator = coordinator();
    let summary = coordinator.session_summary().await;
    assert_eq!(summary.clicks, 0);
    assert!(summary.estimated_minutes_saved.is_none());
    assert_eq!(coordinator.take_away_actions().await, 0);
    assert_eq!(coordinator.reset_stats().await.blocked, 0);
}

#[tokio::test]
async fn test_focus_signal_feeds_the_coordinator_subscription() {
    let notifier = Arc::new(RecordingNotifier::default());
    let coordinator = Coordinator::new(
        Arc::new(MemoryStore::new()),
        notifier.clone(),
        CoordinatorOptions::default(),
        FocusSignal::new(),
    );

    let mut rx = coordinator.focus().subscribe();
    assert!(*rx.borrow());

    coordinator.focus().set_focused(false);
    rx.changed().await.unwrap();
    assert!(!*rx.borrow());
    coordinator.handle_focus(false).await;

    coordinator.focus().set_focused(true);
    rx.changed().await.unwrap();
    coordinator.handle_focus(true).await;

    // No targets, so regaining focus has nothing to report.
    assert!(notifier.aways.lock().is_empty());
}

#[tokio::test]
async fn test_gated_background_notice_fires_once() {
    let notifier = Arc::new(RecordingNotifier::default());
    let coordinator = Coordinator::new(
        Arc::new(MemoryStore::new()),
        notifier.clone(),
        CoordinatorOptions::default(),
        FocusSignal::new(),
    );

    let request_background = PartialConfig {
        background_mode: Some(true),
        tier: Some(Tier::Free),
        ..Default::default()
    };
    coordinator.update_config(request_background.clone()).await;
    coordinator.update_config(request_background).await;

    assert_eq!(notifier.upgrades.lock().as_slice(), ["background mode"]);
}

#[test]
fn test_cadence_constants() {
    assert_eq!(SYNC_INTERVAL.as_secs(), 5);
    assert_eq!(STATS_INTERVAL.as_secs(), 30);
}
