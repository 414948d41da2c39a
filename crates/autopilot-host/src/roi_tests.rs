use std::sync::Arc;

use super::*;
use crate::store::MemoryStore;

// 2026-08-23 is a Sunday.
const SUNDAY_MS: u64 = 1_787_443_200_000;
const DAY_MS: u64 = 86_400_000;
const WEEK_MS: u64 = 7 * DAY_MS;

fn tracker() -> (RoiTracker, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (RoiTracker::new(store.clone()), store)
}

#[test]
fn test_week_start_is_sunday_midnight() {
    assert_eq!(week_start_ms(SUNDAY_MS), SUNDAY_MS);
    // Wednesday afternoon resolves back to the same Sunday.
    assert_eq!(week_start_ms(SUNDAY_MS + 3 * DAY_MS + 7_200_000), SUNDAY_MS);
    // The following Sunday starts a new week.
    assert_eq!(week_start_ms(SUNDAY_MS + WEEK_MS), SUNDAY_MS + WEEK_MS);
}

#[test]
fn test_counters_accumulate_within_a_week() {
    let (tracker, _store) = tracker();
    assert!(tracker.record_at(3, 1, SUNDAY_MS + DAY_MS).unwrap().is_none());
    assert!(tracker
        .record_at(2, 0, SUNDAY_MS + 2 * DAY_MS)
        .unwrap()
        .is_none());

    let roi = tracker.current().unwrap();
    assert_eq!(roi.clicks_this_week, 5);
    assert_eq!(roi.blocked_this_week, 1);
    assert_eq!(roi.week_start_ms, SUNDAY_MS);
}

#[test]
fn test_week_boundary_emits_finished_totals_once() {
    let (tracker, _store) = tracker();
    tracker.record_at(10, 2, SUNDAY_MS + DAY_MS).unwrap();

    let finished = tracker
        .record_at(1, 0, SUNDAY_MS + WEEK_MS + DAY_MS)
        .unwrap()
        .expect("crossing the boundary must surface last week");
    assert_eq!(finished.clicks_this_week, 10);
    assert_eq!(finished.blocked_this_week, 2);

    // Counters restarted with the new week's contribution only.
    let roi = tracker.current().unwrap();
    assert_eq!(roi.clicks_this_week, 1);
    assert_eq!(roi.week_start_ms, SUNDAY_MS + WEEK_MS);

    // No second emission within the same week.
    assert!(tracker
        .record_at(4, 0, SUNDAY_MS + WEEK_MS + 2 * DAY_MS)
        .unwrap()
        .is_none());
}

#[test]
fn test_idle_week_rolls_over_silently() {
    let (tracker, _store) = tracker();
    // Sessions but no clicks: nothing worth summarizing.
    tracker.record_session_at(SUNDAY_MS).unwrap();
    let finished = tracker.record_at(1, 0, SUNDAY_MS + WEEK_MS).unwrap();
    assert!(finished.is_none());
}

#[test]
fn test_session_counter() {
    let (tracker, _store) = tracker();
    tracker.record_session_at(SUNDAY_MS).unwrap();
    tracker.record_session_at(SUNDAY_MS + DAY_MS).unwrap();
    assert_eq!(tracker.current().unwrap().sessions_this_week, 2);
}

#[test]
fn test_estimated_minutes_saved() {
    let roi = RoiStats {
        clicks_this_week: 0,
        ..Default::default()
    };
    assert_eq!(roi.estimated_minutes_saved(), 0);

    // 5 clicks at 5s each is under a minute but still counts as one.
    let roi = RoiStats {
        clicks_this_week: 5,
        ..Default::default()
    };
    assert_eq!(roi.estimated_minutes_saved(), 1);

    let roi = RoiStats {
        clicks_this_week: 120,
        ..Default::default()
    };
    assert_eq!(roi.estimated_minutes_saved(), 10);
}
