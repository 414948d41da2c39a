//! Weekly ROI accounting.
//!
//! Per-session click counters roll up into machine-wide weekly totals in the
//! state document. Weeks start Sunday 00:00 UTC; the first collection that
//! lands in a new week emits the previous week's totals once, then resets.

use std::sync::Arc;

use chrono::{Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HostError;
use crate::store::StateStore;

/// Flat per-click time credit used for the ROI estimate.
pub const SECONDS_PER_CLICK: u64 = 5;

/// Weekly counters as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiStats {
    /// Sunday-midnight UTC timestamp of the week these counters belong to.
    #[serde(default)]
    pub week_start_ms: u64,
    #[serde(default)]
    pub clicks_this_week: u64,
    #[serde(default)]
    pub blocked_this_week: u64,
    #[serde(default)]
    pub sessions_this_week: u64,
}

impl RoiStats {
    /// Minutes of attention the week's clicks stand in for, floored at one
    /// minute once any click happened.
    pub fn estimated_minutes_saved(&self) -> u64 {
        if self.clicks_this_week == 0 {
            return 0;
        }
        (self.clicks_this_week * SECONDS_PER_CLICK / 60).max(1)
    }
}

/// Most recent Sunday 00:00 UTC at or before `now_ms`.
pub fn week_start_ms(now_ms: u64) -> u64 {
    let now = Utc
        .timestamp_millis_opt(now_ms as i64)
        .single()
        .unwrap_or_else(Utc::now);
    let days_back = now.weekday().num_days_from_sunday() as i64;
    let date = now.date_naive() - chrono::Duration::days(days_back);
    let start = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Utc.from_utc_datetime(&start).timestamp_millis() as u64
}

/// Accumulates session counters into the shared weekly totals.
pub struct RoiTracker {
    store: Arc<dyn StateStore>,
}

impl RoiTracker {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Fold one collection interval's counters into the weekly totals.
    /// Returns the previous week's totals when this call crossed a week
    /// boundary and there was activity to report.
    pub fn record(&self, clicks: u64, blocked: u64) -> Result<Option<RoiStats>, HostError> {
        self.record_at(clicks, blocked, chrono::Utc::now().timestamp_millis() as u64)
    }

    pub fn record_at(
        &self,
        clicks: u64,
        blocked: u64,
        now_ms: u64,
    ) -> Result<Option<RoiStats>, HostError> {
        let mut state = self.store.load()?;
        let finished = Self::roll_week(&mut state.roi, now_ms);
        state.roi.clicks_this_week += clicks;
        state.roi.blocked_this_week += blocked;
        self.store.save(&state)?;
        if clicks > 0 || blocked > 0 {
            debug!(clicks, blocked, "roi counters recorded");
        }
        Ok(finished)
    }

    /// Count one new agent session against the current week.
    pub fn record_session(&self) -> Result<Option<RoiStats>, HostError> {
        self.record_session_at(chrono::Utc::now().timestamp_millis() as u64)
    }

    pub fn record_session_at(&self, now_ms: u64) -> Result<Option<RoiStats>, HostError> {
        let mut state = self.store.load()?;
        let finished = Self::roll_week(&mut state.roi, now_ms);
        state.roi.sessions_this_week += 1;
        self.store.save(&state)?;
        Ok(finished)
    }

    /// Current totals, after applying any due rollover.
    pub fn current(&self) -> Result<RoiStats, HostError> {
        let state = self.store.load()?;
        Ok(state.roi)
    }

    /// Reset counters when `now_ms` falls in a later week than the stored
    /// one. Yields the finished week's totals once, and only when it saw any
    /// clicks.
    fn roll_week(roi: &mut RoiStats, now_ms: u64) -> Option<RoiStats> {
        let current_week = week_start_ms(now_ms);
        if roi.week_start_ms == current_week {
            return None;
        }
        let finished = (roi.clicks_this_week > 0).then(|| roi.clone());
        *roi = RoiStats {
            week_start_ms: current_week,
            ..Default::default()
        };
        finished
    }
}

#[cfg(test)]
#[path = "roi_tests.rs"]
mod tests;
