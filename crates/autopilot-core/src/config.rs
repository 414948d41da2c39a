//! Agent configuration.

use serde::{Deserialize, Serialize};

use crate::classify::DenyList;
use crate::flavor::IdeFlavor;

/// Default poll interval for the simple (single-tab) loop.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Poll interval forced on the restricted tier.
pub const FREE_POLL_INTERVAL_MS: u64 = 300;

/// License tier.
///
/// The free tier runs with a degraded poll interval, the stock deny-list and
/// the single-instance lease; background mode is gated behind an upgrade
/// notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Pro
    }
}

/// Configuration handed to the agent on every (re)start.
///
/// A config is never mutated in place: changing it produces a new session
/// (see [`crate::lifecycle::AgentHandle::start`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Which IDE flavor's selectors to drive.
    pub ide_flavor: IdeFlavor,
    /// Multi-tab (background) mode vs the minimal single-tab loop.
    pub background_mode: bool,
    /// Poll interval for the simple loop, in milliseconds.
    pub poll_interval_ms: u64,
    /// Deny-list patterns for terminal commands (case-insensitive substrings).
    pub deny_list: Vec<String>,
    /// License tier.
    pub tier: Tier,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ide_flavor: IdeFlavor::A,
            background_mode: false,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            deny_list: DenyList::default_patterns(),
            tier: Tier::default(),
        }
    }
}

impl AgentConfig {
    /// Poll interval after applying tier restrictions.
    pub fn effective_poll_interval_ms(&self) -> u64 {
        match self.tier {
            Tier::Free => FREE_POLL_INTERVAL_MS,
            Tier::Pro => self.poll_interval_ms,
        }
    }

    /// Deny-list after applying tier restrictions. The free tier cannot
    /// customize the list and always runs with the defaults.
    pub fn effective_deny_list(&self) -> DenyList {
        match self.tier {
            Tier::Free => DenyList::new(DenyList::default_patterns()),
            Tier::Pro => DenyList::new(self.deny_list.clone()),
        }
    }

    /// Background mode after applying tier restrictions.
    pub fn effective_background_mode(&self) -> bool {
        self.background_mode && self.tier == Tier::Pro
    }
}

/// Partial configuration for `update_config`-style merges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    pub ide_flavor: Option<IdeFlavor>,
    pub background_mode: Option<bool>,
    pub poll_interval_ms: Option<u64>,
    pub deny_list: Option<Vec<String>>,
    pub tier: Option<Tier>,
}

impl PartialConfig {
    /// Merge this partial config over a base config.
    pub fn apply(&self, base: &AgentConfig) -> AgentConfig {
        AgentConfig {
            ide_flavor: self.ide_flavor.unwrap_or(base.ide_flavor),
            background_mode: self.background_mode.unwrap_or(base.background_mode),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(base.poll_interval_ms),
            deny_list: self.deny_list.clone().unwrap_or_else(|| base.deny_list.clone()),
            tier: self.tier.unwrap_or(base.tier),
        }
    }
}
