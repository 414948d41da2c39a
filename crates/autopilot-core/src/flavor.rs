//! IDE flavor strategy values.
//!
//! The two supported IDE flavors share the same loop shape and differ only in
//! DOM markup: which selectors find the clickable controls, the conversation
//! tab list, the anchoring panel, and the "conversation finished" signal.
//! Keeping those differences in data means a new flavor is a new `FlavorSpec`,
//! not a new branch in the loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Supported IDE flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeFlavor {
    /// Flavor A: dedicated agent side panel, custom button classes, and
    /// Good/Bad feedback badges once a conversation finishes.
    A,
    /// Flavor B: stock workbench auxiliary bar with a `tablist` of
    /// conversations and generic button markup. No feedback badge.
    B,
}

impl Default for IdeFlavor {
    fn default() -> Self {
        IdeFlavor::A
    }
}

/// Selector set and pacing for one IDE flavor.
#[derive(Debug, Clone)]
pub struct FlavorSpec {
    pub flavor: IdeFlavor,
    /// Selectors that may match clickable "continue" controls.
    pub button_selectors: &'static [&'static str],
    /// Selector for the conversation tab list.
    pub tab_selector: &'static str,
    /// Selector for the new-conversation control clicked each background
    /// cycle to keep the tab list cycling. `None` when the flavor has no
    /// such control.
    pub new_tab_selector: Option<&'static str>,
    /// Selector for the panel the overlay anchors to.
    pub panel_selector: &'static str,
    /// Selector scanned for the completion signal after rotating to a tab.
    pub done_marker_selector: &'static str,
    /// Exact texts that count as a completion signal. Empty means the flavor
    /// has no completion signal and tabs never auto-transition to done.
    pub done_marker_texts: &'static [&'static str],
    /// Pause after click dispatch before the new-tab click.
    pub post_click_delay: Duration,
    /// Pause after the new-tab click before re-scanning tabs.
    pub new_tab_delay: Duration,
    /// Pause after tab rotation before scanning for the completion signal.
    pub settle_delay: Duration,
    /// Pause at the end of each background tick.
    pub cycle_delay: Duration,
}

static FLAVOR_A: FlavorSpec = FlavorSpec {
    flavor: IdeFlavor::A,
    button_selectors: &[".bg-ide-button-background"],
    tab_selector: "button.grow",
    new_tab_selector: Some("[data-tooltip-id='new-conversation-tooltip']"),
    panel_selector: "#workbench\\.panel\\.agent",
    done_marker_selector: "span",
    done_marker_texts: &["Good", "Bad"],
    post_click_delay: Duration::from_millis(800),
    new_tab_delay: Duration::from_millis(1000),
    settle_delay: Duration::from_millis(1500),
    cycle_delay: Duration::from_millis(3000),
};

static FLAVOR_B: FlavorSpec = FlavorSpec {
    flavor: IdeFlavor::B,
    button_selectors: &["button", "[class*=\"button\"]"],
    tab_selector: "#workbench\\.parts\\.auxiliarybar ul[role=\"tablist\"] li[role=\"tab\"]",
    new_tab_selector: None,
    panel_selector: "#workbench\\.parts\\.auxiliarybar",
    done_marker_selector: "span",
    done_marker_texts: &[],
    post_click_delay: Duration::from_millis(800),
    new_tab_delay: Duration::ZERO,
    settle_delay: Duration::from_millis(500),
    cycle_delay: Duration::from_millis(3000),
};

impl FlavorSpec {
    /// Look up the spec for a flavor.
    pub fn for_flavor(flavor: IdeFlavor) -> &'static FlavorSpec {
        match flavor {
            IdeFlavor::A => &FLAVOR_A,
            IdeFlavor::B => &FLAVOR_B,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specs_are_consistent() {
        for flavor in [IdeFlavor::A, IdeFlavor::B] {
            let spec = FlavorSpec::for_flavor(flavor);
            assert_eq!(spec.flavor, flavor);
            assert!(!spec.button_selectors.is_empty());
            assert!(!spec.tab_selector.is_empty());
            assert!(!spec.panel_selector.is_empty());
        }
    }

    #[test]
    fn test_new_tab_control_is_flavor_a_only() {
        assert!(FlavorSpec::for_flavor(IdeFlavor::A).new_tab_selector.is_some());
        assert!(FlavorSpec::for_flavor(IdeFlavor::B).new_tab_selector.is_none());
    }

    #[test]
    fn test_flavor_serde() {
        assert_eq!(serde_json::to_string(&IdeFlavor::A).unwrap(), "\"a\"");
        let f: IdeFlavor = serde_json::from_str("\"b\"").unwrap();
        assert_eq!(f, IdeFlavor::B);
    }
}
