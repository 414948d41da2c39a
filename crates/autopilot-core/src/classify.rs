//! Action classification and the safety filter.
//!
//! Every candidate element ends up in exactly one of three buckets: clickable,
//! excluded, or banned. Banned candidates are always terminal commands whose
//! command text matched the deny-list; they are never clicked and count
//! toward `blocked` instead.

use serde::Serialize;

use crate::dom::ElementInfo;

/// Keywords that make a short button text a click candidate.
const ACCEPT_KEYWORDS: &[&str] = &["accept", "run", "retry", "apply", "execute"];

/// Keywords that disqualify a candidate outright.
const REJECT_KEYWORDS: &[&str] = &["skip", "reject", "cancel", "close", "refine"];

/// Keywords that mark a candidate as a terminal-command approval.
const TERMINAL_KEYWORDS: &[&str] = &["run", "execute", "command", "terminal"];

/// Longest button text still considered a control rather than a container.
const MAX_BUTTON_TEXT_LEN: usize = 50;

/// What kind of action a click approves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    FileEdit,
    TerminalCommand,
}

/// Classification verdict for a candidate element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Click it, attributing the given category.
    Clickable(ActionCategory),
    /// Not a continue control (wrong text, hidden, disabled).
    Excluded,
    /// A terminal command matching the deny-list. Never clicked.
    Banned,
}

/// Deny-list of destructive command patterns.
///
/// Matching is case-insensitive substring containment, nothing richer. This is
/// the contract: glob or regex matching would silently widen what gets
/// blocked.
#[derive(Debug, Clone)]
pub struct DenyList {
    patterns: Vec<String>,
}

impl DenyList {
    /// Build a deny-list; patterns are lowercased once up front.
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// The stock destructive-command patterns.
    pub fn default_patterns() -> Vec<String> {
        [
            "rm -rf /",
            "rm -rf ~",
            "rm -rf *",
            "format c:",
            "del /f /s /q",
            "rmdir /s /q",
            ":(){:|:&};:",
            "dd if=",
            "mkfs.",
            "> /dev/sda",
            "chmod -R 777 /",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Whether any pattern is contained in the given text.
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.patterns.iter().any(|p| lowered.contains(p.as_str()))
    }

    /// Number of configured patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for DenyList {
    fn default() -> Self {
        Self::new(Self::default_patterns())
    }
}

/// Categorize a surviving candidate as file-edit or terminal-command.
pub fn categorize(text: &str) -> ActionCategory {
    let lowered = text.to_lowercase();
    if TERMINAL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        ActionCategory::TerminalCommand
    } else {
        ActionCategory::FileEdit
    }
}

/// Classify a candidate element.
///
/// Rules run in order: text length bounds, reject keywords, accept keywords,
/// visual enablement, categorization, deny-list. The first rule that fires
/// wins.
pub fn classify(el: &ElementInfo, deny: &DenyList) -> Classification {
    let text = el.text.trim();
    // The bound is in characters, not bytes; multibyte labels stay eligible.
    if text.is_empty() || text.chars().count() > MAX_BUTTON_TEXT_LEN {
        return Classification::Excluded;
    }

    let lowered = text.to_lowercase();
    if REJECT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return Classification::Excluded;
    }
    if !ACCEPT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return Classification::Excluded;
    }

    if !el.is_enabled() {
        return Classification::Excluded;
    }

    let category = categorize(text);
    if category == ActionCategory::TerminalCommand && deny.matches(el.command_or_text()) {
        return Classification::Banned;
    }

    Classification::Clickable(category)
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
