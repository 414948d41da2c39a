use super::*;
use crate::dom::{ElementHandle, ElementInfo};

fn candidate(text: &str) -> ElementInfo {
    ElementInfo {
        handle: ElementHandle(0),
        text: text.to_string(),
        command_text: None,
        display_none: false,
        width: 80.0,
        pointer_events_none: false,
        disabled: false,
    }
}

#[test]
fn test_empty_and_oversized_text_excluded() {
    let deny = DenyList::default();
    assert_eq!(classify(&candidate(""), &deny), Classification::Excluded);
    assert_eq!(classify(&candidate("   "), &deny), Classification::Excluded);

    let long = "Accept ".repeat(20);
    assert_eq!(classify(&candidate(&long), &deny), Classification::Excluded);
}

#[test]
fn test_length_bound_counts_characters_not_bytes() {
    let deny = DenyList::default();

    // 22 characters but 52 bytes: still within the bound.
    let multibyte = format!("Accept {}", "変".repeat(15));
    assert_eq!(
        classify(&candidate(&multibyte), &deny),
        Classification::Clickable(ActionCategory::FileEdit)
    );

    let too_long = format!("Accept {}", "変".repeat(60));
    assert_eq!(classify(&candidate(&too_long), &deny), Classification::Excluded);
}

#[test]
fn test_reject_keywords_win_over_accept() {
    let deny = DenyList::default();
    // "Cancel run" contains both an accept and a reject keyword; reject wins.
    assert_eq!(classify(&candidate("Cancel run"), &deny), Classification::Excluded);
    assert_eq!(classify(&candidate("Skip"), &deny), Classification::Excluded);
    assert_eq!(classify(&candidate("Refine"), &deny), Classification::Excluded);
}

#[test]
fn test_accept_keyword_required() {
    let deny = DenyList::default();
    assert_eq!(classify(&candidate("Open file"), &deny), Classification::Excluded);
    assert_eq!(
        classify(&candidate("Accept"), &deny),
        Classification::Clickable(ActionCategory::FileEdit)
    );
    assert_eq!(
        classify(&candidate("Apply changes"), &deny),
        Classification::Clickable(ActionCategory::FileEdit)
    );
}

#[test]
fn test_disabled_or_hidden_excluded() {
    let deny = DenyList::default();

    let mut hidden = candidate("Accept");
    hidden.display_none = true;
    assert_eq!(classify(&hidden, &deny), Classification::Excluded);

    let mut zero_width = candidate("Accept");
    zero_width.width = 0.0;
    assert_eq!(classify(&zero_width, &deny), Classification::Excluded);

    let mut disabled = candidate("Accept");
    disabled.disabled = true;
    assert_eq!(classify(&disabled, &deny), Classification::Excluded);
}

#[test]
fn test_terminal_categorization() {
    let deny = DenyList::new(vec![]);
    assert_eq!(
        classify(&candidate("Run"), &deny),
        Classification::Clickable(ActionCategory::TerminalCommand)
    );
    assert_eq!(
        classify(&candidate("Execute"), &deny),
        Classification::Clickable(ActionCategory::TerminalCommand)
    );
    assert_eq!(
        classify(&candidate("Retry"), &deny),
        Classification::Clickable(ActionCategory::FileEdit)
    );
}

#[test]
fn test_deny_list_bans_terminal_commands() {
    let deny = DenyList::new(vec!["rm -rf /".to_string()]);
    let mut el = candidate("Run");
    el.command_text = Some("Run: rm -rf /tmp && rm -rf /".to_string());
    assert_eq!(classify(&el, &deny), Classification::Banned);
}

#[test]
fn test_deny_list_is_case_insensitive_substring() {
    let deny = DenyList::new(vec!["RM -RF /".to_string()]);
    assert!(deny.matches("sudo rm -rf / --no-preserve-root"));
    assert!(!deny.matches("rm -r ./build"));
}

#[test]
fn test_deny_list_never_bans_file_edits() {
    // A file-edit candidate whose surrounding text happens to contain a banned
    // pattern is still clickable: banned implies terminal_command.
    let deny = DenyList::new(vec!["rm -rf /".to_string()]);
    let mut el = candidate("Accept");
    el.command_text = Some("rm -rf /".to_string());
    assert_eq!(
        classify(&el, &deny),
        Classification::Clickable(ActionCategory::FileEdit)
    );
}

#[test]
fn test_classification_is_total() {
    let deny = DenyList::default();
    let texts = ["", "Accept", "Run", "Skip", "Run: rm -rf /", "Hello world"];
    for text in texts {
        let mut el = candidate(text);
        el.command_text = Some(text.to_string());
        let verdict = classify(&el, &deny);
        if verdict == Classification::Banned {
            assert_eq!(categorize(text), ActionCategory::TerminalCommand);
        }
    }
}

#[test]
fn test_default_patterns_cover_canonical_signatures() {
    let deny = DenyList::default();
    assert!(deny.matches("rm -rf /"));
    assert!(deny.matches("mkfs.ext4 /dev/sda1"));
    assert!(deny.matches(":(){:|:&};:"));
    assert!(deny.matches("FORMAT C:"));
}

#[test]
fn test_deny_list_skips_blank_patterns() {
    let deny = DenyList::new(vec!["  ".to_string(), "dd if=".to_string()]);
    assert_eq!(deny.len(), 1);
    assert!(deny.matches("dd if=/dev/zero of=/dev/sda"));
}
