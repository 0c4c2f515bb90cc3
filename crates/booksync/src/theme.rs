//! Colors and symbols for command output

use crate::region::SyncAction;
use colored::*;

pub fn success(msg: &str) -> ColoredString {
    msg.green()
}

pub fn error(msg: &str) -> ColoredString {
    msg.red()
}

pub fn warning(msg: &str) -> ColoredString {
    msg.yellow()
}

pub fn info(msg: &str) -> ColoredString {
    msg.cyan()
}

/// Root-relative path or chapter name
pub fn path(msg: &str) -> ColoredString {
    msg.bold()
}

/// Colored label describing what happened to a landing page
pub fn action_badge(action: SyncAction, label: &str) -> ColoredString {
    match action {
        SyncAction::Created => label.green().bold(),
        SyncAction::Replaced | SyncAction::InsertedBeforeDirective | SyncAction::Appended => {
            label.cyan()
        }
        SyncAction::Unchanged => label.dimmed(),
        SyncAction::PartialMarkers => label.yellow(),
    }
}

pub fn success_symbol() -> &'static str {
    "✓"
}

pub fn error_symbol() -> &'static str {
    "✗"
}

pub fn warning_symbol() -> &'static str {
    "⚠"
}

pub fn info_symbol() -> &'static str {
    "→"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_keep_text() {
        assert!(success("done").to_string().contains("done"));
        assert!(error("failed").to_string().contains("failed"));
        assert!(warning("careful").to_string().contains("careful"));
        assert!(info("note").to_string().contains("note"));
        assert!(path("theory/index.qmd").to_string().contains("theory/index.qmd"));
    }

    #[test]
    fn test_action_badge_keeps_label() {
        for action in [
            SyncAction::Created,
            SyncAction::Replaced,
            SyncAction::Unchanged,
            SyncAction::InsertedBeforeDirective,
            SyncAction::Appended,
            SyncAction::PartialMarkers,
        ] {
            assert!(action_badge(action, action.as_str()).to_string().contains(action.as_str()));
        }
    }

    #[test]
    fn test_symbols() {
        assert_eq!(success_symbol(), "✓");
        assert_eq!(error_symbol(), "✗");
        assert_eq!(warning_symbol(), "⚠");
        assert_eq!(info_symbol(), "→");
    }
}
