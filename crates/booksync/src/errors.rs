//! Error, warning and finding output for the command line

use crate::theme;
use colored::*;

/// Print an error with its chain of causes
pub fn print_error(context: &str, error: &anyhow::Error) {
    eprintln!(
        "{} {} {}",
        theme::error(theme::error_symbol()),
        theme::error("Error:").bold(),
        context
    );
    eprintln!("  {}", theme::error(&error.to_string()));

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".dimmed(), cause.to_string().dimmed());
    }
}

/// Print an error followed by a hint on how to resolve it
pub fn print_error_with_suggestion(context: &str, error: &anyhow::Error, suggestion: &str) {
    print_error(context, error);
    eprintln!("\n{} {}", theme::info("Suggestion:").bold(), suggestion);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", theme::warning(theme::warning_symbol()), message);
}

/// Print one audit finding: a counted heading, its items, and an optional hint
pub fn print_finding(title: &str, items: &[String], hint: Option<&str>) {
    if items.is_empty() {
        return;
    }
    println!("{} {} ({})", theme::warning(theme::warning_symbol()).bold(), title, items.len());
    for item in items {
        println!("    {}", item);
    }
    if let Some(hint) = hint {
        println!("    {} {}", theme::info(theme::info_symbol()), hint.dimmed());
    }
    println!();
}
