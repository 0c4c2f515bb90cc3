//! Command implementations

pub mod audit;
pub mod citations;
pub mod index;
pub mod links;

pub use audit::audit_book;
pub use citations::convert_citations;
pub use index::update_indexes;
pub use links::fix_links;

use booksync::config::Config;
use booksync::theme;
use colored::*;
use std::path::Path;

/// Path relative to the book root for display
pub fn display_path(config: &Config, path: &Path) -> String {
    path.strip_prefix(&config.root).unwrap_or(path).to_string_lossy().replace('\\', "/")
}

/// Footer shown after a dry run that found work to do
pub fn print_dry_run_hint(pending: usize, flag: &str) {
    if pending > 0 {
        println!(
            "\n{} {} file(s) would change. Run with {} to write them.",
            theme::info_symbol().cyan(),
            pending,
            flag.cyan()
        );
    }
}
