//! Index command implementation

use super::{display_path, print_dry_run_hint};
use anyhow::Result;
use booksync::config::Config;
use booksync::errors::print_warning;
use booksync::index::{plan_all, write_local_toc};
use booksync::region::SyncAction;
use booksync::theme;
use colored::*;

/// Generate or refresh every chapter's landing page
pub fn update_indexes(
    config: &Config,
    chapter: Option<&str>,
    force: bool,
    apply: bool,
    create_tocs: bool,
) -> Result<()> {
    let heading = if apply { "Updating chapter indexes..." } else { "Checking chapter indexes..." };
    println!("{}\n", heading.bold());

    let updates = plan_all(config, chapter, force)?;
    let mut pending = 0;
    let mut written = 0;

    for update in &updates {
        let shown = display_path(config, &update.path);

        if update.action == SyncAction::PartialMarkers {
            print_warning(&format!("{}: {}", shown, update.action.as_str()));
            continue;
        }

        let symbol = if update.needs_write() {
            pending += 1;
            theme::success_symbol().green()
        } else {
            theme::success_symbol().dimmed()
        };
        println!(
            "  {} {} {} ({} page(s))",
            symbol,
            theme::path(&shown),
            theme::action_badge(update.action, update.describe()),
            update.entries.len()
        );

        if apply && update.write()? {
            written += 1;
        }
        if apply && create_tocs && write_local_toc(update, config)? {
            println!("    {} {}", theme::info_symbol().cyan(), "wrote _toc.yml".dimmed());
        }
    }

    if updates.is_empty() {
        println!("{} No chapter folders found", theme::warning_symbol().yellow());
    } else if apply {
        println!("\n{} {} landing page(s) written", theme::success_symbol().green().bold(), written);
    } else if pending == 0 {
        println!("\n{}", theme::success("✓ All chapter indexes are up to date!"));
    } else {
        print_dry_run_hint(pending, "--apply");
    }

    Ok(())
}
