//! Links command implementation

use super::{display_path, print_dry_run_hint};
use anyhow::Result;
use booksync::config::Config;
use booksync::links::plan_links;
use booksync::theme;
use colored::*;

/// Retarget links to renamed or converted pages
pub fn fix_links(config: &Config, chapter: Option<&str>, apply: bool) -> Result<()> {
    println!("{}\n", "Checking links...".bold());

    let rewrites = plan_links(config, chapter)?;
    if rewrites.is_empty() {
        println!("{}", theme::success("✓ No links need retargeting"));
        return Ok(());
    }

    for rewrite in &rewrites {
        println!("{}", theme::path(&display_path(config, &rewrite.path)));
        for change in &rewrite.changes {
            println!(
                "  {} {} {} {}",
                theme::success_symbol().green(),
                change.old.dimmed(),
                theme::info_symbol().cyan(),
                change.new
            );
        }
        if apply {
            rewrite.write()?;
        }
    }

    if apply {
        let total: usize = rewrites.iter().map(|r| r.changes.len()).sum();
        println!(
            "\n{} {} link(s) retargeted in {} file(s)",
            theme::success_symbol().green().bold(),
            total,
            rewrites.len()
        );
    } else {
        print_dry_run_hint(rewrites.len(), "--apply");
    }

    Ok(())
}
