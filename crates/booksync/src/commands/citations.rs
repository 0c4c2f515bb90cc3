//! Citations command implementation

use super::{display_path, print_dry_run_hint};
use anyhow::Result;
use booksync::citations::plan_citations;
use booksync::config::Config;
use booksync::theme;
use colored::*;

/// Convert `{cite}` roles to Pandoc citations
pub fn convert_citations(config: &Config, chapter: Option<&str>, apply: bool) -> Result<()> {
    println!("{}\n", "Checking citations...".bold());

    let rewrites = plan_citations(config, chapter)?;
    if rewrites.is_empty() {
        println!("{}", theme::success("✓ No {cite} roles found"));
        return Ok(());
    }

    for rewrite in &rewrites {
        println!(
            "  {} {} ({} citation(s))",
            theme::success_symbol().green(),
            theme::path(&display_path(config, &rewrite.path)),
            rewrite.count
        );
        if apply {
            rewrite.write()?;
        }
    }

    if apply {
        println!("\n{} {} file(s) patched", theme::success_symbol().green().bold(), rewrites.len());
    } else {
        print_dry_run_hint(rewrites.len(), "--apply");
    }

    Ok(())
}
