//! Audit command implementation

use crate::cli::ReportFormat;
use anyhow::{Context, Result};
use booksync::audit::{audit, fix_missing_indexes, fix_toc, AuditReport};
use booksync::config::Config;
use booksync::errors::print_finding;
use booksync::theme;
use colored::*;

fn print_report(report: &AuditReport) {
    print_finding(
        "Chapters without an index",
        &report.missing_indexes,
        Some("Run 'booksync audit --fix' to generate them"),
    );
    print_finding(
        "Pages not listed in their chapter index or the table of contents",
        &report.orphans,
        Some("Run 'booksync index --apply' to refresh chapter indexes"),
    );
    print_finding("Duplicate bibliography keys", &report.duplicate_bib_keys, None);

    let broken: Vec<String> = report
        .broken_links
        .iter()
        .map(|link| format!("{} {} {}", link.document, theme::info_symbol(), link.target))
        .collect();
    print_finding(
        "Broken links",
        &broken,
        Some("Run 'booksync links' to look for renamed targets"),
    );
    print_finding(
        "Table of contents entries without a file",
        &report.missing_toc_entries,
        Some("Run 'booksync audit --fix-toc' to remove them"),
    );

    if report.is_clean() {
        println!("{} Book is consistent!", theme::success_symbol().green().bold());
    } else {
        println!("{} Found {} issue(s)", "Summary:".bold(), report.finding_count());
    }
}

/// Audit the book, then run the requested repairs
pub fn audit_book(
    config: &Config,
    chapter: Option<&str>,
    fix: bool,
    fix_toc_entries: bool,
    format: ReportFormat,
) -> Result<()> {
    let mut report = audit(config, chapter)?;

    match format {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{}", json);
        }
        ReportFormat::Text => {
            println!("\n{}\n", "Auditing book...".bold());
            print_report(&report);
        }
    }

    if fix {
        let generated = fix_missing_indexes(config, &report)?;
        for path in &generated {
            eprintln!(
                "{} Generated {}",
                theme::success_symbol().green(),
                super::display_path(config, path)
            );
        }
        // Newly generated pages may satisfy table of contents entries
        if !generated.is_empty() {
            report = audit(config, chapter)?;
        }
    }

    if fix_toc_entries {
        if let Some(backup) = fix_toc(config, &report)? {
            eprintln!(
                "{} Removed {} missing entry(ies) from {} (backup: {})",
                theme::success_symbol().green(),
                report.missing_toc_entries.len(),
                config.toc_file.display(),
                super::display_path(config, &backup)
            );
        }
    }

    Ok(())
}
