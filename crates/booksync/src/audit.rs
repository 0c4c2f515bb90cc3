//! Read-only consistency audit of a book tree, plus the opt-in repairs

use crate::bib::duplicate_keys_in;
use crate::config::Config;
use crate::document::{file_stem, DocKind};
use crate::index::plan_chapter_index;
use crate::links::{is_broken, link_targets};
use crate::toc::DeclaredToc;
use crate::walker::{
    canonical_documents, child_documents, ensure_root, scope_dirs, select_chapters, Exclusions,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A link whose target does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub document: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub root: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub missing_indexes: Vec<String>,
    pub orphans: Vec<String>,
    pub duplicate_bib_keys: Vec<String>,
    pub broken_links: Vec<BrokenLink>,
    pub missing_toc_entries: Vec<String>,
}

impl AuditReport {
    pub fn finding_count(&self) -> usize {
        self.missing_indexes.len()
            + self.orphans.len()
            + self.duplicate_bib_keys.len()
            + self.broken_links.len()
            + self.missing_toc_entries.len()
    }

    pub fn is_clean(&self) -> bool {
        self.finding_count() == 0
    }
}

/// Root-relative path with forward slashes
fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/")
}

fn chapter_name(folder: &Path) -> String {
    folder.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Targets linked from a chapter's landing page, fragments stripped.
/// An unreadable landing page lists nothing.
fn listed_in_index(index: &Path) -> HashSet<String> {
    if !index.is_file() {
        return HashSet::new();
    }
    match fs::read_to_string(index) {
        Ok(text) => link_targets(&text)
            .map(|t| t.split('#').next().unwrap_or_default().to_string())
            .collect(),
        Err(e) => {
            warn!(path = %index.display(), error = %e, "skipping unreadable landing page");
            HashSet::new()
        }
    }
}

fn find_orphans(
    folder: &Path,
    config: &Config,
    declared: &HashSet<String>,
) -> Result<Vec<String>> {
    let exclusions = Exclusions::from_config(config)?;
    let index_name = config.index_filename();
    let listed = listed_in_index(&folder.join(index_name));
    let chapter = chapter_name(folder);

    let mut orphans = Vec::new();
    for doc in child_documents(folder, &exclusions)? {
        let Some(name) = doc.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if name == index_name {
            continue;
        }

        let mut names = vec![name.clone()];
        if DocKind::from_path(&doc) == Some(DocKind::Notebook) {
            names.push(format!("{}.{}", file_stem(&doc), config.canonical_extension));
        }

        let is_listed = names
            .iter()
            .any(|n| listed.contains(n) || declared.contains(&format!("{}/{}", chapter, n)));
        if !is_listed {
            orphans.push(format!("{}/{}", chapter, name));
        }
    }
    Ok(orphans)
}

fn find_broken_links(dir: &Path, config: &Config) -> Result<Vec<BrokenLink>> {
    let mut broken = Vec::new();
    for doc in canonical_documents(dir, config)? {
        let text = match fs::read_to_string(&doc) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %doc.display(), error = %e, "skipping unreadable document");
                continue;
            }
        };
        let parent = doc.parent().unwrap_or(Path::new(""));
        for target in link_targets(&text) {
            if is_broken(parent, target) {
                broken.push(BrokenLink {
                    document: relative(&config.root, &doc),
                    target: target.to_string(),
                });
            }
        }
    }
    Ok(broken)
}

/// Audit the whole book, or one chapter of it. Never writes.
pub fn audit(config: &Config, chapter: Option<&str>) -> Result<AuditReport> {
    ensure_root(&config.root)?;
    let root = config.root.as_path();
    let folders = select_chapters(config, chapter)?;
    let toc = DeclaredToc::load(&config.toc_path())?;
    let index_name = config.index_filename();

    let in_scope = |entry: &str| chapter.map_or(true, |c| entry.starts_with(&format!("{}/", c)));

    let declared: HashSet<String> =
        toc.as_ref().map(|t| t.entries().into_iter().collect()).unwrap_or_default();

    let mut missing_indexes: Vec<String> = folders
        .iter()
        .filter(|f| !f.join(index_name).exists())
        .map(|f| chapter_name(f))
        .collect();
    if let Some(toc) = &toc {
        for folder in toc.missing_chapter_indexes(root, index_name) {
            let scoped = chapter.map_or(true, |c| c == folder);
            if scoped && !missing_indexes.contains(&folder) {
                missing_indexes.push(folder);
            }
        }
    }

    let mut orphans = Vec::new();
    for folder in &folders {
        orphans.extend(find_orphans(folder, config, &declared)?);
    }

    let mut broken_links = Vec::new();
    for dir in scope_dirs(config, chapter)? {
        broken_links.extend(find_broken_links(&dir, config)?);
    }

    let missing_toc_entries = toc
        .as_ref()
        .map(|t| t.missing_entries(root).into_iter().filter(|e| in_scope(e.as_str())).collect())
        .unwrap_or_default();

    let report = AuditReport {
        root: config.root.clone(),
        generated_at: Utc::now(),
        missing_indexes,
        orphans,
        duplicate_bib_keys: duplicate_keys_in(&config.bibliography_path())?,
        broken_links,
        missing_toc_entries,
    };
    debug!(findings = report.finding_count(), "audit complete");
    Ok(report)
}

/// Generate the landing page for every reported chapter folder that exists.
/// Returns the written pages.
pub fn fix_missing_indexes(config: &Config, report: &AuditReport) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for name in &report.missing_indexes {
        let folder = config.root.join(name);
        if !folder.is_dir() {
            debug!(chapter = %name, "declared chapter has no folder; nothing to generate");
            continue;
        }
        let update = plan_chapter_index(&folder, config, true)?;
        if update.write()? {
            written.push(update.path);
        }
    }
    Ok(written)
}

/// Drop missing entries from the declared table of contents, after a backup.
/// Returns the backup path, or `None` when nothing needed removing.
pub fn fix_toc(config: &Config, report: &AuditReport) -> Result<Option<PathBuf>> {
    if report.missing_toc_entries.is_empty() {
        return Ok(None);
    }
    let Some(toc) = DeclaredToc::load(&config.toc_path())? else {
        return Ok(None);
    };
    toc.remove_entries_with_backup(&report.missing_toc_entries).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_clean_book() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("theory/index.qmd"), "- [A](a.qmd)\n");
        touch(&temp.path().join("theory/a.qmd"), "# A\n");
        let config = Config::for_root(temp.path());

        let report = audit(&config, None).unwrap();
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_missing_index_and_orphan() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("theory/a.qmd"), "# A\n");
        touch(&temp.path().join("theory/_draft.qmd"), "# Draft\n");
        let config = Config::for_root(temp.path());

        let report = audit(&config, None).unwrap();
        assert_eq!(report.missing_indexes, vec!["theory"]);
        assert_eq!(report.orphans, vec!["theory/a.qmd"]);
    }

    #[test]
    fn test_notebook_listed_through_converted_sibling() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("stats/index.qmd"), "- [X](x.qmd)\n");
        touch(&temp.path().join("stats/x.qmd"), "# X\n");
        touch(&temp.path().join("stats/x.ipynb"), "{}");
        let config = Config::for_root(temp.path());

        assert!(audit(&config, None).unwrap().orphans.is_empty());
    }

    #[test]
    fn test_declared_page_is_not_orphan() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("_quarto.yml"), "book:\n  chapters:\n    - stats/x.qmd\n");
        touch(&temp.path().join("stats/index.qmd"), "");
        touch(&temp.path().join("stats/x.qmd"), "# X\n");
        let config = Config::for_root(temp.path());

        assert!(audit(&config, None).unwrap().orphans.is_empty());
    }

    #[test]
    fn test_broken_links_and_duplicate_keys() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("index.qmd"), "[ok](theory/index.qmd) [bad](gone.qmd#x) [web](https://x.org)\n");
        touch(&temp.path().join("theory/index.qmd"), "[up](../index.qmd)\n");
        touch(&temp.path().join("references.bib"), "@article{k1,\n}\n@book{k1,\n}\n");
        let config = Config::for_root(temp.path());

        let report = audit(&config, None).unwrap();
        assert_eq!(
            report.broken_links,
            vec![BrokenLink { document: "index.qmd".into(), target: "gone.qmd#x".into() }]
        );
        assert_eq!(report.duplicate_bib_keys, vec!["k1"]);
    }

    #[test]
    fn test_declared_chapter_without_folder() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("_quarto.yml"), "book:\n  chapters:\n    - a/index.qmd\n    - b/index.qmd\n");
        touch(&temp.path().join("a/index.qmd"), "");
        let config = Config::for_root(temp.path());

        let report = audit(&config, None).unwrap();
        assert_eq!(report.missing_indexes, vec!["b"]);
        assert_eq!(report.missing_toc_entries, vec!["b/index.qmd"]);

        // Nothing on disk to generate for b
        assert!(fix_missing_indexes(&config, &report).unwrap().is_empty());

        let backup = fix_toc(&config, &report).unwrap().unwrap();
        assert!(backup.is_file());
        assert!(audit(&config, None).unwrap().is_clean());
    }

    #[test]
    fn test_fix_generates_missing_index() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("theory/a.qmd"), "# A\n\nFirst page.\n");
        let config = Config::for_root(temp.path());

        let report = audit(&config, None).unwrap();
        let written = fix_missing_indexes(&config, &report).unwrap();
        assert_eq!(written, vec![temp.path().join("theory/index.qmd")]);

        let after = audit(&config, None).unwrap();
        assert!(after.missing_indexes.is_empty());
        assert!(after.orphans.is_empty());
    }

    #[test]
    fn test_audit_does_not_write() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("_quarto.yml"), "book:\n  chapters:\n    - gone.qmd\n");
        touch(&temp.path().join("theory/a.qmd"), "[x](missing.ipynb)\n");
        let config = Config::for_root(temp.path());

        audit(&config, None).unwrap();
        assert!(!temp.path().join("theory/index.qmd").exists());
        assert!(!temp.path().join("_quarto.yml.bak").exists());
        assert_eq!(fs::read_to_string(temp.path().join("theory/a.qmd")).unwrap(), "[x](missing.ipynb)\n");
    }

    #[test]
    fn test_scoped_to_chapter() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a/page.qmd"), "");
        touch(&temp.path().join("b/page.qmd"), "");
        let config = Config::for_root(temp.path());

        let report = audit(&config, Some("b")).unwrap();
        assert_eq!(report.missing_indexes, vec!["b"]);
        assert_eq!(report.orphans, vec!["b/page.qmd"]);
    }

    #[test]
    fn test_unreadable_document_does_not_stop_audit() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("theory/index.qmd"), "- [Latin](latin1.qmd)\n- [A](a.qmd)\n");
        fs::write(temp.path().join("theory/latin1.qmd"), b"Caf\xe9 [x](gone.qmd)\n").unwrap();
        touch(&temp.path().join("theory/a.qmd"), "[bad](missing.qmd)\n");
        let config = Config::for_root(temp.path());

        let report = audit(&config, None).unwrap();
        assert_eq!(
            report.broken_links,
            vec![BrokenLink { document: "theory/a.qmd".into(), target: "missing.qmd".into() }]
        );
        assert!(report.orphans.is_empty());
    }

    #[test]
    fn test_unreadable_landing_page_lists_nothing() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("theory")).unwrap();
        fs::write(temp.path().join("theory/index.qmd"), b"\xff\xfe [A](a.qmd)\n").unwrap();
        touch(&temp.path().join("theory/a.qmd"), "# A\n");
        let config = Config::for_root(temp.path());

        let report = audit(&config, None).unwrap();
        assert_eq!(report.orphans, vec!["theory/a.qmd"]);
    }

    #[test]
    fn test_report_serializes() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a")).unwrap();
        let config = Config::for_root(temp.path());

        let json = serde_json::to_value(audit(&config, None).unwrap()).unwrap();
        assert_eq!(json["missing_indexes"], serde_json::json!(["a"]));
        assert!(json["generated_at"].is_string());
    }
}
