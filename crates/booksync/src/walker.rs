//! Chapter and page discovery
//!
//! Chapters are the top-level folders of the book root; pages are the
//! recognized documents directly inside a chapter. Everything here returns
//! results in file-name order, which is also the order pages appear in the
//! generated index.

use crate::config::Config;
use crate::constants::{EXCLUDED_NAMES, PAGE_EXTENSIONS, RESERVED_PREFIX};
use crate::document::{file_stem, DocKind};
use crate::extract::extract_path;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Book root not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Chapter '{0}' not found")]
    ChapterNotFound(String),

    #[error("Invalid exclude pattern '{pattern}': {message}")]
    BadPattern { pattern: String, message: String },
}

/// One line of a chapter's page list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub title: String,
    /// Link target relative to the chapter folder
    pub link: String,
    pub description: String,
    pub source: PathBuf,
}

/// Names that never count as chapters or pages
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    patterns: Vec<glob::Pattern>,
}

impl Exclusions {
    pub fn from_config(config: &Config) -> Result<Self, TreeError> {
        let patterns = config
            .exclude
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| TreeError::BadPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Exclusions { patterns })
    }

    /// Infrastructure directories, reserved `_` names and configured patterns
    pub fn is_excluded(&self, name: &str) -> bool {
        EXCLUDED_NAMES.contains(&name)
            || name.starts_with(RESERVED_PREFIX)
            || self.patterns.iter().any(|p| p.matches(name))
    }
}

/// Verify the root exists and is a directory
pub fn ensure_root(root: &Path) -> Result<(), TreeError> {
    if !root.exists() {
        return Err(TreeError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(TreeError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Top-level chapter folders of the root, sorted by name
pub fn chapters(config: &Config) -> Result<Vec<PathBuf>> {
    ensure_root(&config.root)?;
    let exclusions = Exclusions::from_config(config)?;

    let mut folders = Vec::new();
    for entry in WalkDir::new(&config.root).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", config.root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || exclusions.is_excluded(&name) {
            debug!(folder = %name, "skipping non-chapter folder");
            continue;
        }
        folders.push(entry.into_path());
    }

    Ok(folders)
}

/// Chapters, optionally narrowed to the one named `only`
pub fn select_chapters(config: &Config, only: Option<&str>) -> Result<Vec<PathBuf>> {
    let all = chapters(config)?;
    match only {
        None => Ok(all),
        Some(name) => {
            let selected: Vec<_> =
                all.into_iter().filter(|p| p.file_name().is_some_and(|n| n == name)).collect();
            if selected.is_empty() {
                return Err(TreeError::ChapterNotFound(name.to_string()).into());
            }
            Ok(selected)
        }
    }
}

/// Directories a command works on: the named chapter, or the whole root
pub fn scope_dirs(config: &Config, only: Option<&str>) -> Result<Vec<PathBuf>> {
    match only {
        Some(_) => select_chapters(config, only),
        None => {
            ensure_root(&config.root)?;
            Ok(vec![config.root.clone()])
        }
    }
}

/// Recognized documents directly inside `folder`, excluding reserved names
pub fn child_documents(folder: &Path, exclusions: &Exclusions) -> Result<Vec<PathBuf>> {
    let mut docs = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", folder.display()))?;
        if !entry.file_type().is_file() || !has_page_extension(entry.path()) {
            continue;
        }
        if exclusions.is_excluded(&entry.file_name().to_string_lossy()) {
            continue;
        }
        docs.push(entry.into_path());
    }
    Ok(docs)
}

fn has_page_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| PAGE_EXTENSIONS.contains(&ext))
}

/// Link target for a page: a notebook that already has a converted sibling
/// links to the sibling.
pub fn link_target(path: &Path, canonical_extension: &str) -> String {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    if DocKind::from_path(path) == Some(DocKind::Notebook) {
        let sibling = format!("{}.{}", file_stem(path), canonical_extension);
        if path.with_file_name(&sibling).is_file() {
            return sibling;
        }
    }

    name
}

/// Ordered page entries of a chapter, its own landing page excluded
pub fn collect(folder: &Path, config: &Config) -> Result<Vec<PageEntry>> {
    let exclusions = Exclusions::from_config(config)?;
    let index_name = config.index_filename();

    let entries = child_documents(folder, &exclusions)?
        .into_iter()
        .filter(|p| p.file_name().is_some_and(|n| n != index_name))
        .map(|path| {
            let meta = extract_path(&path);
            PageEntry {
                title: meta.title,
                link: link_target(&path, &config.canonical_extension),
                description: meta.description,
                source: path,
            }
        })
        .collect();

    Ok(entries)
}

/// Canonical-format documents anywhere below `dir`
pub fn canonical_documents(dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    documents_below(dir, &[config.canonical_extension.as_str()])
}

/// Files with one of `extensions` anywhere below `dir`, skipping build output and hidden folders
pub fn documents_below(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut docs = Vec::new();

    let walker = WalkDir::new(dir).sort_by_file_name().into_iter().filter_entry(|e| {
        if e.depth() == 0 || !e.file_type().is_dir() {
            return true;
        }
        let name = e.file_name().to_string_lossy();
        !(name.starts_with('.') || EXCLUDED_NAMES.contains(&&*name))
    });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if entry.file_type().is_file() && matches {
            docs.push(entry.into_path());
        }
    }

    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn book() -> (TempDir, Config) {
        let temp = TempDir::new().unwrap();
        let config = Config::for_root(temp.path());
        (temp, config)
    }

    #[test]
    fn test_chapters_sorted_and_filtered() {
        let (temp, config) = book();
        for dir in ["theory", "a2d", "_build", ".quarto", "_private", ".git", "statistics"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        touch(&temp.path().join("index.qmd"), "# Root");

        let names: Vec<_> = chapters(&config)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a2d", "statistics", "theory"]);
    }

    #[test]
    fn test_chapters_missing_root() {
        let config = Config::for_root("/nonexistent/book/root");
        let err = chapters(&config).unwrap_err();
        assert!(err.downcast_ref::<TreeError>().is_some());
    }

    #[test]
    fn test_select_unknown_chapter() {
        let (temp, config) = book();
        fs::create_dir_all(temp.path().join("theory")).unwrap();

        assert_eq!(select_chapters(&config, Some("theory")).unwrap().len(), 1);
        assert!(select_chapters(&config, Some("calibration")).is_err());
    }

    #[test]
    fn test_collect_order_and_exclusions() {
        let (temp, config) = book();
        let ch = temp.path().join("theory");
        touch(&ch.join("zeta.md"), "# Zeta\n\nLast.");
        touch(&ch.join("alpha.qmd"), "# Alpha\n\nFirst.");
        touch(&ch.join("index.qmd"), "# Index");
        touch(&ch.join("_draft.md"), "# Draft");
        touch(&ch.join("data.csv"), "1,2,3");
        touch(&ch.join("Beta.md"), "# Beta");
        fs::create_dir_all(ch.join(".ipynb_checkpoints")).unwrap();

        let pages = collect(&ch, &config).unwrap();
        let links: Vec<_> = pages.iter().map(|p| p.link.as_str()).collect();
        assert_eq!(links, vec!["Beta.md", "alpha.qmd", "zeta.md"]);
        assert_eq!(pages[1].title, "Alpha");
        assert_eq!(pages[1].description, "First.");

        // Stable across repeated calls
        assert_eq!(collect(&ch, &config).unwrap(), pages);
    }

    #[test]
    fn test_collect_intro_mode_excludes_intro() {
        let (temp, mut config) = book();
        config.mode = crate::config::IndexMode::Intro;
        let ch = temp.path().join("theory");
        touch(&ch.join("intro.md"), "# Intro");
        touch(&ch.join("index.qmd"), "# Index");

        let pages = collect(&ch, &config).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].link, "index.qmd");
    }

    #[test]
    fn test_collect_configured_exclude_pattern() {
        let (temp, mut config) = book();
        config.exclude = vec!["*.draft.md".to_string()];
        let ch = temp.path().join("theory");
        touch(&ch.join("notes.draft.md"), "# Draft");
        touch(&ch.join("notes.md"), "# Notes");

        let pages = collect(&ch, &config).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].link, "notes.md");
    }

    #[test]
    fn test_bad_exclude_pattern() {
        let mut config = Config::default();
        config.exclude = vec!["[".to_string()];
        assert!(matches!(Exclusions::from_config(&config), Err(TreeError::BadPattern { .. })));
    }

    #[test]
    fn test_link_prefers_converted_sibling() {
        let (temp, config) = book();
        let ch = temp.path().join("statistics");
        touch(&ch.join("x.ipynb"), r#"{"cells": []}"#);
        touch(&ch.join("x.qmd"), "# X");
        touch(&ch.join("y.ipynb"), r#"{"cells": []}"#);

        assert_eq!(link_target(&ch.join("x.ipynb"), "qmd"), "x.qmd");
        assert_eq!(link_target(&ch.join("y.ipynb"), "qmd"), "y.ipynb");
        assert_eq!(link_target(&ch.join("x.qmd"), "qmd"), "x.qmd");

        let pages = collect(&ch, &config).unwrap();
        let links: Vec<_> = pages.iter().map(|p| p.link.as_str()).collect();
        assert_eq!(links, vec!["x.qmd", "x.qmd", "y.ipynb"]);
    }

    #[test]
    fn test_canonical_documents_recursive() {
        let (temp, config) = book();
        touch(&temp.path().join("a/one.qmd"), "");
        touch(&temp.path().join("a/sub/two.qmd"), "");
        touch(&temp.path().join("a/three.md"), "");
        touch(&temp.path().join("_build/out.qmd"), "");
        touch(&temp.path().join(".quarto/cache.qmd"), "");

        let docs = canonical_documents(temp.path(), &config).unwrap();
        let rel: Vec<_> = docs
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a/one.qmd", "a/sub/two.qmd"]);
    }
}
