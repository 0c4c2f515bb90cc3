//! Chapter landing page generation
//!
//! Builds the canonical page-list block for a chapter and merges it into the
//! chapter's landing page. New pages (and `--force` rewrites) in index mode
//! also get a chapter body: summary, learning objectives and prerequisites.

use crate::config::{Config, IndexMode};
use crate::constants::{AUTOGEN_END, AUTOGEN_START, LOCAL_TOC_FILENAME, PAGES_HEADING};
use crate::document::{default_front_matter, file_stem, title_from_folder, Document};
use crate::extract::{extract, sanitize_description};
use crate::region::{ensure_front_matter, synchronize, SyncAction};
use crate::walker::{collect, select_chapters, PageEntry};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const INTRO_CANDIDATES: &[&str] = &["intro.qmd", "intro.md", "intro.ipynb"];
const DEFAULT_SUMMARY: &str = "Short chapter summary.";
const DEFAULT_OBJECTIVE: &str = "Read the pages and run the notebooks.";

/// The computed new state of one chapter's landing page
#[derive(Debug, Clone)]
pub struct IndexUpdate {
    pub chapter: String,
    pub path: PathBuf,
    pub action: SyncAction,
    /// Whole page regenerated from the skeleton
    pub forced: bool,
    pub entries: Vec<PageEntry>,
    pub previous: Option<String>,
    pub text: String,
}

impl IndexUpdate {
    /// True when writing would change the file
    pub fn needs_write(&self) -> bool {
        self.action != SyncAction::PartialMarkers
            && self.previous.as_deref() != Some(self.text.as_str())
    }

    /// Write the page if it changed; returns whether a write happened
    pub fn write(&self) -> Result<bool> {
        if !self.needs_write() {
            return Ok(false);
        }
        fs::write(&self.path, &self.text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!(path = %self.path.display(), action = self.action.as_str(), "wrote chapter index");
        Ok(true)
    }

    pub fn describe(&self) -> &'static str {
        if self.forced && self.previous.is_some() && self.needs_write() {
            "rewritten"
        } else if self.needs_write() && self.action == SyncAction::Unchanged {
            "added front matter"
        } else {
            self.action.as_str()
        }
    }
}

/// Render the autogenerated block listing `entries`
pub fn build_block(entries: &[PageEntry], max_description: usize) -> String {
    let mut lines = vec![AUTOGEN_START.to_string(), PAGES_HEADING.to_string(), String::new()];

    for entry in entries {
        let clean = sanitize_description(&entry.description, max_description);
        let suffix = if clean.is_empty() { String::new() } else { format!(" — {}", clean) };
        lines.push(format!("- [{}]({}){}", entry.title, entry.link, suffix));
    }

    lines.push(String::new());
    lines.push(AUTOGEN_END.to_string());
    lines.join("\n")
}

fn chapter_name(folder: &Path) -> String {
    folder.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Summary paragraph for a new index page.
///
/// Prefers the chapter's intro page (`intro.qmd`, then `intro.md`, then
/// `intro.ipynb`), then the configured summary, then a placeholder.
pub fn chapter_summary(folder: &Path, config: &Config) -> String {
    for candidate in INTRO_CANDIDATES {
        let path = folder.join(candidate);
        if !path.is_file() {
            continue;
        }
        match Document::load(&path) {
            Ok(doc) => {
                let meta = extract(&doc);
                if !meta.description.is_empty() {
                    return meta.description;
                }
                if !meta.stem_fallback {
                    return meta.title;
                }
            }
            Err(e) => debug!(path = %path.display(), error = %e, "unreadable intro page"),
        }
        break;
    }

    config
        .chapter_defaults(&chapter_name(folder))
        .and_then(|d| d.summary.clone())
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string())
}

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|item| format!("- {}", item)).collect::<Vec<_>>().join("\n")
}

/// The full page written when a landing page is created
pub fn skeleton(folder: &Path, config: &Config, block: &str) -> String {
    let title = title_from_folder(&chapter_name(folder));
    let mut page = default_front_matter(&title);

    if config.mode == IndexMode::Index {
        let objectives = config
            .chapter_defaults(&chapter_name(folder))
            .map(|d| d.objectives.clone())
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_OBJECTIVE.to_string()]);

        page.push_str(&chapter_summary(folder, config));
        page.push_str("\n\n## Learning objectives\n\n");
        page.push_str(&bullet_list(&objectives));
        page.push_str("\n\n## Prerequisites\n\n");
        page.push_str(&bullet_list(&config.prerequisites));
        page.push_str("\n\n");
    }

    page.push_str(block);
    page.push('\n');
    page
}

/// Compute the new landing page for one chapter without writing it
pub fn plan_chapter_index(folder: &Path, config: &Config, force: bool) -> Result<IndexUpdate> {
    let entries = collect(folder, config)?;
    let block = build_block(&entries, config.description_max_len);
    let path = folder.join(config.index_filename());

    let previous = if path.is_file() {
        Some(fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?)
    } else {
        None
    };

    let page_skeleton = skeleton(folder, config, &block);
    let (text, action) = if force {
        (page_skeleton, SyncAction::Created)
    } else {
        let result = synchronize(previous.as_deref(), &block, &page_skeleton);
        let text = match (config.mode, result.action) {
            (_, SyncAction::PartialMarkers) | (IndexMode::Intro, _) => result.text,
            (IndexMode::Index, _) => {
                ensure_front_matter(&result.text, &title_from_folder(&chapter_name(folder)))
            }
        };
        (text, result.action)
    };

    Ok(IndexUpdate {
        chapter: chapter_name(folder),
        path,
        action,
        forced: force,
        entries,
        previous,
        text,
    })
}

/// Plan landing pages for every chapter, or only the named one.
/// A chapter whose landing page cannot be read is logged and left out.
pub fn plan_all(config: &Config, chapter: Option<&str>, force: bool) -> Result<Vec<IndexUpdate>> {
    let mut updates = Vec::new();
    for folder in select_chapters(config, chapter)? {
        match plan_chapter_index(&folder, config, force) {
            Ok(update) => updates.push(update),
            Err(e) => warn!(
                chapter = %chapter_name(&folder),
                error = %format!("{:#}", e),
                "skipping chapter"
            ),
        }
    }
    Ok(updates)
}

#[derive(Serialize)]
struct LocalToc {
    format: String,
    root: String,
    chapters: Vec<LocalTocFile>,
}

#[derive(Serialize)]
struct LocalTocFile {
    file: String,
}

/// Render a per-chapter `_toc.yml` for the given pages
pub fn render_local_toc(entries: &[PageEntry], config: &Config) -> Result<String> {
    let mut chapters: Vec<LocalTocFile> = Vec::new();
    for entry in entries {
        let stem = file_stem(Path::new(&entry.link));
        if chapters.last().is_some_and(|last| last.file == stem) {
            continue;
        }
        chapters.push(LocalTocFile { file: stem });
    }

    let toc = LocalToc {
        format: "jb-book".to_string(),
        root: file_stem(Path::new(config.index_filename())),
        chapters,
    };
    serde_yaml::to_string(&toc).context("Failed to serialize local table of contents")
}

/// Write `<chapter>/_toc.yml` when its content changed; returns whether it was written
pub fn write_local_toc(update: &IndexUpdate, config: &Config) -> Result<bool> {
    let Some(folder) = update.path.parent() else {
        return Ok(false);
    };
    let path = folder.join(LOCAL_TOC_FILENAME);
    let content = render_local_toc(&update.entries, config)?;

    if fs::read_to_string(&path).ok().as_deref() == Some(content.as_str()) {
        return Ok(false);
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote local table of contents");
    Ok(true)
}
