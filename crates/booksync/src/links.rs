//! Cross-reference link retargeting
//!
//! Pages get renamed and converted between formats; links that point at the
//! old name are redirected to the equivalent canonical-format file when one
//! can be identified unambiguously.

use crate::config::Config;
use crate::document::file_stem;
use crate::walker::{canonical_documents, scope_dirs};
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([^)]+)\)").expect("link target pattern"));
static URI_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("uri scheme pattern"));

/// One rewritten link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChange {
    pub old: String,
    pub new: String,
}

/// Pending link rewrites for one document
#[derive(Debug, Clone)]
pub struct LinkRewrite {
    pub path: PathBuf,
    pub changes: Vec<LinkChange>,
    pub text: String,
}

impl LinkRewrite {
    pub fn write(&self) -> Result<bool> {
        if self.changes.is_empty() {
            return Ok(false);
        }
        fs::write(&self.path, &self.text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!(path = %self.path.display(), changes = self.changes.len(), "rewrote links");
        Ok(true)
    }
}

/// Links that never resolve to a file under the root
pub fn is_external(target: &str) -> bool {
    target.starts_with('#') || target.starts_with('/') || URI_SCHEME.is_match(target)
}

/// Split `path#fragment` into its path and `#fragment` parts
fn split_fragment(target: &str) -> (&str, &str) {
    match target.find('#') {
        Some(at) => target.split_at(at),
        None => (target, ""),
    }
}

/// Inline link targets of a text, in order of appearance
pub fn link_targets(text: &str) -> impl Iterator<Item = &str> {
    LINK.captures_iter(text).filter_map(|caps| caps.get(1)).map(|m| m.as_str().trim())
}

/// Whether a relative link from a document in `dir` points at a missing file
pub fn is_broken(dir: &Path, target: &str) -> bool {
    if is_external(target) {
        return false;
    }
    let (path, _) = split_fragment(target);
    !path.is_empty() && !dir.join(path).exists()
}

/// NFC with spaces folded to underscores
fn normalize_stem(stem: &str) -> String {
    stem.nfc().collect::<String>().replace(' ', "_")
}

type Strategy = fn(&str, &[String]) -> Option<String>;

const STRATEGIES: &[Strategy] = &[exact_stem, normalized_stem, suffixed_stem];

fn exact_stem(stem: &str, candidates: &[String]) -> Option<String> {
    candidates.iter().find(|c| file_stem(Path::new(c)) == stem).cloned()
}

fn normalized_stem(stem: &str, candidates: &[String]) -> Option<String> {
    let wanted = normalize_stem(stem);
    candidates.iter().find(|c| normalize_stem(&file_stem(Path::new(c))) == wanted).cloned()
}

/// The single candidate whose stem is `stem` plus a `-` or `_` suffix
fn suffixed_stem(stem: &str, candidates: &[String]) -> Option<String> {
    let wanted = normalize_stem(stem);
    let mut matches = candidates.iter().filter(|c| {
        let other = normalize_stem(&file_stem(Path::new(c)));
        other
            .strip_prefix(&wanted)
            .is_some_and(|rest| rest.len() > 1 && (rest.starts_with('-') || rest.starts_with('_')))
    });

    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(only.clone()),
        _ => None,
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Canonical-format files in `folder`, the containing document excluded
fn candidates(folder: &Path, document: &Path, extension: &str) -> Vec<String> {
    let Ok(entries) = fs::read_dir(folder) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == extension))
        .filter(|p| !same_file(p, document))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names
}

/// Replacement target for a broken link from `document`, if one exists
pub fn find_equivalent(document: &Path, target: &str, extension: &str) -> Option<String> {
    if is_external(target) {
        return None;
    }

    let (path, fragment) = split_fragment(target);
    if path.is_empty() {
        return None;
    }
    let dir = document.parent().unwrap_or(Path::new(""));
    if dir.join(path).exists() {
        return None;
    }

    let (folder_part, name) = match path.rfind('/') {
        Some(at) => (&path[..=at], &path[at + 1..]),
        None => ("", path),
    };
    let stem = file_stem(Path::new(name));
    if stem.is_empty() {
        return None;
    }

    let pool = candidates(&dir.join(folder_part), document, extension);
    let found = STRATEGIES.iter().find_map(|strategy| strategy(&stem, &pool))?;
    debug!(document = %document.display(), from = target, to = %found, "found link equivalent");
    Some(format!("{}{}{}", folder_part, found, fragment))
}

/// Rewrite every retargetable link of `text`, which lives at `document`
pub fn retarget_text(text: &str, document: &Path, extension: &str) -> (String, Vec<LinkChange>) {
    let mut changes = Vec::new();

    let rewritten = LINK.replace_all(text, |caps: &Captures| {
        let old = caps[1].trim();
        match find_equivalent(document, old, extension) {
            Some(new) => {
                let replacement = format!("]({})", new);
                changes.push(LinkChange { old: old.to_string(), new });
                replacement
            }
            None => caps[0].to_string(),
        }
    });

    (rewritten.into_owned(), changes)
}

/// Compute link rewrites for one document without writing it
pub fn retarget(document: &Path, config: &Config) -> Result<LinkRewrite> {
    let text = fs::read_to_string(document)
        .with_context(|| format!("Failed to read {}", document.display()))?;
    let (text, changes) = retarget_text(&text, document, &config.canonical_extension);
    Ok(LinkRewrite { path: document.to_path_buf(), changes, text })
}

/// Documents with at least one retargetable link, across the root or one chapter
pub fn plan_links(config: &Config, chapter: Option<&str>) -> Result<Vec<LinkRewrite>> {
    let mut rewrites = Vec::new();
    for dir in scope_dirs(config, chapter)? {
        for document in canonical_documents(&dir, config)? {
            match retarget(&document, config) {
                Ok(rewrite) if !rewrite.changes.is_empty() => rewrites.push(rewrite),
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %document.display(), error = %format!("{:#}", e), "skipping document");
                }
            }
        }
    }
    Ok(rewrites)
}
