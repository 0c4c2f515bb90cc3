//! MyST citation roles to Pandoc citations
//!
//! `` {cite}`a; b` `` becomes `[@a; @b]` in markdown pages and in the
//! markdown cells of notebooks.

use crate::config::Config;
use crate::document::{DocError, DocKind};
use crate::walker::{documents_below, scope_dirs};
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{info, warn};

static CITE_ROLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{cite\}`([^`]*)`").expect("cite role pattern"));

/// A document whose citations were converted
#[derive(Debug, Clone)]
pub struct CitationRewrite {
    pub path: PathBuf,
    pub count: usize,
    pub text: String,
}

impl CitationRewrite {
    pub fn write(&self) -> Result<()> {
        fs::write(&self.path, &self.text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!(path = %self.path.display(), citations = self.count, "converted citations");
        Ok(())
    }
}

/// Convert every cite role in `text`; returns the new text and the number of roles
pub fn convert_text(text: &str) -> (String, usize) {
    let mut count = 0;
    let converted = CITE_ROLE.replace_all(text, |caps: &Captures| {
        count += 1;
        let keys: Vec<String> = caps[1]
            .split([';', ','])
            .map(|k| k.trim().trim_start_matches('@'))
            .filter(|k| !k.is_empty())
            .map(|k| format!("@{}", k))
            .collect();
        format!("[{}]", keys.join("; "))
    });
    (converted.into_owned(), count)
}

/// Convert markdown cells of a notebook, keeping every other field and key order.
/// Returns `None` when nothing changed.
pub fn convert_notebook(path: &Path, json: &str) -> Result<Option<(String, usize)>, DocError> {
    let invalid = |message: String| DocError::InvalidNotebook { path: path.to_path_buf(), message };

    let mut notebook: Value = serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;
    let mut total = 0;

    if let Some(cells) = notebook.get_mut("cells").and_then(Value::as_array_mut) {
        for cell in cells.iter_mut() {
            if cell.get("cell_type").and_then(Value::as_str) != Some("markdown") {
                continue;
            }
            let Some(source) = cell.get_mut("source") else {
                continue;
            };
            total += convert_source(source);
        }
    }

    if total == 0 {
        return Ok(None);
    }

    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b" "));
    notebook.serialize(&mut serializer).map_err(|e| invalid(e.to_string()))?;
    let mut text = String::from_utf8(out).map_err(|e| invalid(e.to_string()))?;
    text.push('\n');
    Ok(Some((text, total)))
}

/// Cell source is either one string or a list of lines
fn convert_source(source: &mut Value) -> usize {
    match source {
        Value::String(s) => {
            let (converted, count) = convert_text(s);
            *s = converted;
            count
        }
        Value::Array(lines) => {
            let joined: String = lines.iter().filter_map(Value::as_str).collect();
            let (converted, count) = convert_text(&joined);
            if count > 0 {
                *lines = converted.split_inclusive('\n').map(|l| Value::String(l.to_string())).collect();
            }
            count
        }
        _ => 0,
    }
}

/// Compute the conversion for one document without writing it
pub fn plan_document(path: &Path) -> Result<Option<CitationRewrite>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let converted = match DocKind::from_path(path) {
        Some(DocKind::Notebook) => convert_notebook(path, &content)?,
        Some(_) => {
            let (text, count) = convert_text(&content);
            (count > 0).then_some((text, count))
        }
        None => return Err(DocError::Unsupported(path.to_path_buf()).into()),
    };

    Ok(converted.map(|(text, count)| CitationRewrite { path: path.to_path_buf(), count, text }))
}

/// Documents with citations to convert, across the root or one chapter
pub fn plan_citations(config: &Config, chapter: Option<&str>) -> Result<Vec<CitationRewrite>> {
    let mut rewrites = Vec::new();
    for dir in scope_dirs(config, chapter)? {
        for path in documents_below(&dir, &["md", "qmd", "ipynb"])? {
            match plan_document(&path) {
                Ok(Some(rewrite)) => rewrites.push(rewrite),
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %format!("{:#}", e), "skipping document");
                }
            }
        }
    }
    Ok(rewrites)
}
