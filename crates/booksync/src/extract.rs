//! Title and description extraction from pages
//!
//! Each document kind has an ordered list of title strategies; the first one
//! that yields a title wins and the file stem is the final fallback. The
//! description is the first paragraph following the title line.

use crate::constants::{ELLIPSIS, TITLE_MAX_CHARS};
use crate::document::{file_stem, strip_front_matter, DocBody, Document, Notebook};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(\S[^\r\n]*)\r?$").expect("heading pattern"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").expect("paragraph pattern"));
static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("fenced code pattern"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]*)`").expect("inline code pattern"));
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]\(.*?\)").expect("link pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Title and raw description of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    /// No strategy found a title; `title` is the file stem
    pub stem_fallback: bool,
}

impl PageMeta {
    fn from_stem(stem: &str) -> Self {
        PageMeta { title: stem.to_string(), description: String::new(), stem_fallback: true }
    }
}

/// A title together with the byte offset just past the line it came from
#[derive(Debug)]
struct TitleMatch {
    title: String,
    after: Option<usize>,
}

type TextStrategy = fn(&str) -> Option<TitleMatch>;
type NotebookStrategy = fn(&Notebook, &str) -> Option<TitleMatch>;

const TEXT_TITLE_STRATEGIES: &[TextStrategy] = &[heading_title, first_line_title];

const NOTEBOOK_TITLE_STRATEGIES: &[NotebookStrategy] =
    &[notebook_metadata_title, notebook_heading_title, notebook_first_line_title];

/// Extract title and description from a loaded document
pub fn extract(doc: &Document) -> PageMeta {
    match &doc.body {
        DocBody::Text(text) => extract_text(text, &doc.stem()),
        DocBody::Notebook(notebook) => extract_notebook(notebook, &doc.stem()),
    }
}

/// Load and extract; unreadable or malformed documents fall back to the file stem
pub fn extract_path(path: impl AsRef<Path>) -> PageMeta {
    let path = path.as_ref();
    match Document::load(path) {
        Ok(doc) => extract(&doc),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "extraction fell back to file stem");
            PageMeta::from_stem(&file_stem(path))
        }
    }
}

/// Heading-structured text: front matter is ignored
pub fn extract_text(text: &str, stem: &str) -> PageMeta {
    let body = strip_front_matter(text);

    match TEXT_TITLE_STRATEGIES.iter().find_map(|strategy| strategy(body)) {
        Some(found) => PageMeta {
            title: found.title,
            description: found.after.map(|at| first_paragraph(&body[at..])).unwrap_or_default(),
            stem_fallback: false,
        },
        None => PageMeta::from_stem(stem),
    }
}

pub fn extract_notebook(notebook: &Notebook, stem: &str) -> PageMeta {
    let markup = notebook
        .markdown_cells()
        .map(|cell| cell.source.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n");

    let Some(found) = NOTEBOOK_TITLE_STRATEGIES.iter().find_map(|s| s(notebook, &markup)) else {
        return PageMeta::from_stem(stem);
    };

    let description = match found.after {
        Some(at) => first_paragraph(&markup[at..]),
        // Title from metadata: describe with the text under the first heading, if any
        None => match heading_title(&markup).and_then(|h| h.after) {
            Some(at) => first_paragraph(&markup[at..]),
            None => first_paragraph(&markup),
        },
    };

    PageMeta { title: found.title, description, stem_fallback: false }
}

fn heading_title(text: &str) -> Option<TitleMatch> {
    let caps = HEADING.captures(text)?;
    let whole = caps.get(0)?;
    let title = caps.get(1)?.as_str().trim();
    Some(TitleMatch { title: title.to_string(), after: Some(whole.end()) })
}

fn first_line_title(text: &str) -> Option<TitleMatch> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let end = offset + line.len();
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Some(TitleMatch { title: truncate_chars(trimmed), after: Some(end) });
        }
        offset = end;
    }
    None
}

fn notebook_metadata_title(notebook: &Notebook, _markup: &str) -> Option<TitleMatch> {
    let title = notebook.title.as_deref()?.trim();
    if title.is_empty() {
        return None;
    }
    Some(TitleMatch { title: title.to_string(), after: None })
}

fn notebook_heading_title(_notebook: &Notebook, markup: &str) -> Option<TitleMatch> {
    heading_title(markup)
}

/// Only the first markdown cell is consulted; it sits at the start of `markup`
fn notebook_first_line_title(notebook: &Notebook, markup: &str) -> Option<TitleMatch> {
    let first = notebook.markdown_cells().next()?;
    let len = first.source.trim_end().len().min(markup.len());
    first_line_title(&markup[..len])
}

fn truncate_chars(s: &str) -> String {
    s.chars().take(TITLE_MAX_CHARS).collect()
}

/// First blank-line separated paragraph of `text`, trimmed
fn first_paragraph(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    PARAGRAPH_BREAK.split(text).next().unwrap_or_default().trim().to_string()
}

/// Clean a description for a single-line index entry.
///
/// Fenced code is dropped, inline code unwrapped, links and stray brackets
/// removed, whitespace collapsed, and the result cut to `max_chars` characters
/// (the last one being an ellipsis when cut).
pub fn sanitize_description(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = FENCED_CODE.replace_all(text, " ");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = MARKDOWN_LINK.replace_all(&text, " ");
    let text = text.replace(['[', ']'], "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}
