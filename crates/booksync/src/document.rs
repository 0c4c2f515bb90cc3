//! Document types and parsing
//!
//! A page is one of three kinds: a Jupyter notebook (cells), a plain markdown
//! file, or a Quarto file (markdown with front matter and executable chunks).
//! Only as much structure as title and description extraction needs is parsed.

use crate::constants::FRONT_MATTER_FENCE;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid notebook {path}: {message}")]
    InvalidNotebook { path: PathBuf, message: String },

    #[error("Unsupported document type: {0}")]
    Unsupported(PathBuf),
}

/// The three document shapes found in a book tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    Notebook,
    Markdown,
    Quarto,
}

impl DocKind {
    /// Classify a path by its extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        match path.as_ref().extension()?.to_str()? {
            "ipynb" => Some(DocKind::Notebook),
            "md" => Some(DocKind::Markdown),
            "qmd" => Some(DocKind::Quarto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Markdown,
    Code,
    Raw,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub kind: CellKind,
    pub source: String,
}

/// A notebook reduced to what extraction needs
#[derive(Debug, Clone, Default)]
pub struct Notebook {
    /// `metadata.title`, when the notebook carries one
    pub title: Option<String>,
    pub cells: Vec<Cell>,
}

impl Notebook {
    /// Parse nbformat 4 JSON
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawNotebook = serde_json::from_str(json)?;

        let title = raw.metadata.title.and_then(|value| match value {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });

        let cells = raw
            .cells
            .into_iter()
            .map(|cell| Cell {
                kind: match cell.cell_type.as_str() {
                    "markdown" => CellKind::Markdown,
                    "code" => CellKind::Code,
                    _ => CellKind::Raw,
                },
                source: cell.source.into_string(),
            })
            .collect();

        Ok(Notebook { title, cells })
    }

    /// Markdown cells in notebook order
    pub fn markdown_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.kind == CellKind::Markdown)
    }
}

#[derive(Deserialize)]
struct RawNotebook {
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    cells: Vec<RawCell>,
}

#[derive(Deserialize, Default)]
struct RawMetadata {
    title: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default)]
    source: CellSource,
}

/// nbformat allows the source as one string or as a list of lines
#[derive(Deserialize)]
#[serde(untagged)]
enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Text(String::new())
    }
}

impl CellSource {
    fn into_string(self) -> String {
        match self {
            CellSource::Text(s) => s,
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DocBody {
    Notebook(Notebook),
    Text(String),
}

/// A loaded page
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub kind: DocKind,
    pub body: DocBody,
}

impl Document {
    /// Read and parse a document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocError> {
        let path = path.as_ref();
        if DocKind::from_path(path).is_none() {
            return Err(DocError::Unsupported(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)
            .map_err(|source| DocError::Read { path: path.to_path_buf(), source })?;
        Self::parse(path.to_path_buf(), &content)
    }

    /// Parse already-read content, classifying by the path's extension
    pub fn parse(path: PathBuf, content: &str) -> Result<Self, DocError> {
        let kind = DocKind::from_path(&path).ok_or_else(|| DocError::Unsupported(path.clone()))?;

        let body = match kind {
            DocKind::Notebook => {
                let notebook = Notebook::parse(content).map_err(|e| DocError::InvalidNotebook {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                DocBody::Notebook(notebook)
            }
            DocKind::Markdown | DocKind::Quarto => DocBody::Text(content.to_string()),
        };

        Ok(Document { path, kind, body })
    }

    /// File stem, the last-resort title
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }
}

/// File stem of a path as an owned string
pub fn file_stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Split text into its front matter (fences and trailing newline included) and the rest.
///
/// Front matter must open on the very first line. Without a closing fence the
/// whole text is treated as body.
pub fn split_front_matter(text: &str) -> (&str, &str) {
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return ("", text);
    };
    if !is_fence(first) {
        return ("", text);
    }

    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if is_fence(line) {
            return text.split_at(offset);
        }
    }

    ("", text)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FRONT_MATTER_FENCE
}

/// Strip front matter, returning only the body
pub fn strip_front_matter(text: &str) -> &str {
    split_front_matter(text).1
}

/// Derive a display title from a folder name: `signal_processing` -> `Signal Processing`
pub fn title_from_folder(name: &str) -> String {
    name.replace(['_', '+'], " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the default front matter for a page titled `title`
pub fn default_front_matter(title: &str) -> String {
    format!(
        "{fence}\ntitle: \"{}\"\n{fence}\n\n",
        title.replace('\\', "\\\\").replace('"', "\\\""),
        fence = FRONT_MATTER_FENCE
    )
}
