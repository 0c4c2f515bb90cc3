//! Declared table of contents (`_quarto.yml`, `book.chapters`)

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The book's declared chapter list
#[derive(Debug, Clone)]
pub struct DeclaredToc {
    pub path: PathBuf,
    document: Value,
}

impl DeclaredToc {
    /// Load the table of contents; `None` when the file does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(Self::parse(path, &text)?))
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Self { path: path.to_path_buf(), document })
    }

    fn chapters(&self) -> Option<&Value> {
        self.document.get("book")?.get("chapters")
    }

    /// Every file entry, `part` groups flattened, in declaration order
    pub fn entries(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(chapters) = self.chapters() {
            collect_entries(chapters, &mut out);
        }
        out
    }

    /// Entries whose file does not exist below `root`
    pub fn missing_entries(&self, root: &Path) -> Vec<String> {
        self.entries().into_iter().filter(|e| !root.join(e).exists()).collect()
    }

    /// Folder names declared through `<folder>/index.qmd` entries that do not exist
    pub fn missing_chapter_indexes(&self, root: &Path, index_filename: &str) -> Vec<String> {
        self.missing_entries(root)
            .into_iter()
            .filter_map(|entry| {
                let folder = entry.strip_suffix(index_filename)?.strip_suffix('/')?;
                (!folder.is_empty()).then(|| folder.to_string())
            })
            .collect()
    }

    /// The document with `remove` dropped from the chapter list
    pub fn without(&self, remove: &[String]) -> Value {
        let mut document = self.document.clone();
        if let Some(chapters) = document.get_mut("book").and_then(|b| b.get_mut("chapters")) {
            prune_entries(chapters, remove);
        }
        document
    }

    /// Copy the file to `<name>.bak`, then rewrite it without `remove`.
    /// Returns the backup path.
    pub fn remove_entries_with_backup(&self, remove: &[String]) -> Result<PathBuf> {
        let backup = backup_path(&self.path);
        fs::copy(&self.path, &backup).with_context(|| {
            format!("Failed to back up {} to {}", self.path.display(), backup.display())
        })?;

        let yaml = serde_yaml::to_string(&self.without(remove))
            .context("Failed to serialize table of contents")?;
        fs::write(&self.path, yaml)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        info!(path = %self.path.display(), removed = remove.len(), "pruned table of contents");
        Ok(backup)
    }
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// File named by one chapter-list item: a plain string or a `file:` mapping
fn entry_file(item: &Value) -> Option<&str> {
    match item {
        Value::String(s) => Some(s.as_str()),
        Value::Mapping(map) => map.get("file").and_then(Value::as_str),
        _ => None,
    }
}

fn nested_chapters(item: &Value) -> Option<&Value> {
    item.as_mapping().and_then(|m: &Mapping| m.get("chapters"))
}

fn collect_entries(list: &Value, out: &mut Vec<String>) {
    let Some(items) = list.as_sequence() else {
        return;
    };
    for item in items {
        if let Some(file) = entry_file(item) {
            out.push(file.to_string());
        }
        if let Some(nested) = nested_chapters(item) {
            collect_entries(nested, out);
        }
    }
}

fn prune_entries(list: &mut Value, remove: &[String]) {
    let Some(items) = list.as_sequence_mut() else {
        return;
    };
    items.retain(|item| entry_file(item).map_or(true, |f| !remove.iter().any(|r| r == f)));
    for item in items.iter_mut() {
        if let Some(nested) = item.as_mapping_mut().and_then(|m| m.get_mut("chapters")) {
            prune_entries(nested, remove);
        }
    }
}
