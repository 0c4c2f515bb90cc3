// Test infrastructure for booksync integration tests
#![allow(dead_code)]

use booksync::config::{Config, IndexMode};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for a notebook JSON document
pub struct NotebookBuilder {
    title: Option<String>,
    cells: Vec<(String, String)>,
}

impl NotebookBuilder {
    pub fn new() -> Self {
        Self { title: None, cells: Vec::new() }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn markdown(mut self, source: impl Into<String>) -> Self {
        self.cells.push(("markdown".to_string(), source.into()));
        self
    }

    pub fn code(mut self, source: impl Into<String>) -> Self {
        self.cells.push(("code".to_string(), source.into()));
        self
    }

    pub fn build(self) -> String {
        let cells: Vec<serde_json::Value> = self
            .cells
            .into_iter()
            .map(|(kind, source)| {
                let lines: Vec<String> = source.split_inclusive('\n').map(String::from).collect();
                serde_json::json!({ "cell_type": kind, "metadata": {}, "source": lines })
            })
            .collect();

        let mut metadata = serde_json::json!({});
        if let Some(title) = self.title {
            metadata["title"] = serde_json::Value::String(title);
        }

        serde_json::to_string_pretty(&serde_json::json!({
            "cells": cells,
            "metadata": metadata,
            "nbformat": 4,
            "nbformat_minor": 5,
        }))
        .unwrap()
    }
}

impl Default for NotebookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A temporary book tree
pub struct TestBook {
    pub root: TempDir,
}

impl TestBook {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self { root: TempDir::new()? })
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    pub fn root_str(&self) -> &str {
        self.root.path().to_str().unwrap()
    }

    pub fn config(&self) -> Config {
        Config::for_root(self.root.path())
    }

    pub fn intro_config(&self) -> Config {
        let mut config = self.config();
        config.mode = IndexMode::Intro;
        config
    }

    /// Write a file below the root, creating parent folders
    pub fn write(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.root.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&file_path, content).unwrap();
        file_path
    }

    pub fn mkdir(&self, path: &str) -> PathBuf {
        let dir = self.root.path().join(path);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn read(&self, path: &str) -> String {
        fs::read_to_string(self.root.path().join(path)).unwrap()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.root.path().join(path).exists()
    }

    pub fn folder(&self, path: &str) -> PathBuf {
        self.root.path().join(path)
    }
}

/// Notebook used by the theory chapter fixtures
pub fn uncertainty_notebook() -> String {
    NotebookBuilder::new()
        .title("Uncertainty")
        .markdown("# Uncertainty\n\nShort intro.")
        .code("import numpy as np")
        .build()
}

/// A small two-chapter book in index mode
pub fn sample_book() -> TestBook {
    let book = TestBook::new().unwrap();
    book.write("theory/intro.md", "# Theory\n\nWhat measurement means.\n");
    book.write("theory/uncertainty.ipynb", &uncertainty_notebook());
    book.write("statistics/outliers.qmd", "# Outliers\n\nSpotting bad points.\n");
    book.write("statistics/_scratch.md", "# Scratch\n");
    book.write(
        "_quarto.yml",
        "project:\n  type: book\nbook:\n  chapters:\n    - index.qmd\n    - theory/index.qmd\n    - statistics/index.qmd\n",
    );
    book.write("index.qmd", "# Welcome\n");
    book
}
