use crate::constants::{
    BIBLIOGRAPHY_FILENAME, CANONICAL_EXTENSION, CONFIG_DIR, DEFAULT_ROOT, DESCRIPTION_MAX_CHARS,
    INDEX_FILENAME, INTRO_FILENAME, TOC_FILENAME,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Which landing page each chapter keeps its page list in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// `index.qmd` with a generated chapter body
    #[default]
    Index,
    /// `intro.md` holding only the page list
    Intro,
}

impl IndexMode {
    pub fn filename(&self) -> &'static str {
        match self {
            IndexMode::Index => INDEX_FILENAME,
            IndexMode::Intro => INTRO_FILENAME,
        }
    }
}

/// Per-chapter defaults used when a new index page is written
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterDefaults {
    pub summary: Option<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
}

/// Application configuration with layered defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Book root directory; its top-level folders are the chapters
    pub root: PathBuf,

    /// Landing page kind
    pub mode: IndexMode,

    /// Extension of the format every page converges to
    pub canonical_extension: String,

    /// Declared table of contents, relative to the root
    pub toc_file: PathBuf,

    /// Bibliography checked for duplicate keys, relative to the root
    pub bibliography: PathBuf,

    /// Maximum characters of a page description in the index
    pub description_max_len: usize,

    /// Extra glob patterns excluded from page collection
    pub exclude: Vec<String>,

    /// Prerequisites listed on new index pages
    pub prerequisites: Vec<String>,

    /// Chapter summaries and objectives keyed by folder name
    pub chapters: BTreeMap<String, ChapterDefaults>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            mode: IndexMode::Index,
            canonical_extension: CANONICAL_EXTENSION.to_string(),
            toc_file: PathBuf::from(TOC_FILENAME),
            bibliography: PathBuf::from(BIBLIOGRAPHY_FILENAME),
            description_max_len: DESCRIPTION_MAX_CHARS,
            exclude: Vec::new(),
            prerequisites: vec![
                "Basic calculus and introductory statistics.".to_string(),
                "Comfort with Python and Jupyter notebooks (NumPy/Matplotlib helpful).".to_string(),
            ],
            chapters: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load(root: Option<&str>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(dir) = root {
            config.root = PathBuf::from(dir);
        }

        // <root>/.booksync/config.toml takes precedence over the defaults
        if let Some(file_config) = Self::load_from_file(&config.root)? {
            config.merge(file_config);
        }

        Ok(config)
    }

    /// Configuration rooted at `root` with defaults only, ignoring any config file
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), ..Default::default() }
    }

    fn load_from_file(root: &Path) -> Result<Option<PartialConfig>> {
        let config_path = root.join(CONFIG_DIR).join("config.toml");
        if !config_path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: PartialConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Merge partial config into this one (partial takes precedence for specified fields)
    fn merge(&mut self, other: PartialConfig) {
        if let Some(val) = other.mode {
            self.mode = val;
        }
        if let Some(val) = other.canonical_extension {
            self.canonical_extension = val.trim_start_matches('.').to_string();
        }
        if let Some(val) = other.toc_file {
            self.toc_file = val;
        }
        if let Some(val) = other.bibliography {
            self.bibliography = val;
        }
        if let Some(val) = other.description_max_len {
            self.description_max_len = val;
        }
        if let Some(val) = other.exclude {
            self.exclude = val;
        }
        if let Some(val) = other.prerequisites {
            self.prerequisites = val;
        }
        if let Some(val) = other.chapters {
            self.chapters.extend(val);
        }
    }

    /// Landing page filename for the configured mode
    pub fn index_filename(&self) -> &'static str {
        self.mode.filename()
    }

    pub fn toc_path(&self) -> PathBuf {
        self.root.join(&self.toc_file)
    }

    pub fn bibliography_path(&self) -> PathBuf {
        self.root.join(&self.bibliography)
    }

    pub fn chapter_defaults(&self, chapter: &str) -> Option<&ChapterDefaults> {
        self.chapters.get(chapter)
    }
}

/// Partial configuration for deserializing from TOML with optional fields
#[derive(Debug, Deserialize)]
struct PartialConfig {
    mode: Option<IndexMode>,
    canonical_extension: Option<String>,
    toc_file: Option<PathBuf>,
    bibliography: Option<PathBuf>,
    description_max_len: Option<usize>,
    exclude: Option<Vec<String>>,
    prerequisites: Option<Vec<String>>,
    chapters: Option<BTreeMap<String, ChapterDefaults>>,
}
