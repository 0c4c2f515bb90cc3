//! Constants used throughout the booksync crate

/// Opening marker of the autogenerated region
pub const AUTOGEN_START: &str = "<!-- AUTOGEN_START -->";

/// Closing marker of the autogenerated region
pub const AUTOGEN_END: &str = "<!-- AUTOGEN_END -->";

/// Fence line delimiting front matter
pub const FRONT_MATTER_FENCE: &str = "---";

/// Directive that anchors insertion when an intro page has no markers yet
pub const TOC_DIRECTIVE: &str = "```{tableofcontents}";

/// Heading of the autogenerated page list
pub const PAGES_HEADING: &str = "## Pages in this chapter";

/// Build output and checkpoint directories that are never chapters or pages
pub const EXCLUDED_NAMES: &[&str] = &["_build", ".ipynb_checkpoints", "_site", ".quarto", "_book"];

/// Names starting with this character are private to the build
pub const RESERVED_PREFIX: char = '_';

/// Default book root
pub const DEFAULT_ROOT: &str = "memm_book";

/// Landing page written in index mode
pub const INDEX_FILENAME: &str = "index.qmd";

/// Landing page written in intro mode
pub const INTRO_FILENAME: &str = "intro.md";

/// Book configuration holding the declared table of contents
pub const TOC_FILENAME: &str = "_quarto.yml";

/// Per-chapter table of contents written by `index --create-tocs`
pub const LOCAL_TOC_FILENAME: &str = "_toc.yml";

/// Default bibliography, relative to the root
pub const BIBLIOGRAPHY_FILENAME: &str = "references.bib";

/// Directory holding the booksync configuration file, relative to the root
pub const CONFIG_DIR: &str = ".booksync";

/// Extension of the canonical authoring format
pub const CANONICAL_EXTENSION: &str = "qmd";

/// Extensions recognized as pages
pub const PAGE_EXTENSIONS: &[&str] = &["qmd", "md", "ipynb"];

/// Titles derived from a first line are cut to this many characters
pub const TITLE_MAX_CHARS: usize = 80;

/// Sanitized descriptions are cut to this many characters
pub const DESCRIPTION_MAX_CHARS: usize = 180;

/// Appended to truncated descriptions
pub const ELLIPSIS: &str = "…";
