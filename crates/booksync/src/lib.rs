//! Maintenance of a notebook and Quarto book tree
//!
//! Keeps per-chapter landing pages listing their pages, retargets links to
//! renamed or converted pages, and audits the tree against its declared
//! table of contents. Generated content lives between marker comments; all
//! hand-written text around it is preserved.

pub mod audit;
pub mod bib;
pub mod citations;
pub mod config;
pub mod constants;
pub mod document;
pub mod errors;
pub mod extract;
pub mod index;
pub mod links;
pub mod region;
pub mod theme;
pub mod toc;
pub mod walker;

pub use audit::{audit, AuditReport, BrokenLink};
pub use config::{Config, IndexMode};
pub use document::{DocBody, DocError, DocKind, Document, Notebook};
pub use extract::{extract, extract_path, sanitize_description, PageMeta};
pub use index::{build_block, plan_all, plan_chapter_index, IndexUpdate};
pub use links::{plan_links, retarget, retarget_text, LinkChange, LinkRewrite};
pub use region::{synchronize, SyncAction, SyncResult};
pub use toc::DeclaredToc;
pub use walker::{chapters, collect, PageEntry, TreeError};

/// Re-export common error types
pub use anyhow::{Error, Result};
