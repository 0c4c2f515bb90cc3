//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "booksync")]
#[command(about = "Keep chapter indexes, links and the table of contents of a book in sync", long_about = None)]
#[command(after_help = "Nothing is written unless --apply, --fix or --fix-toc is given.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Book root directory (defaults to ./memm_book)
    #[arg(short, long, global = true)]
    pub root: Option<String>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// index.qmd with chapter summary, objectives and prerequisites
    Index,
    /// intro.md holding only the page list
    Intro,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate or refresh each chapter's page list
    #[command(visible_alias = "gen-index")]
    Index {
        /// Only this chapter folder
        #[arg(short, long)]
        chapter: Option<String>,

        /// Landing page kind (overrides the config file)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Regenerate whole landing pages instead of only the marked region
        #[arg(short, long)]
        force: bool,

        /// Write the changes
        #[arg(short, long)]
        apply: bool,

        /// Also write a _toc.yml in each chapter
        #[arg(long)]
        create_tocs: bool,
    },

    /// Retarget links to renamed or converted pages
    #[command(visible_alias = "fix-links")]
    Links {
        /// Only this chapter folder
        #[arg(short, long)]
        chapter: Option<String>,

        /// Write the changes
        #[arg(short, long)]
        apply: bool,
    },

    /// Report missing indexes, orphans, duplicate citation keys and broken links
    #[command(visible_alias = "check")]
    Audit {
        /// Only this chapter folder
        #[arg(short, long)]
        chapter: Option<String>,

        /// Generate missing chapter indexes
        #[arg(long)]
        fix: bool,

        /// Remove missing entries from the table of contents (keeps a .bak copy)
        #[arg(long)]
        fix_toc: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Convert {cite} roles to Pandoc citations
    Citations {
        /// Only this chapter folder
        #[arg(short, long)]
        chapter: Option<String>,

        /// Write the changes
        #[arg(short, long)]
        apply: bool,
    },
}
