//! Book maintenance CLI

use anyhow::Result;
use booksync::config::{Config, IndexMode};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, ModeArg};
use commands::*;

fn init_tracing(verbose: bool) {
    let default = if verbose { "booksync=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match Config::load(cli.root.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            booksync::errors::print_error_with_suggestion(
                "Failed to load configuration",
                &e,
                "Check .booksync/config.toml under the book root",
            );
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Index { chapter, mode, force, apply, create_tocs } => {
            if let Some(mode) = mode {
                config.mode = match mode {
                    ModeArg::Index => IndexMode::Index,
                    ModeArg::Intro => IndexMode::Intro,
                };
            }
            update_indexes(&config, chapter.as_deref(), force, apply, create_tocs)
        }
        Commands::Links { chapter, apply } => fix_links(&config, chapter.as_deref(), apply),
        Commands::Audit { chapter, fix, fix_toc, format } => {
            audit_book(&config, chapter.as_deref(), fix, fix_toc, format)
        }
        Commands::Citations { chapter, apply } => {
            convert_citations(&config, chapter.as_deref(), apply)
        }
    };

    if let Err(e) = result {
        if e.downcast_ref::<booksync::TreeError>().is_some() {
            booksync::errors::print_error_with_suggestion(
                "Command failed",
                &e,
                &format!("Make sure '{}' exists and contains chapter folders", config.root.display()),
            );
        } else {
            booksync::errors::print_error("Command failed", &e);
        }
        std::process::exit(1);
    }

    Ok(())
}
