//! blogd - a small blog engine.
//!
//! Templates and posts are compiled into an in-memory page cache, which an
//! HTTP server then answers from.

mod build;
mod cache;
mod cli;
mod config;
mod content;
mod logger;
mod serve;
mod utils;

use anyhow::{Context, Result};
use build::{BuildOptions, Rebuilder, build_site};
use cache::MemoryStore;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::{App, serve_site};
use std::{path::PathBuf, sync::Arc};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { preview, .. } => build_once(&config, preview.clone()),
        Commands::Serve { .. } => serve(&config),
    }
}

/// Compile everything into a throwaway store, optionally writing a preview.
fn build_once(config: &SiteConfig, preview: Option<PathBuf>) -> Result<()> {
    let preview = preview.map(|dir| config.root.join(dir));
    let options = BuildOptions::from_config(config).with_preview(preview.clone());
    let store = MemoryStore::new();

    let report = build_site(&options, &store).context("build failed")?;

    if report.skipped > 0 {
        log!("build"; "{} unreadable post files skipped", report.skipped);
    }
    log!("build"; "{} cache entries", store.len());
    if let Some(dir) = preview {
        log!("build"; "preview written to {}", dir.display());
    }
    Ok(())
}

/// Build at startup, then serve until Ctrl+C.
fn serve(config: &SiteConfig) -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let rebuilder = Arc::new(Rebuilder::new(BuildOptions::from_config(config), store.clone()));

    rebuilder.build().context("initial build failed")?;

    let app = Arc::new(App::new(config, store, rebuilder));
    serve_site(config, app)
}
