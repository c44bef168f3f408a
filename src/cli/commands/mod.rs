//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod init;
mod list;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "facescrape")]
#[command(about = "Scrape free and coupon watchfaces from the facesapps catalog")]
#[command(version)]
pub struct Cli {
    /// Target directory or database file (overrides config file).
    /// Can be a directory containing facescrape.db or a .db file directly.
    #[arg(long, short = 't', global = true, env = "FACESCRAPE_TARGET")]
    target: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "FACESCRAPE_CONFIG")]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// List the catalog, extract obtainable watchfaces and store them
    Scrape {
        /// Concurrent storefront extractions (default: from config, 5)
        #[arg(short, long, env = "FACESCRAPE_WORKERS")]
        workers: Option<usize>,
        /// Number of listing pages to walk
        #[arg(short, long)]
        pages: Option<u32>,
        /// Items requested per listing page
        #[arg(long)]
        page_size: Option<u32>,
        /// Extract and print records without writing them
        #[arg(long)]
        dry_run: bool,
        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },

    /// Show stored watchfaces, newest first
    List {
        /// Maximum rows to show (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        target: cli.target,
    };
    let (mut settings, _config) = load_settings(&options)?;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Scrape {
            workers,
            pages,
            page_size,
            dry_run,
            headed,
        } => {
            if let Some(workers) = workers {
                settings.workers = workers;
            }
            if let Some(pages) = pages {
                settings.max_pages = pages;
            }
            if let Some(page_size) = page_size {
                settings.page_size = page_size;
            }
            if headed {
                settings.browser.headless = false;
            }
            scrape::cmd_scrape(&settings, dry_run).await
        }
        Commands::List { limit, json } => list::cmd_list(&settings, limit, json).await,
    }
}
