// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `WatchLink` CLI - resolve streaming watch-page links from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Resolve one title
//! watchlink resolve --work-id 603 --title "The Matrix" --year 1999 --service Netflix
//!
//! # Resolve a JSON array of requests
//! watchlink batch --input requests.json --format json --pretty
//!
//! # List supported platforms
//! watchlink services
//!
//! # Inspect the link cache
//! watchlink cache show 603
//! watchlink cache stats
//!
//! # Delete old failure screenshots
//! watchlink prune
//! ```

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use watchlink_store::Settings;

use commands::{batch, cache, prune, resolve, services};

// ============================================================================
// CLI Definition
// ============================================================================

/// `WatchLink` CLI - streaming deep-link resolver.
#[derive(Parser)]
#[command(name = "watchlink")]
#[command(about = "Resolve streaming service watch-page links for movie titles")]
#[command(long_about = r#"
WatchLink drives a headless browser through each platform's search page
to find the watch-page link for a title, caching results on disk.

Supported services:
  • Netflix
  • Disney+ (Disney Plus, Disney)
  • Prime Video (Amazon Prime Video, Amazon Prime, Prime)
  • Max (HBO Max, HBO)
  • Hulu
  • Apple TV+ (Apple TV Plus, Apple TV)
  • Paramount+ (Paramount Plus, Paramount)
  • Peacock (Peacock Premium)

Examples:
  watchlink resolve --work-id 603 --title "The Matrix" --service netflix
  watchlink batch --input requests.json
  watchlink cache stats
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (YAML or JSON). Defaults to the user config directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, no error text).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve one title on one service.
    #[command(visible_alias = "r")]
    Resolve(resolve::ResolveArgs),

    /// Resolve a JSON array of requests, one after another.
    #[command(visible_alias = "b")]
    Batch(batch::BatchArgs),

    /// List supported services.
    #[command(visible_alias = "s")]
    Services,

    /// Inspect the link cache.
    Cache(cache::CacheArgs),

    /// Delete diagnostics older than the retention window.
    Prune,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No link could be resolved.
    NoLink = 2,
}

impl Cli {
    /// Loads settings from `--config` or the default location.
    pub async fn settings(&self) -> Result<Settings> {
        let settings = match &self.config {
            Some(path) => Settings::load(path)
                .await
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::load_default()
                .await
                .context("Failed to load default settings")?,
        };
        Ok(settings)
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let default_filter = if verbose {
        "watchlink=debug,info"
    } else {
        "watchlink=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Resolve(args) => resolve::run(args, &cli).await,
        Commands::Batch(args) => batch::run(args, &cli).await,
        Commands::Services => services::run(&cli),
        Commands::Cache(args) => cache::run(args, &cli).await,
        Commands::Prune => prune::run(&cli).await,
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => std::process::exit(code as i32),
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(ExitCode::Error as i32);
        }
    }
}
