//! Cache command - inspect the link cache file.

use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use watchlink_store::{CacheDocument, LinkCache};

use crate::output::{CacheEntryOutput, JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands.
#[derive(Subcommand)]
pub enum CacheAction {
    /// Show entries, or one entry, with their expiry state.
    Show {
        /// Work id to show.
        work_id: Option<String>,
    },

    /// Show entry counts.
    Stats,
}

/// Runs the cache command.
pub async fn run(args: &CacheArgs, cli: &Cli) -> Result<ExitCode> {
    let settings = cli.settings().await?;
    let cache = LinkCache::load(&settings.cache_path, settings.cache_ttl_days).await;

    match &args.action {
        CacheAction::Show { work_id } => show(&cache, work_id.as_deref(), cli),
        CacheAction::Stats => stats(&cache, cli).await,
    }
}

fn show(cache: &LinkCache, work_id: Option<&str>, cli: &Cli) -> Result<ExitCode> {
    let now = Utc::now();
    let selected: Vec<CacheEntryOutput<'_>> = match work_id {
        Some(id) => cache
            .get(id)
            .map(|entry| CacheEntryOutput {
                work_id: id,
                expired: cache.is_expired(entry, now),
                entry,
            })
            .into_iter()
            .collect(),
        None => cache
            .iter()
            .map(|(id, entry)| CacheEntryOutput {
                work_id: id,
                expired: cache.is_expired(entry, now),
                entry,
            })
            .collect(),
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if selected.is_empty() {
                match work_id {
                    Some(id) => println!("No cache entry for work {id}"),
                    None => println!("Cache is empty ({})", cache.path().display()),
                }
            }
            for item in &selected {
                println!(
                    "{}",
                    formatter.format_cache_entry(item.work_id, item.entry, item.expired)
                );
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            match work_id {
                Some(_) => println!("{}", formatter.format(&selected.first())?),
                None => println!("{}", formatter.format(&selected)?),
            }
        }
    }

    Ok(if work_id.is_some() && selected.is_empty() {
        ExitCode::NoLink
    } else {
        ExitCode::Success
    })
}

async fn stats(cache: &LinkCache, cli: &Cli) -> Result<ExitCode> {
    let stats = cache.stats(Utc::now());
    let last_updated = CacheDocument::read(cache.path()).await.last_updated;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_stats(cache.path(), last_updated, &stats));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!(
                "{}",
                formatter.format_stats(cache.path(), last_updated, &stats)?
            );
        }
    }

    Ok(ExitCode::Success)
}
