//! Batch command - resolve a file of requests in order.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};
use watchlink_core::{LinkResolution, ResolutionRequest};
use watchlink_resolver::LinkResolver;

use crate::commands::resolve::{finish, print_resolution};
use crate::output::{JsonFormatter, ResolutionOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// JSON file holding an array of `{work_id, title, year?, service_name}`.
    #[arg(long, short)]
    pub input: PathBuf,
}

/// Reads a JSON array of requests.
pub async fn read_requests(path: &std::path::Path) -> Result<Vec<ResolutionRequest>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let requests: Vec<ResolutionRequest> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid request list in {}", path.display()))?;
    for (index, request) in requests.iter().enumerate() {
        request
            .validate()
            .with_context(|| format!("Request {index} in {}", path.display()))?;
    }
    Ok(requests)
}

/// Runs the batch command.
///
/// Exits with [`ExitCode::NoLink`] if any request ended without a link.
pub async fn run(args: &BatchArgs, cli: &Cli) -> Result<ExitCode> {
    let requests = read_requests(&args.input).await?;
    if requests.is_empty() {
        warn!(input = %args.input.display(), "No requests to resolve");
    }

    let settings = cli.settings().await?;
    let mut resolver = LinkResolver::new(&settings).await;
    let results = resolver.resolve_batch(&requests).await;

    let printed = print_batch(&requests, &results, cli);
    finish(printed, resolver.close()).await?;

    let unresolved = results.iter().filter(|r| !r.is_found()).count();
    info!(unresolved, total = results.len(), "Batch finished");

    Ok(if unresolved == 0 {
        ExitCode::Success
    } else {
        ExitCode::NoLink
    })
}

fn print_batch(requests: &[ResolutionRequest], results: &[LinkResolution], cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            for (request, resolution) in requests.iter().zip(results) {
                print_resolution(&request.work_id, resolution, cli)?;
            }
            if !cli.quiet {
                println!();
                println!(
                    "{}",
                    TextFormatter::new(!cli.no_color).format_batch_summary(results)
                );
            }
        }
        OutputFormat::Json => {
            let outputs: Vec<ResolutionOutput<'_>> = requests
                .iter()
                .zip(results)
                .map(|(request, resolution)| ResolutionOutput {
                    work_id: &request.work_id,
                    resolution,
                })
                .collect();
            println!("{}", JsonFormatter::new(cli.pretty).format(&outputs)?);
        }
    }
    Ok(())
}
