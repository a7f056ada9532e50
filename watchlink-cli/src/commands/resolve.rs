//! Resolve command - look up one title on one service.

use anyhow::{Context, Result};
use clap::Args;
use std::future::Future;
use tracing::info;
use watchlink_core::{LinkResolution, ResolutionRequest};
use watchlink_resolver::LinkResolver;
use watchlink_store::StoreError;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the resolve command.
#[derive(Args)]
pub struct ResolveArgs {
    /// Upstream work id; also the cache key.
    #[arg(long)]
    pub work_id: String,

    /// Title to search for.
    #[arg(long, short)]
    pub title: String,

    /// Release year.
    #[arg(long, short)]
    pub year: Option<String>,

    /// Streaming service, by name or alias (e.g. "Netflix", "HBO Max").
    #[arg(long, short)]
    pub service: String,
}

/// Runs the resolve command.
pub async fn run(args: &ResolveArgs, cli: &Cli) -> Result<ExitCode> {
    let request = ResolutionRequest::new(
        args.work_id.as_str(),
        args.title.as_str(),
        args.year.clone(),
        args.service.as_str(),
    );
    request.validate()?;

    let settings = cli.settings().await?;
    let mut resolver = LinkResolver::new(&settings).await;

    info!(work_id = %request.work_id, service = %request.service_name, "Resolving");
    let resolution = resolver.resolve_request(&request).await;

    let printed = print_resolution(&request.work_id, &resolution, cli);
    finish(printed, resolver.close()).await?;

    Ok(if resolution.is_found() {
        ExitCode::Success
    } else {
        ExitCode::NoLink
    })
}

/// Awaits `close` whatever `printed` was, then reports the print error
/// first and the close error second.
pub(crate) async fn finish(
    printed: Result<()>,
    close: impl Future<Output = Result<(), StoreError>>,
) -> Result<()> {
    let closed = close.await.context("Failed to save link cache");
    printed?;
    closed
}

/// Prints one resolution in the selected format.
pub(crate) fn print_resolution(work_id: &str, resolution: &LinkResolution, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_resolution(work_id, resolution));
            if cli.verbose {
                if let Some(details) = formatter.format_resolution_details(resolution) {
                    println!("{details}");
                }
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_resolution(work_id, resolution)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_finish_closes_after_print_failure() {
        let closed = AtomicBool::new(false);

        let result = finish(Err(anyhow::anyhow!("stdout closed")), async {
            closed.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(result.unwrap_err().to_string(), "stdout closed");
    }

    #[tokio::test]
    async fn test_finish_reports_close_failure() {
        let result = finish(Ok(()), async {
            Err(StoreError::Config("read-only".to_string()))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Failed to save link cache");
        assert!(format!("{err:#}").contains("read-only"));
    }
}
