//! Prune command - delete diagnostics past their retention window.

use anyhow::Result;

use crate::output::{JsonFormatter, PruneOutput, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the prune command.
///
/// Prunes even when capture is disabled, so old files can still be cleared.
pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let settings = cli.settings().await?;
    let diagnostics = settings.diagnostics();
    let report = diagnostics.prune().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_prune(diagnostics.dir(), diagnostics.is_enabled(), &report)
            );
        }
        OutputFormat::Json => {
            let output = PruneOutput::new(diagnostics.dir(), diagnostics.is_enabled(), report);
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(if report.failed == 0 {
        ExitCode::Success
    } else {
        ExitCode::Error
    })
}
