//! Services command - list supported platforms.

use anyhow::Result;
use watchlink_providers::PlatformRegistry;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Runs the services command.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let descriptors = PlatformRegistry::descriptors();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_services_header());
            println!("{}", formatter.rule());
            for desc in descriptors {
                println!("{}", formatter.format_service_line(desc, cli.verbose));
            }

            println!();
            println!("Total: {} services", descriptors.len());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_services(descriptors)?);
        }
    }

    Ok(ExitCode::Success)
}
