//! GeoTrack CLI - Command-line interface
//!
//! Runs the tracking loop in the foreground process and reports on the
//! stored history.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod output;
mod output_types;
mod storage;

use clap::Parser;
use cli::Cli;
use errors::CliError;

fn main() {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli)));

    if let Err(error) = result {
        match error.downcast::<CliError>() {
            Ok(cli_error) => cli_error.display(),
            Err(other) => errors::from_anyhow(other).display(),
        }
        std::process::exit(1);
    }
}
