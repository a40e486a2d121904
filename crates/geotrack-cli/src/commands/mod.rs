//! Command implementations

mod alerts;
mod config;
mod history;
mod init;
mod resolve;
mod run;
mod status;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;
use geotrack_core::config::CliConfigOverrides;
use std::path::PathBuf;

/// Options shared by every command
pub struct Globals {
    pub config_path: PathBuf,
    pub database: Option<PathBuf>,
}

impl Globals {
    fn overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides { database: self.database.clone(), ..Default::default() }
    }
}

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let globals = Globals { config_path: cli.config, database: cli.database };

    match cli.command {
        Commands::Init(args) => init::execute(args, &globals, &output),
        Commands::Run(args) => run::execute(args, &globals, &output).await,
        Commands::Status => status::execute(&globals, &output).await,
        Commands::History(args) => history::execute(args, &globals, &output).await,
        Commands::Alerts(args) => alerts::execute(args, &globals, &output).await,
        Commands::Resolve(args) => resolve::execute(args, &globals, &output).await,
        Commands::Config => config::execute(&globals, &output),
    }
}
