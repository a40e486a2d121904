use clap::{Parser, Subcommand, ValueEnum};
use geotrack_core::config::{SourceKind, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

/// GeoTrack - GPS tracking with geofence alerts
#[derive(Parser, Debug)]
#[command(name = "geotrack")]
#[command(about = "Single-subject GPS tracking with geofence alerts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Location database, overriding the configuration
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init(InitArgs),

    /// Start tracking until interrupted
    Run(RunArgs),

    /// Show the latest fix and store statistics
    Status,

    /// List recorded fixes
    History(HistoryArgs),

    /// List alerts
    Alerts(AlertsArgs),

    /// Mark an alert resolved
    Resolve(ResolveArgs),

    /// Show resolved configuration values and where they came from
    Config,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Subject identifier
    #[arg(long)]
    pub subject: Option<String>,

    /// Seconds between polls
    #[arg(long)]
    pub interval: Option<u64>,

    /// Positioning source
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration: Option<u64>,
}

/// Positioning source selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    /// Serial device node
    Device,
    /// Raw NMEA over TCP
    Tcp,
    /// Built-in simulator
    Simulator,
    /// Recorded NMEA log
    Replay,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Device => SourceKind::Device,
            SourceArg::Tcp => SourceKind::Tcp,
            SourceArg::Simulator => SourceKind::Simulator,
            SourceArg::Replay => SourceKind::Replay,
        }
    }
}

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// How far back to look
    #[arg(long, default_value = "24")]
    pub hours: u32,
}

#[derive(Parser, Debug)]
pub struct AlertsArgs {
    /// Only unresolved alerts
    #[arg(long)]
    pub open: bool,

    /// Maximum number of alerts to list
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Alert identifier
    pub id: i64,
}
