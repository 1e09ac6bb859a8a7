//! Command-line interface definitions for the check-in kiosk.
//!
//! Global options (verbosity, colour, config file) apply to every
//! subcommand. Options given on the command line override the config file
//! and the environment.
//!
//! # Example
//!
//! ```bash
//! # Full-screen kiosk talking to a local service
//! checkin-kiosk run --endpoint http://localhost:8000/checkin
//!
//! # Line output, codes piped in from a scanner daemon
//! scanner-daemon | checkin-kiosk run --output plain
//!
//! # Replay a file of codes and emit JSON events
//! checkin-kiosk run --input scans.txt --output json
//!
//! # Show the effective configuration
//! checkin-kiosk config show
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scan-to-check-in kiosk front end.
///
/// Reads codes from a scanner, throttles and deduplicates them, submits new
/// ones to the verification service, and shows a live check-in log.
#[derive(Debug, Parser)]
#[command(name = "checkin-kiosk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the kiosk
    Run(RunArgs),
    /// Inspect configuration
    Config(ConfigArgs),
}

/// Arguments for the run subcommand.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// URL of the verification service check-in endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Minimum time between two accepted scans, in milliseconds
    #[arg(long, value_name = "MS")]
    pub cooldown: Option<u64>,

    /// How long a status notice stays visible, in milliseconds
    #[arg(long, value_name = "MS")]
    pub status_clear: Option<u64>,

    /// Give up on a check-in request after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Display to use
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Read codes from this file (one per line) instead of the terminal
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Color theme of the screen display
    #[arg(long, value_enum)]
    pub theme: Option<ThemeArg>,

    /// chrono format string for check-in times (e.g. "%H:%M:%S")
    #[arg(long, value_name = "FORMAT")]
    pub time_format: Option<String>,

    /// Write logs to this file
    ///
    /// The screen display always logs to a file so log lines do not draw
    /// over the kiosk screen.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Arguments for the config subcommand.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration inspection actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the default configuration file path
    Path,
}

/// Display used by the run subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full-screen kiosk view
    #[default]
    Screen,
    /// One colored line per event
    Plain,
    /// One JSON object per event
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Screen => write!(f, "screen"),
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Color theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeArg {
    /// Detect from the terminal
    #[default]
    Auto,
    /// Light text on a dark background
    Dark,
    /// Dark text on a light background
    Light,
}
