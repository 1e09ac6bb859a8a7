//! Check-in Kiosk - scan-to-check-in front end
//!
//! Reads codes from a scanner, throttles and deduplicates them, submits new
//! ones to a verification service over HTTP, and keeps a live log of who
//! checked in during the session.
//!
//! The decision logic lives in [`checkin`]; everything else feeds it
//! ([`scan`]), reports from it ([`display`]), or sets it up.

pub mod app;
pub mod checkin;
pub mod cli;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod scan;
pub mod signal;

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::cli::{Cli, Commands, ConfigAction, OutputFormat, RunArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::logging::{default_log_file, init_logging, LogTarget};

/// Time given to blocked input readers after the event loop returns.
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unavailable scanner, or
/// a display that cannot be set up. [`ExitCode::for_error`] maps it to the
/// process exit code.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.no_color || !std::io::stdout().is_terminal() {
        yansi::disable();
    }

    match cli.command {
        Commands::Run(ref args) => run_kiosk(&cli, args),
        Commands::Config(ref args) => {
            init_logging(cli.verbose, cli.quiet, LogTarget::Stderr)?;
            show_config(args.action, cli.config.as_deref())
        }
    }
}

fn run_kiosk(cli: &Cli, args: &RunArgs) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_args(args)?;

    // The screen owns the terminal, so its logs always go to a file.
    let target = match (&args.log_file, config.output) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, OutputFormat::Screen) => LogTarget::File(default_log_file()),
        (None, _) => LogTarget::Stderr,
    };
    init_logging(cli.verbose, cli.quiet, target.clone())
        .with_context(|| format!("failed to open log destination {:?}", target))?;
    log::info!(
        "Starting check-in kiosk v{} ({} display, log level {})",
        env!("CARGO_PKG_VERSION"),
        config.output,
        logging::current_level_name()
    );
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = runtime.block_on(app::run(&config, args.input.as_deref(), shutdown));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);

    let summary = result?;
    Ok(summary.exit_code())
}

fn show_config(action: ConfigAction, path: Option<&Path>) -> anyhow::Result<ExitCode> {
    match action {
        ConfigAction::Show => {
            let config = Config::load(path)?;
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => match path.map(Path::to_path_buf).or_else(Config::default_path) {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("no configuration directory available on this platform"),
        },
    }
    Ok(ExitCode::Success)
}
