//! Logging infrastructure for the check-in kiosk.
//!
//! Structured logging through the `log` facade with an `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Output goes to stderr unless a log file is given. The full-screen display
//! always logs to a file, since stderr shares the terminal with the screen.
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: timestamp, level, and (with `-v`) module path
//! - **Release builds**: timestamp, level and message
//!
//! # Example
//!
//! ```rust,no_run
//! use checkin_kiosk::logging::{init_logging, LogTarget};
//!
//! init_logging(1, false, LogTarget::Stderr).unwrap();
//! log::debug!("Debug info here");
//! ```

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error.
    Stderr,
    /// Append to this file, creating parent directories as needed.
    File(PathBuf),
}

impl LogTarget {
    fn open(&self) -> io::Result<Option<File>> {
        match self {
            Self::Stderr => Ok(None),
            Self::File(path) => open_log_file(path).map(Some),
        }
    }
}

/// Initialize the logging subsystem.
///
/// Must be called once, before any logging calls are made.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
/// * `target` - Destination of log records
///
/// # Errors
///
/// Returns an I/O error if the log file cannot be opened.
///
/// # Panics
///
/// Panics if a logger is already installed.
pub fn init_logging(verbose: u8, quiet: bool, target: LogTarget) -> io::Result<()> {
    let use_env = env::var("RUST_LOG").is_ok();
    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    // Silence dependency chatter below warn unless RUST_LOG asks for it.
    if !use_env {
        builder.filter_module("hyper_util", LevelFilter::Warn);
        builder.filter_module("reqwest", LevelFilter::Warn);
        builder.filter_module("rustls", LevelFilter::Warn);
    }

    configure_format(&mut builder, verbose);

    if let Some(file) = target.open()? {
        builder.target(Target::Pipe(Box::new(file)));
        builder.write_style(env_logger::WriteStyle::Never);
    }

    builder.init();

    if use_env {
        log::debug!(
            "Logging initialized from RUST_LOG environment variable: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        );
    }
    Ok(())
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Configure the log format based on build type and verbosity.
fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    // Kiosk logs are read after the fact, so release keeps the timestamp.
    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} {}",
                buf.timestamp_seconds(),
                level,
                record.args()
            )
        });
    }
}

/// Open `path` for appending, creating it and its parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Default log file used by the screen display.
#[must_use]
pub fn default_log_file() -> PathBuf {
    directories::ProjectDirs::from("com", "checkin-kiosk", "checkin-kiosk")
        .map(|dirs| dirs.data_local_dir().join("kiosk.log"))
        .unwrap_or_else(|| env::temp_dir().join("checkin-kiosk.log"))
}

/// Get the current log level as a string.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
