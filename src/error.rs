//! Structured error handling and exit codes.

use serde::Serialize;

use crate::config::ConfigError;
use crate::scan::ScanSourceError;

/// Exit codes for the check-in kiosk.
///
/// - 0: Success (input ended or the operator quit)
/// - 1: General error (unexpected failure)
/// - 2: Scanner unavailable (the scan input could not be opened)
/// - 3: Configuration error (unreadable file or invalid value)
/// - 130: Interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// The session ended normally.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The scan input could not be opened.
    ScannerUnavailable = 2,
    /// The configuration could not be loaded.
    ConfigError = 3,
    /// The session was interrupted by a signal.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "CK000",
            Self::GeneralError => "CK001",
            Self::ScannerUnavailable => "CK002",
            Self::ConfigError => "CK003",
            Self::Interrupted => "CK130",
        }
    }

    /// Pick the exit code for an error returned by the application.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<ConfigError>().is_some() {
            Self::ConfigError
        } else if err.downcast_ref::<ScanSourceError>().is_some() {
            Self::ScannerUnavailable
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CK001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the session was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
