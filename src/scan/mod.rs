//! Scan sources.
//!
//! A scan source turns whatever produces codes (a camera decoder, a
//! keyboard-wedge scanner, a replay file) into a stream of [`ScanEvent`]s on
//! a channel. Sources run on their own task and never wait for submissions.
//!
//! * [`lines`]: one code per line from stdin or a file.
//! * [`keys`]: key presses from the raw-mode terminal, assembled on Enter.

pub mod keys;
pub mod lines;

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

pub use keys::{KeyAction, KeyAssembler, KeySource};
pub use lines::LineSource;

/// Capacity of the channel between a scan source and the event loop.
pub const SCAN_CHANNEL_CAPACITY: usize = 64;

/// One callback from the scan source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A code was decoded; carries its text.
    Decoded(String),
    /// Decoding failed; carries a description.
    Failed(String),
}

impl ScanEvent {
    /// Classify one raw read.
    ///
    /// Surrounding whitespace (including the CR/LF a scanner appends) is
    /// stripped. An empty read is a failure, not an identifier.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Self::Failed("empty read".to_string())
        } else {
            Self::Decoded(trimmed.to_string())
        }
    }
}

/// Error type for scan sources.
#[derive(Debug, Error)]
pub enum ScanSourceError {
    /// The input could not be opened.
    #[error("could not open scan input {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading from the input failed.
    #[error("scan input I/O error: {0}")]
    Io(#[from] io::Error),

    /// The blocking reader task panicked or was cancelled.
    #[error("scan reader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Producer of scan events.
#[async_trait]
pub trait ScanSource: Send {
    /// Feed events into `events` until the input ends, the receiver is
    /// dropped, or shutdown is requested.
    async fn run(self: Box<Self>, events: mpsc::Sender<ScanEvent>) -> Result<(), ScanSourceError>;

    /// Short description for logs.
    fn describe(&self) -> String;
}
