//! Displays for status notices and the session log.
//!
//! The check-in core talks to two sinks:
//!
//! * [`StatusNotifier`]: transient success/error notices, fire-and-forget.
//! * [`Renderer`]: "the registry changed, redraw" signals.
//!
//! Every display in this module implements both, plus [`Display`] for the
//! event loop's housekeeping.
//!
//! # Displays
//!
//! * [`screen`]: full-screen ratatui view for a kiosk terminal.
//! * [`plain`]: coloured line output for logs and pipes.
//! * [`json`]: one JSON object per event for other programs.
//! * [`recording`]: in-memory capture, for tests and embedding.

pub mod json;
pub mod plain;
pub mod recording;
pub mod screen;
pub mod theme;

use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::checkin::SessionEntry;

pub use json::JsonDisplay;
pub use plain::PlainDisplay;
pub use recording::RecordingDisplay;
pub use screen::ScreenDisplay;
pub use theme::Theme;

/// Text shown while the registry is empty.
pub const PLACEHOLDER: &str = "No students checked in yet.";

/// Default time a notice stays visible.
pub const DEFAULT_STATUS_CLEAR: Duration = Duration::from_millis(3000);

/// Sink for transient notices.
pub trait StatusNotifier: Send + Sync {
    /// Show `message`, styled as an error when `is_error` is set.
    fn show(&self, message: &str, is_error: bool);
}

/// Sink for session registry changes.
pub trait Renderer: Send + Sync {
    /// Redraw the session log. `entries` is ordered most recent first.
    fn registry_changed(&self, entries: &[SessionEntry]);
}

/// A complete display driven by the event loop.
pub trait Display: StatusNotifier + Renderer {
    /// Periodic housekeeping, such as clearing an expired notice.
    fn tick(&self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Release the display. Called once when the loop exits.
    fn finish(&self) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Error type for display operations.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// I/O error from the terminal or output stream.
    #[error("display I/O error: {0}")]
    Io(#[from] io::Error),

    /// A JSON event could not be serialized.
    #[error("failed to serialize display event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A notice as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Text of the notice.
    pub message: String,
    /// Whether the notice reports a problem.
    pub is_error: bool,
}

/// The current notice plus its auto-clear deadline.
///
/// A newer notice replaces the older one and restarts the timer.
#[derive(Debug, Clone)]
pub struct StatusLine {
    clear_after: Duration,
    current: Option<(Status, Instant)>,
}

impl StatusLine {
    /// Create an empty status line that clears notices after `clear_after`.
    #[must_use]
    pub fn new(clear_after: Duration) -> Self {
        Self {
            clear_after,
            current: None,
        }
    }

    /// Replace the current notice.
    pub fn set(&mut self, message: &str, is_error: bool, now: Instant) {
        self.current = Some((
            Status {
                message: message.to_string(),
                is_error,
            },
            now,
        ));
    }

    /// The notice still visible at `now`, if any.
    #[must_use]
    pub fn visible(&self, now: Instant) -> Option<&Status> {
        self.current
            .as_ref()
            .filter(|(_, shown_at)| now.saturating_duration_since(*shown_at) < self.clear_after)
            .map(|(status, _)| status)
    }

    /// Drop the notice if it has expired. Returns `true` if one was dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.current.is_some() && self.visible(now).is_none() {
            self.current = None;
            true
        } else {
            false
        }
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_CLEAR)
    }
}
