//! In-memory display that records everything it is asked to show.
//!
//! Useful for driving the check-in core without a terminal, in tests or
//! when embedding the crate in another front end.

use std::sync::{Mutex, MutexGuard};

use super::{Display, Renderer, StatusNotifier};
use crate::checkin::SessionEntry;

#[derive(Debug, Default)]
struct Recorded {
    statuses: Vec<(String, bool)>,
    renders: Vec<Vec<SessionEntry>>,
}

/// Display that keeps every notice and every rendered registry snapshot.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    recorded: Mutex<Recorded>,
}

impl RecordingDisplay {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All notices in the order shown, as `(message, is_error)`.
    #[must_use]
    pub fn statuses(&self) -> Vec<(String, bool)> {
        self.lock().statuses.clone()
    }

    /// The most recent notice.
    #[must_use]
    pub fn last_status(&self) -> Option<(String, bool)> {
        self.lock().statuses.last().cloned()
    }

    /// Number of registry change signals received.
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.lock().renders.len()
    }

    /// The entries passed with the latest registry change signal.
    #[must_use]
    pub fn last_render(&self) -> Option<Vec<SessionEntry>> {
        self.lock().renders.last().cloned()
    }
}

impl StatusNotifier for RecordingDisplay {
    fn show(&self, message: &str, is_error: bool) {
        self.lock().statuses.push((message.to_string(), is_error));
    }
}

impl Renderer for RecordingDisplay {
    fn registry_changed(&self, entries: &[SessionEntry]) {
        self.lock().renders.push(entries.to_vec());
    }
}

impl Display for RecordingDisplay {}
