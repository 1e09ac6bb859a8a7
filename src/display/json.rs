//! JSON Lines display for consumption by other programs.
//!
//! Every event is one compact JSON object on its own line:
//!
//! ```json
//! {"event":"status","message":"Success: Checked in","is_error":false,"at":"2024-09-02T08:00:03+02:00"}
//! {"event":"registry","count":1,"entries":[{"identifier":"STU123","checked_in_at":"08:00:03"}]}
//! ```

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::Serialize;

use super::{Display, DisplayError, Renderer, StatusNotifier};
use crate::checkin::SessionEntry;

/// One line of output.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum DisplayEvent<'a> {
    Status {
        message: &'a str,
        is_error: bool,
        at: DateTime<Local>,
    },
    Registry {
        count: usize,
        entries: &'a [SessionEntry],
    },
}

/// Display that writes JSON Lines.
pub struct JsonDisplay<W: Write + Send = Stdout> {
    out: Mutex<W>,
}

impl JsonDisplay<Stdout> {
    /// Display writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonDisplay<W> {
    /// Display writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the display and return the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        self.out.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: &DisplayEvent<'_>) -> Result<(), DisplayError> {
        let line = serde_json::to_string(event)?;
        let mut out = self.lock();
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }

    fn emit_or_log(&self, event: &DisplayEvent<'_>) {
        if let Err(e) = self.emit(event) {
            log::warn!("Failed to write JSON display event: {}", e);
        }
    }
}

impl<W: Write + Send> StatusNotifier for JsonDisplay<W> {
    fn show(&self, message: &str, is_error: bool) {
        self.emit_or_log(&DisplayEvent::Status {
            message,
            is_error,
            at: Local::now(),
        });
    }
}

impl<W: Write + Send> Renderer for JsonDisplay<W> {
    fn registry_changed(&self, entries: &[SessionEntry]) {
        self.emit_or_log(&DisplayEvent::Registry {
            count: entries.len(),
            entries,
        });
    }
}

impl<W: Write + Send> Display for JsonDisplay<W> {
    fn finish(&self) -> Result<(), DisplayError> {
        self.lock().flush()?;
        Ok(())
    }
}
