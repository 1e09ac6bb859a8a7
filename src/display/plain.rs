//! Line-oriented display for logs, pipes, and unattended terminals.
//!
//! Notices are printed as coloured lines (green for success, red for
//! errors). Each new check-in is printed once as `[time] identifier`, and an
//! empty registry as a placeholder line.
//! Colours follow the global `yansi` switch, which the application turns off
//! for `--no-color` and non-terminal output.

use std::collections::HashSet;
use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard};

use yansi::Paint;

use super::{Display, DisplayError, Renderer, StatusNotifier, PLACEHOLDER};
use crate::checkin::SessionEntry;

struct PlainInner<W> {
    out: W,
    printed: HashSet<String>,
}

/// Display that appends one line per event.
///
/// Output is append-only, so an identifier is printed the first time it
/// appears in the registry and never again. When an identifier is recorded
/// a second time its refreshed timestamp is not printed.
pub struct PlainDisplay<W: Write + Send = Stdout> {
    inner: Mutex<PlainInner<W>>,
}

impl PlainDisplay<Stdout> {
    /// Display writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> PlainDisplay<W> {
    /// Display writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            inner: Mutex::new(PlainInner {
                out,
                printed: HashSet::new(),
            }),
        }
    }

    /// Consume the display and return the writer.
    pub fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .out
    }

    fn lock(&self) -> MutexGuard<'_, PlainInner<W>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_line(inner: &mut PlainInner<W>, line: &str) {
        if let Err(e) = writeln!(inner.out, "{}", line).and_then(|()| inner.out.flush()) {
            log::warn!("Failed to write display line: {}", e);
        }
    }
}

impl<W: Write + Send> StatusNotifier for PlainDisplay<W> {
    fn show(&self, message: &str, is_error: bool) {
        let line = if is_error {
            message.red().bold().to_string()
        } else {
            message.green().to_string()
        };
        Self::write_line(&mut self.lock(), &line);
    }
}

impl<W: Write + Send> Renderer for PlainDisplay<W> {
    fn registry_changed(&self, entries: &[SessionEntry]) {
        let mut inner = self.lock();
        if entries.is_empty() {
            Self::write_line(&mut inner, &PLACEHOLDER.dim().to_string());
            return;
        }
        // Entries arrive newest first; print the unseen ones oldest first.
        for entry in entries.iter().rev() {
            if inner.printed.insert(entry.identifier.clone()) {
                let line = format!(
                    "[{}] {}  (total {})",
                    entry.checked_in_at.dim(),
                    entry.identifier.bold(),
                    entries.len()
                );
                Self::write_line(&mut inner, &line);
            }
        }
    }
}

impl<W: Write + Send> Display for PlainDisplay<W> {
    fn finish(&self) -> Result<(), DisplayError> {
        self.lock().out.flush()?;
        Ok(())
    }
}
