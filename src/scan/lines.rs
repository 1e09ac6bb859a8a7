//! Line-per-code scan source.
//!
//! Keyboard-wedge scanners type the code followed by Enter, so reading stdin
//! line by line is enough to drive the kiosk from a USB scanner. The same
//! source replays a file of recorded codes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::mpsc;

use super::{ScanEvent, ScanSource, ScanSourceError};

/// Reads one code per line from an async reader.
pub struct LineSource<R> {
    reader: R,
    name: String,
}

impl LineSource<BufReader<Stdin>> {
    /// Source reading standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), "stdin")
    }
}

impl LineSource<BufReader<File>> {
    /// Source reading the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanSourceError::Open`] if the file cannot be opened.
    pub async fn open(path: &Path) -> Result<Self, ScanSourceError> {
        let file = File::open(path)
            .await
            .map_err(|source| ScanSourceError::Open {
                path: PathBuf::from(path),
                source,
            })?;
        Ok(Self::new(BufReader::new(file), &path.display().to_string()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    /// Source reading `reader`, described as `name` in logs.
    pub fn new(reader: R, name: &str) -> Self {
        Self {
            reader,
            name: name.to_string(),
        }
    }

    /// Read until end of input or until the receiver goes away.
    ///
    /// # Errors
    ///
    /// Returns [`ScanSourceError::Io`] if reading fails.
    pub async fn pump(mut self, events: mpsc::Sender<ScanEvent>) -> Result<(), ScanSourceError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf).await? == 0 {
                log::debug!("Scan input {} reached end of input", self.name);
                return Ok(());
            }

            let event = match std::str::from_utf8(&buf) {
                Ok(text) => ScanEvent::from_text(text),
                Err(e) => ScanEvent::Failed(format!("invalid UTF-8 in scan: {}", e)),
            };

            if events.send(event).await.is_err() {
                log::debug!("Scan receiver closed, stopping {}", self.name);
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> ScanSource for LineSource<R> {
    async fn run(self: Box<Self>, events: mpsc::Sender<ScanEvent>) -> Result<(), ScanSourceError> {
        (*self).pump(events).await
    }

    fn describe(&self) -> String {
        format!("lines from {}", self.name)
    }
}
