//! Terminal key-press scan source.
//!
//! While the screen display holds the terminal in raw mode, a
//! keyboard-wedge scanner's keystrokes arrive as individual key events.
//! [`KeyAssembler`] buffers them into codes terminated by Enter, Tab, or a
//! bare line feed (reported as Ctrl+J in raw mode). Esc ends
//! the input like end-of-file. Raw mode swallows SIGINT, so Ctrl+C is turned
//! into a shutdown request here.

use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use super::{ScanEvent, ScanSource, ScanSourceError};
use crate::signal::ShutdownHandler;

/// How long to wait for a key before re-checking the shutdown flag.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Result of feeding one key to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing to report yet.
    Pending,
    /// A complete read ended with a terminator key.
    Scan(ScanEvent),
    /// The operator pressed Esc.
    Quit,
    /// The operator pressed Ctrl+C.
    Interrupt,
}

/// Buffers key presses into scan reads.
#[derive(Debug, Default)]
pub struct KeyAssembler {
    buffer: String,
}

impl KeyAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key event.
    pub fn push(&mut self, key: KeyEvent) -> KeyAction {
        if key.kind != KeyEventKind::Press {
            return KeyAction::Pending;
        }

        match key.code {
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyAction::Interrupt
            }
            KeyCode::Enter | KeyCode::Tab => self.complete(),
            KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => self.complete(),
            KeyCode::Backspace => {
                self.buffer.pop();
                KeyAction::Pending
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.push(c);
                KeyAction::Pending
            }
            _ => KeyAction::Pending,
        }
    }

    fn complete(&mut self) -> KeyAction {
        let event = ScanEvent::from_text(&self.buffer);
        self.buffer.clear();
        KeyAction::Scan(event)
    }

    /// Characters typed since the last terminator.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

/// Scan source reading key events from the terminal.
#[derive(Debug, Clone)]
pub struct KeySource {
    shutdown: ShutdownHandler,
}

impl KeySource {
    /// Create a key source that reports Ctrl+C to `shutdown`.
    #[must_use]
    pub fn new(shutdown: ShutdownHandler) -> Self {
        Self { shutdown }
    }

    fn read_loop(self, events: mpsc::Sender<ScanEvent>) -> Result<(), ScanSourceError> {
        let mut assembler = KeyAssembler::new();
        while !self.shutdown.is_shutdown_requested() {
            if !event::poll(POLL_TIMEOUT)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };

            match assembler.push(key) {
                KeyAction::Pending => {}
                KeyAction::Scan(scan) => {
                    if events.blocking_send(scan).is_err() {
                        break;
                    }
                }
                KeyAction::Quit => {
                    log::info!("Quit requested from keyboard");
                    break;
                }
                KeyAction::Interrupt => {
                    log::info!("Interrupt requested from keyboard");
                    self.shutdown.request_shutdown();
                    break;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ScanSource for KeySource {
    async fn run(self: Box<Self>, events: mpsc::Sender<ScanEvent>) -> Result<(), ScanSourceError> {
        tokio::task::spawn_blocking(move || self.read_loop(events)).await?
    }

    fn describe(&self) -> String {
        "terminal keyboard".to_string()
    }
}
