//! Signal handling for graceful shutdown.
//!
//! Ctrl+C sets a shared `AtomicBool` and wakes the event loop. The loop then
//! stops taking scans, lets in-flight submissions finish, and exits.
//!
//! # Usage
//!
//! ```rust,no_run
//! use checkin_kiosk::signal::install_handler;
//!
//! # async fn demo() {
//! let handler = install_handler().expect("Failed to install signal handler");
//!
//! // Blocking code polls the flag...
//! if handler.is_shutdown_requested() {
//!     return;
//! }
//!
//! // ...async code waits for it.
//! handler.wait().await;
//! # }
//! ```
//!
//! # Exit Codes
//!
//! An interrupted session exits with code 130 (128 + SIGINT); see
//! [`ExitCode::Interrupted`](crate::error::ExitCode::Interrupted).

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::Notify;

/// Shared shutdown flag with an async wake-up.
///
/// Clones share the same state. The flag is safe to check from blocking
/// threads (the key reader) and from async tasks (the event loop).
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request a shutdown and wake a waiting event loop.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so a wait() that starts later still wakes.
        self.notify.notify_one();
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&self) {
        while !self.is_shutdown_requested() {
            self.notify.notified().await;
        }
    }

    /// Reset the flag. Used when a process-wide handler is reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install a Ctrl+C handler that requests shutdown.
///
/// The ctrlc hook can only be registered once per process. Later calls
/// reset and return the same handler, so the application can be started
/// repeatedly from tests.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the hook cannot be registered
/// and no handler exists yet.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let hooked = handler.clone();

    let installed = ctrlc::set_handler(move || {
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing pending check-ins...");
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
        hooked.request_shutdown();
    });

    match installed {
        Ok(()) => {
            let _ = GLOBAL_HANDLER.set(handler.clone());
            Ok(handler)
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            // Lost a race with another caller; reuse its handler if it got there.
            if let Some(existing) = GLOBAL_HANDLER.get() {
                existing.reset();
                Ok(existing.clone())
            } else {
                log::debug!("Ctrl+C handler already registered, using unhooked handler");
                Ok(handler)
            }
        }
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
