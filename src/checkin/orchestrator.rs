//! Composition of filter, submitter, and registry into one scan pipeline.
//!
//! # State machine
//!
//! ```text
//! Received ──► Filtered ──► Dropped                (cooldown: silent)
//!                     │                            (duplicate: warning)
//!                     └──► Submitting ──► Registered
//!                                     ├──► Rejected
//!                                     └──► Failed
//! ```
//!
//! [`Orchestrator::receive`] runs the synchronous half (up to `Submitting`)
//! and [`Orchestrator::complete`] the continuation once the submission
//! finishes. Between the two the caller is free to await the submission on
//! another task; the registry is only written in `complete`.
//!
//! # Example
//!
//! ```no_run
//! use checkin_kiosk::checkin::{HttpCheckInService, Orchestrator};
//! use checkin_kiosk::display::RecordingDisplay;
//! use std::sync::Arc;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let service = HttpCheckInService::new("http://localhost:8000/checkin".parse()?, None)?;
//! let display = Arc::new(RecordingDisplay::new());
//! let mut orchestrator = Orchestrator::new(Arc::new(service), display.clone(), display);
//!
//! let state = orchestrator.process("STU123").await;
//! println!("{:?}", state);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use super::filter::{CooldownFilter, Decision, DEFAULT_SCAN_COOLDOWN};
use super::registry::SessionRegistry;
use super::submitter::{CheckInService, Outcome, Submitter};
use super::Identifier;
use crate::clock::{is_valid_time_format, Clock, SystemClock};
use crate::display::{Renderer, StatusNotifier};

/// Default chrono format of display timestamps.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Where a scan event ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Filtered out; carries the filter's decision.
    Dropped(Decision),
    /// Admitted; the identifier must now be submitted.
    Submitting(Identifier),
    /// Submission succeeded and the identifier is recorded.
    Registered(Identifier),
    /// The service refused the identifier.
    Rejected(Identifier),
    /// The service could not be reached.
    Failed(Identifier),
}

/// Per-session owner of the cooldown state and the session registry.
pub struct Orchestrator {
    filter: CooldownFilter,
    registry: SessionRegistry,
    submitter: Submitter,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn StatusNotifier>,
    renderer: Arc<dyn Renderer>,
    time_format: String,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("filter", &self.filter)
            .field("registry", &self.registry)
            .field("submitter", &self.submitter)
            .field("time_format", &self.time_format)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator with the system clock, the default cooldown,
    /// and the default time format.
    pub fn new(
        service: Arc<dyn CheckInService>,
        notifier: Arc<dyn StatusNotifier>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            filter: CooldownFilter::new(DEFAULT_SCAN_COOLDOWN),
            registry: SessionRegistry::new(),
            submitter: Submitter::new(service, Arc::clone(&notifier)),
            clock: Arc::new(SystemClock),
            notifier,
            renderer,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// Use `clock` for cooldown decisions and display timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the global scan cooldown. Resets the cooldown state.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.filter = CooldownFilter::new(cooldown);
        self
    }

    /// Set the chrono format used for display timestamps.
    ///
    /// A format chrono cannot render is ignored and the current one kept.
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        let format = format.into();
        if is_valid_time_format(&format) {
            self.time_format = format;
        } else {
            log::warn!(
                "Ignoring invalid time format {:?}, keeping {:?}",
                format,
                self.time_format
            );
        }
        self
    }

    /// The session registry.
    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// The cooldown filter.
    #[must_use]
    pub fn filter(&self) -> &CooldownFilter {
        &self.filter
    }

    /// A submitter that can be moved onto another task.
    #[must_use]
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Draw the (empty) registry once at session start.
    pub fn start(&self) {
        self.renderer.registry_changed(&self.registry.snapshot());
    }

    /// Handle a decoded value: `Received → Filtered → Dropped | Submitting`.
    ///
    /// Runs to completion without suspending, so the cooldown decision is
    /// made strictly in arrival order.
    pub fn receive(&mut self, text: &str) -> ScanState {
        let now = self.clock.now();
        match self.filter.admit(text, now, &self.registry) {
            Decision::SuppressedByCooldown => {
                log::trace!("Dropped scan within cooldown: {}", text);
                ScanState::Dropped(Decision::SuppressedByCooldown)
            }
            Decision::SuppressedAsDuplicate => {
                log::info!("Already checked in: {}", text);
                self.notifier
                    .show(&format!("Already checked in: {}", text), true);
                ScanState::Dropped(Decision::SuppressedAsDuplicate)
            }
            Decision::Proceed => {
                log::info!("Code scanned: {}", text);
                ScanState::Submitting(text.to_string())
            }
        }
    }

    /// Handle a decoder failure. Decoding noise is expected and not shown.
    pub fn decode_failed(&self, description: &str) {
        log::trace!("Scan decode failure ignored: {}", description);
    }

    /// Apply a finished submission: `Submitting → Registered | Rejected | Failed`.
    pub fn complete(&mut self, identifier: Identifier, outcome: Outcome) -> ScanState {
        match outcome {
            Outcome::Success(message) => {
                let checked_in_at = self
                    .clock
                    .local_now()
                    .format(&self.time_format)
                    .to_string();
                log::info!("Checked in {} at {}: {}", identifier, checked_in_at, message);
                self.registry.record(identifier.clone(), checked_in_at);
                self.renderer.registry_changed(&self.registry.snapshot());
                self.notifier.show(&format!("Success: {}", message), false);
                ScanState::Registered(identifier)
            }
            Outcome::Rejected(detail) => {
                log::warn!("Check-in of {} rejected: {}", identifier, detail);
                self.notifier.show(&format!("Error: {}", detail), true);
                ScanState::Rejected(identifier)
            }
            Outcome::TransportFailure(text) => {
                self.notifier.show(&format!("Error: {}", text), true);
                ScanState::Failed(identifier)
            }
        }
    }

    /// Run one scan through the whole pipeline, awaiting the submission
    /// in place.
    pub async fn process(&mut self, text: &str) -> ScanState {
        match self.receive(text) {
            ScanState::Submitting(identifier) => {
                let outcome = self.submitter.submit(&identifier).await;
                self.complete(identifier, outcome)
            }
            terminal => terminal,
        }
    }
}
