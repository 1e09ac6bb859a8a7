//! The kiosk event loop.
//!
//! One task owns the [`Orchestrator`] and reacts to four kinds of wake-up:
//!
//! * a scan event from the scan source,
//! * a finished submission,
//! * a display tick (clears expired notices),
//! * a shutdown request.
//!
//! Submissions run on their own tasks, so the loop keeps taking scans while
//! a request is outstanding. Their outcomes come back to the loop, which is
//! the only writer of the session registry.
//!
//! When the input ends or shutdown is requested the loop stops taking
//! scans, waits for pending submissions, and releases the display.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::checkin::{
    CheckInService, HttpCheckInService, Identifier, Orchestrator, Outcome, ScanState,
};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::screen::KioskView;
use crate::display::{
    Display, JsonDisplay, PlainDisplay, Renderer, ScreenDisplay, StatusNotifier, Theme,
};
use crate::error::ExitCode;
use crate::scan::{
    KeySource, LineSource, ScanEvent, ScanSource, ScanSourceError, SCAN_CHANNEL_CAPACITY,
};
use crate::signal::ShutdownHandler;

/// How often the display gets a chance to clear an expired notice.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Notice shown when the scan input cannot be opened or fails.
pub const SCANNER_UNAVAILABLE_MESSAGE: &str = "Error: Could not access scanner.";

/// What a finished session looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Identifiers checked in during the session.
    pub checked_in: usize,
    /// Whether the session ended on a shutdown request.
    pub interrupted: bool,
}

impl SessionSummary {
    /// Process exit code for this session.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.interrupted {
            ExitCode::Interrupted
        } else {
            ExitCode::Success
        }
    }
}

/// Build an orchestrator for `config` that reports to `display`.
pub fn orchestrator_for<D: Display + 'static>(
    config: &Config,
    service: Arc<dyn CheckInService>,
    display: &Arc<D>,
) -> Orchestrator {
    let notifier: Arc<dyn StatusNotifier> = display.clone();
    let renderer: Arc<dyn Renderer> = display.clone();
    Orchestrator::new(service, notifier, renderer)
        .with_cooldown(config.cooldown())
        .with_time_format(config.time_format.clone())
}

/// Run the kiosk described by `config` until the input ends or `shutdown`
/// fires.
///
/// Codes are read from `input` when given. Otherwise the screen display
/// reads the keyboard and the line displays read stdin.
///
/// # Errors
///
/// Returns an error if the display or the HTTP client cannot be set up, or
/// if the scan input cannot be opened or fails while reading.
pub async fn run(
    config: &Config,
    input: Option<&Path>,
    shutdown: ShutdownHandler,
) -> anyhow::Result<SessionSummary> {
    let endpoint = config.endpoint_url()?;
    let service = HttpCheckInService::new(endpoint, config.request_timeout())
        .context("failed to build HTTP client")?;
    log::info!("Submitting check-ins to {}", service.describe());
    let service: Arc<dyn CheckInService> = Arc::new(service);

    match config.output {
        OutputFormat::Screen => {
            let view = KioskView::new(
                &config.title,
                &config.endpoint,
                Theme::from_arg(config.theme),
                config.status_clear(),
            );
            let display =
                Arc::new(ScreenDisplay::open(view).context("failed to open kiosk screen")?);
            let source = match input {
                Some(path) => open_lines(path).await,
                None => Ok(Box::new(KeySource::new(shutdown.clone())) as Box<dyn ScanSource>),
            };
            serve(config, service, display, source, shutdown).await
        }
        OutputFormat::Plain => {
            let display = Arc::new(PlainDisplay::stdout());
            let source = open_input(input).await;
            serve(config, service, display, source, shutdown).await
        }
        OutputFormat::Json => {
            let display = Arc::new(JsonDisplay::stdout());
            let source = open_input(input).await;
            serve(config, service, display, source, shutdown).await
        }
    }
}

async fn open_lines(path: &Path) -> Result<Box<dyn ScanSource>, ScanSourceError> {
    let source = LineSource::open(path).await?;
    Ok(Box::new(source))
}

async fn open_input(input: Option<&Path>) -> Result<Box<dyn ScanSource>, ScanSourceError> {
    match input {
        Some(path) => open_lines(path).await,
        None => Ok(Box::new(LineSource::stdin())),
    }
}

async fn serve<D: Display + 'static>(
    config: &Config,
    service: Arc<dyn CheckInService>,
    display: Arc<D>,
    source: Result<Box<dyn ScanSource>, ScanSourceError>,
    shutdown: ShutdownHandler,
) -> anyhow::Result<SessionSummary> {
    let source = match source {
        Ok(source) => source,
        Err(e) => {
            log::error!("Scanner unavailable: {}", e);
            display.show(SCANNER_UNAVAILABLE_MESSAGE, true);
            release(display.as_ref());
            return Err(e.into());
        }
    };

    let orchestrator = orchestrator_for(config, service, &display);
    Ok(run_session(orchestrator, display, source, shutdown).await?)
}

/// Drive `orchestrator` with events from `source` until the input ends or
/// `shutdown` fires, then drain pending submissions and release `display`.
///
/// `display` must be the sink the orchestrator reports to.
///
/// # Errors
///
/// Returns [`ScanSourceError`] if the scan source failed while reading.
/// Check-ins completed before the failure stay recorded and shown.
pub async fn run_session<D: Display + 'static>(
    mut orchestrator: Orchestrator,
    display: Arc<D>,
    source: Box<dyn ScanSource>,
    shutdown: ShutdownHandler,
) -> Result<SessionSummary, ScanSourceError> {
    log::info!("Reading scans from {}", source.describe());
    orchestrator.start();

    let (events_tx, mut events) = mpsc::channel(SCAN_CHANNEL_CAPACITY);
    let reader = tokio::spawn(source.run(events_tx));

    let mut pending: JoinSet<(Identifier, Outcome)> = JoinSet::new();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut accepting = true;
    let mut input_closed = false;

    loop {
        if !accepting && pending.is_empty() {
            break;
        }

        tokio::select! {
            event = events.recv(), if accepting => match event {
                Some(ScanEvent::Decoded(text)) => {
                    if let ScanState::Submitting(identifier) = orchestrator.receive(&text) {
                        let submitter = orchestrator.submitter();
                        pending.spawn(async move {
                            let outcome = submitter.submit(&identifier).await;
                            (identifier, outcome)
                        });
                    }
                }
                Some(ScanEvent::Failed(description)) => orchestrator.decode_failed(&description),
                None => {
                    log::info!("Scan input closed");
                    accepting = false;
                    input_closed = true;
                }
            },
            Some(joined) = pending.join_next(), if !pending.is_empty() => match joined {
                Ok((identifier, outcome)) => {
                    orchestrator.complete(identifier, outcome);
                }
                Err(e) => log::error!("Check-in task failed: {}", e),
            },
            _ = ticker.tick() => {
                if let Err(e) = display.tick() {
                    log::warn!("Display refresh failed: {}", e);
                }
            }
            () = shutdown.wait(), if accepting => {
                log::info!("Shutdown requested, no longer accepting scans");
                accepting = false;
            }
        }

        if !accepting && !pending.is_empty() {
            log::info!("Waiting for {} pending check-in(s)", pending.len());
        }
    }

    drop(events);
    let read_result = if input_closed || reader.is_finished() {
        reader.await?
    } else {
        // Still blocked on input after a shutdown request.
        reader.abort();
        Ok(())
    };

    if let Err(e) = &read_result {
        log::error!("Scanner failed: {}", e);
        display.show(SCANNER_UNAVAILABLE_MESSAGE, true);
    }

    let summary = SessionSummary {
        checked_in: orchestrator.registry().len(),
        interrupted: shutdown.is_shutdown_requested(),
    };
    log::info!(
        "Session ended: {} student(s) checked in{}",
        summary.checked_in,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
    release(display.as_ref());

    read_result.map(|()| summary)
}

fn release<D: Display + ?Sized>(display: &D) {
    if let Err(e) = display.finish() {
        log::warn!("Failed to release display: {}", e);
    }
}
