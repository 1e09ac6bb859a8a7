//! Whole sessions through the event loop: scan source, spawned submissions,
//! display, and shutdown.

use async_trait::async_trait;
use checkin_kiosk::app::{orchestrator_for, run_session, SCANNER_UNAVAILABLE_MESSAGE};
use checkin_kiosk::checkin::{CheckInService, ServiceError, ServiceReply};
use checkin_kiosk::config::Config;
use checkin_kiosk::display::{JsonDisplay, RecordingDisplay};
use checkin_kiosk::error::ExitCode;
use checkin_kiosk::scan::{LineSource, ScanSourceError};
use checkin_kiosk::signal::ShutdownHandler;
use serde_json::Value;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

/// Accepts everything after a short delay, counting calls.
#[derive(Default)]
struct SlowService {
    calls: AtomicUsize,
}

#[async_trait]
impl CheckInService for SlowService {
    async fn check_in(&self, identifier: &str) -> Result<ServiceReply, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(ServiceReply::Accepted {
            message: Some(format!("Welcome {}", identifier)),
        })
    }
}

fn config(cooldown_ms: u64) -> Config {
    Config {
        cooldown_ms,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_replayed_file_checks_everyone_in() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scans.txt");
    fs::write(&path, "STU1\n\nSTU2\r\nSTU3\n").unwrap();

    let display = Arc::new(RecordingDisplay::new());
    let service = Arc::new(SlowService::default());
    let orchestrator = orchestrator_for(&config(0), service.clone(), &display);
    let source = Box::new(LineSource::open(&path).await.unwrap());

    let summary = run_session(orchestrator, display.clone(), source, ShutdownHandler::new())
        .await
        .unwrap();

    assert_eq!(summary.checked_in, 3);
    assert_eq!(summary.exit_code(), ExitCode::Success);
    assert_eq!(service.calls.load(Ordering::SeqCst), 3);

    // Empty line was decoding noise: no notice, no submission.
    let successes = display
        .statuses()
        .into_iter()
        .filter(|(message, _)| message.starts_with("Success: "))
        .count();
    assert_eq!(successes, 3);
}

#[tokio::test]
async fn test_burst_is_throttled_by_cooldown() {
    let display = Arc::new(RecordingDisplay::new());
    let service = Arc::new(SlowService::default());
    let orchestrator = orchestrator_for(&config(3000), service.clone(), &display);
    let source = Box::new(LineSource::new(&b"STU1\nSTU1\nSTU2\nSTU3\n"[..], "burst"));

    let summary = run_session(orchestrator, display.clone(), source, ShutdownHandler::new())
        .await
        .unwrap();

    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    assert_eq!(summary.checked_in, 1);
    assert_eq!(
        display.last_render().unwrap()[0].identifier,
        "STU1".to_string()
    );
}

#[tokio::test]
async fn test_pending_submissions_finish_before_exit() {
    let display = Arc::new(RecordingDisplay::new());
    let service = Arc::new(SlowService::default());
    let orchestrator = orchestrator_for(&config(0), service.clone(), &display);
    let source = Box::new(LineSource::new(&b"A\nB\nC\nD\n"[..], "fast"));

    let summary = run_session(orchestrator, display.clone(), source, ShutdownHandler::new())
        .await
        .unwrap();

    assert_eq!(summary.checked_in, 4);
    assert_eq!(display.last_render().unwrap().len(), 4);
}

#[tokio::test]
async fn test_shutdown_interrupts_idle_session() {
    let display = Arc::new(RecordingDisplay::new());
    let orchestrator = orchestrator_for(&config(0), Arc::new(SlowService::default()), &display);
    let (_writer, reader) = tokio::io::duplex(64);
    let source = Box::new(LineSource::new(tokio::io::BufReader::new(reader), "idle"));

    let shutdown = ShutdownHandler::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.request_shutdown();
    });

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        run_session(orchestrator, display.clone(), source, shutdown),
    )
    .await
    .expect("session did not stop on shutdown")
    .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.exit_code(), ExitCode::Interrupted);
    assert_eq!(summary.checked_in, 0);
    assert_eq!(display.last_render(), Some(vec![]));
}

#[tokio::test]
async fn test_missing_input_file() {
    let err = LineSource::open(std::path::Path::new("/nonexistent/scans.txt"))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ScanSourceError::Open { .. }));
    assert_eq!(
        ExitCode::for_error(&anyhow::Error::new(err)),
        ExitCode::ScannerUnavailable
    );
    assert_eq!(SCANNER_UNAVAILABLE_MESSAGE, "Error: Could not access scanner.");
}

#[tokio::test]
async fn test_json_display_event_stream() {
    let display = Arc::new(JsonDisplay::new(Vec::new()));
    let orchestrator = orchestrator_for(&config(0), Arc::new(SlowService::default()), &display);
    let source = Box::new(LineSource::new(&b"STU42\n"[..], "one"));

    run_session(orchestrator, display.clone(), source, ShutdownHandler::new())
        .await
        .unwrap();

    let output = Arc::try_unwrap(display)
        .ok()
        .expect("display still shared")
        .into_inner();
    let events: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let kinds: Vec<&str> = events.iter().map(|e| e["event"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["registry", "status", "registry", "status"]);
    assert_eq!(events[0]["count"], 0);
    assert_eq!(events[1]["message"], "Processing check-in...");
    assert_eq!(events[2]["entries"][0]["identifier"], "STU42");
    assert_eq!(events[3]["message"], "Success: Welcome STU42");
    assert_eq!(events[3]["is_error"], false);
}
