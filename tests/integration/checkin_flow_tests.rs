//! End-to-end behaviour of the scan pipeline with a scripted service and a
//! manually driven clock.

use async_trait::async_trait;
use checkin_kiosk::checkin::{
    CheckInService, Decision, Orchestrator, ScanState, ServiceError, ServiceReply,
};
use checkin_kiosk::clock::ManualClock;
use checkin_kiosk::display::RecordingDisplay;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// STU123 and STU456 exist, STU777 gets a garbled reply from a broken
/// proxy, everyone else is unknown.
#[derive(Default)]
struct ScriptedService {
    calls: Mutex<Vec<String>>,
}

impl ScriptedService {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckInService for ScriptedService {
    async fn check_in(&self, identifier: &str) -> Result<ServiceReply, ServiceError> {
        self.calls.lock().unwrap().push(identifier.to_string());
        match identifier {
            "STU123" | "STU456" => Ok(ServiceReply::Accepted {
                message: Some("Checked in".into()),
            }),
            "STU777" => Err(ServiceError::MalformedBody {
                status: 502,
                source: serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
            }),
            "SILENT" => Ok(ServiceReply::Accepted { message: None }),
            "NODETAIL" => Ok(ServiceReply::Refused {
                status: 500,
                detail: None,
            }),
            _ => Ok(ServiceReply::Refused {
                status: 404,
                detail: Some("Student not found".into()),
            }),
        }
    }
}

struct Kiosk {
    orchestrator: Orchestrator,
    clock: Arc<ManualClock>,
    display: Arc<RecordingDisplay>,
    service: Arc<ScriptedService>,
}

impl Kiosk {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let display = Arc::new(RecordingDisplay::new());
        let service = Arc::new(ScriptedService::default());
        let orchestrator = Orchestrator::new(service.clone(), display.clone(), display.clone())
            .with_clock(clock.clone());
        Self {
            orchestrator,
            clock,
            display,
            service,
        }
    }

    async fn scan_at(&mut self, millis: u64, text: &str) -> ScanState {
        self.clock.set_elapsed(Duration::from_millis(millis));
        self.orchestrator.process(text).await
    }
}

#[tokio::test]
async fn test_first_scan_checks_in() {
    let mut kiosk = Kiosk::new();

    let state = kiosk.scan_at(0, "STU123").await;

    assert_eq!(state, ScanState::Registered("STU123".into()));
    assert_eq!(kiosk.orchestrator.registry().len(), 1);
    assert!(kiosk.orchestrator.registry().contains("STU123"));
    assert_eq!(
        kiosk.display.statuses(),
        vec![
            ("Processing check-in...".to_string(), false),
            ("Success: Checked in".to_string(), false),
        ]
    );
    let rendered = kiosk.display.last_render().unwrap();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].identifier, "STU123");
}

#[tokio::test]
async fn test_rescan_within_cooldown_is_silent() {
    let mut kiosk = Kiosk::new();
    kiosk.scan_at(0, "STU123").await;
    let notices = kiosk.display.statuses().len();

    let state = kiosk.scan_at(500, "STU123").await;

    assert_eq!(state, ScanState::Dropped(Decision::SuppressedByCooldown));
    assert_eq!(kiosk.service.calls(), vec!["STU123"]);
    assert_eq!(kiosk.display.statuses().len(), notices);
}

#[tokio::test]
async fn test_rescan_after_cooldown_is_duplicate() {
    let mut kiosk = Kiosk::new();
    kiosk.scan_at(0, "STU123").await;

    let state = kiosk.scan_at(4000, "STU123").await;

    assert_eq!(state, ScanState::Dropped(Decision::SuppressedAsDuplicate));
    assert_eq!(kiosk.service.calls(), vec!["STU123"]);
    assert_eq!(
        kiosk.display.last_status(),
        Some(("Already checked in: STU123".to_string(), true))
    );
    assert_eq!(kiosk.orchestrator.registry().len(), 1);
}

#[tokio::test]
async fn test_unknown_student_is_rejected() {
    let mut kiosk = Kiosk::new();

    let state = kiosk.scan_at(5000, "STU999").await;

    assert_eq!(state, ScanState::Rejected("STU999".into()));
    assert!(kiosk.orchestrator.registry().is_empty());
    assert_eq!(
        kiosk.display.last_status(),
        Some(("Error: Student not found".to_string(), true))
    );
    assert_eq!(kiosk.display.render_count(), 0);
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    let mut kiosk = Kiosk::new();

    let state = kiosk.scan_at(8000, "STU777").await;

    assert_eq!(state, ScanState::Failed("STU777".into()));
    assert!(kiosk.orchestrator.registry().is_empty());
    assert_eq!(
        kiosk.display.last_status(),
        Some(("Error: Could not connect to the server.".to_string(), true))
    );
}

#[tokio::test]
async fn test_duplicate_consumes_cooldown_slot() {
    let mut kiosk = Kiosk::new();
    kiosk.scan_at(0, "STU123").await;
    kiosk.scan_at(4000, "STU123").await;

    // One second after the duplicate: still inside its cooldown window.
    let blocked = kiosk.scan_at(5000, "STU999").await;
    assert_eq!(blocked, ScanState::Dropped(Decision::SuppressedByCooldown));

    let failed = kiosk.scan_at(8000, "STU777").await;
    assert_eq!(failed, ScanState::Failed("STU777".into()));

    assert_eq!(kiosk.service.calls(), vec!["STU123", "STU777"]);
}

#[tokio::test]
async fn test_failed_identifier_can_be_retried() {
    let mut kiosk = Kiosk::new();
    assert_eq!(
        kiosk.scan_at(0, "STU999").await,
        ScanState::Rejected("STU999".into())
    );
    assert_eq!(
        kiosk.scan_at(3000, "STU999").await,
        ScanState::Rejected("STU999".into())
    );
    assert_eq!(kiosk.service.calls(), vec!["STU999", "STU999"]);
}

#[tokio::test]
async fn test_fallback_texts() {
    let mut kiosk = Kiosk::new();

    kiosk.scan_at(0, "SILENT").await;
    assert_eq!(
        kiosk.display.last_status(),
        Some(("Success: Check-in successful".to_string(), false))
    );

    kiosk.scan_at(3000, "NODETAIL").await;
    assert_eq!(
        kiosk.display.last_status(),
        Some(("Error: Unknown error occurred".to_string(), true))
    );
}

#[tokio::test]
async fn test_render_is_most_recent_first() {
    let mut kiosk = Kiosk::new();
    kiosk.scan_at(0, "STU123").await;
    kiosk.scan_at(3000, "STU456").await;

    let rendered = kiosk.display.last_render().unwrap();
    let order: Vec<&str> = rendered.iter().map(|e| e.identifier.as_str()).collect();
    assert_eq!(order, vec!["STU456", "STU123"]);
    assert_eq!(kiosk.display.render_count(), 2);
}

#[tokio::test]
async fn test_timestamp_follows_wall_clock() {
    let wall = chrono::Local::now();
    let clock = Arc::new(ManualClock::with_wall_time(wall));
    let display = Arc::new(RecordingDisplay::new());
    let mut orchestrator = Orchestrator::new(
        Arc::new(ScriptedService::default()),
        display.clone(),
        display,
    )
    .with_clock(clock.clone())
    .with_time_format("%H:%M:%S");

    clock.advance(Duration::from_secs(90));
    orchestrator.process("STU123").await;

    let expected = (wall + chrono::Duration::seconds(90))
        .format("%H:%M:%S")
        .to_string();
    assert_eq!(
        orchestrator.registry().get("STU123").unwrap().checked_in_at,
        expected
    );
}
