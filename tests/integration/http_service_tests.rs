//! The HTTP verification client against a canned local server.

use checkin_kiosk::checkin::{
    CheckInService, HttpCheckInService, Outcome, ServiceError, ServiceReply, Submitter,
};
use checkin_kiosk::display::RecordingDisplay;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one request with `status` and `body`, returning the raw request.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/checkin", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (url, handle)
}

/// Read headers plus a Content-Length body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(split) = text.find("\r\n\r\n") {
            let content_length = text[..split]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= split + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn client(url: &str) -> HttpCheckInService {
    HttpCheckInService::new(url.parse().unwrap(), Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn test_success_reply_carries_message() {
    let (url, server) = serve_once("200 OK", r#"{"message":"Checked in"}"#).await;

    let reply = client(&url).check_in("STU123").await.unwrap();
    assert_eq!(
        reply,
        ServiceReply::Accepted {
            message: Some("Checked in".into())
        }
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /checkin HTTP/1.1"));
    assert!(request
        .to_ascii_lowercase()
        .contains("content-type: application/json"));
    assert!(request.ends_with(r#"{"student_id":"STU123"}"#));
}

#[tokio::test]
async fn test_not_found_reply_carries_detail() {
    let (url, _server) = serve_once("404 Not Found", r#"{"detail":"Student not found"}"#).await;

    let reply = client(&url).check_in("STU999").await.unwrap();
    assert_eq!(
        reply,
        ServiceReply::Refused {
            status: 404,
            detail: Some("Student not found".into())
        }
    );
}

#[tokio::test]
async fn test_refusal_without_detail() {
    let (url, _server) = serve_once("500 Internal Server Error", "{}").await;

    let reply = client(&url).check_in("STU1").await.unwrap();
    assert_eq!(
        reply,
        ServiceReply::Refused {
            status: 500,
            detail: None
        }
    );
}

#[tokio::test]
async fn test_structured_detail_is_rendered_as_json() {
    let (url, _server) = serve_once(
        "422 Unprocessable Entity",
        r#"{"detail":[{"msg":"field required"}]}"#,
    )
    .await;

    let reply = client(&url).check_in("").await.unwrap();
    assert_eq!(
        reply,
        ServiceReply::Refused {
            status: 422,
            detail: Some(r#"[{"msg":"field required"}]"#.into())
        }
    );
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let (url, _server) = serve_once("200 OK", "<html>gateway</html>").await;

    let err = client(&url).check_in("STU123").await.unwrap_err();
    assert!(matches!(err, ServiceError::MalformedBody { status: 200, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/checkin", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&url).check_in("STU123").await.unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)));
}

#[tokio::test]
async fn test_submitter_over_http() {
    let display = Arc::new(RecordingDisplay::new());

    let (url, _server) = serve_once("200 OK", r#"{"message":"Welcome, Ada"}"#).await;
    let submitter = Submitter::new(Arc::new(client(&url)), display.clone());
    assert_eq!(
        submitter.submit("STU123").await,
        Outcome::Success("Welcome, Ada".into())
    );

    let (url, _server) = serve_once("502 Bad Gateway", "upstream down").await;
    let submitter = Submitter::new(Arc::new(client(&url)), display.clone());
    assert_eq!(
        submitter.submit("STU123").await,
        Outcome::TransportFailure("Could not connect to the server.".into())
    );

    assert_eq!(
        display.statuses().first(),
        Some(&("Processing check-in...".to_string(), false))
    );
}
