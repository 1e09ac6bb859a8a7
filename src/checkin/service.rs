//! HTTP client for the remote verification service.
//!
//! # Wire format
//!
//! ```text
//! POST <endpoint>
//! Content-Type: application/json
//!
//! {"student_id": "<identifier>"}
//! ```
//!
//! A 2xx answer carries `{"message": "..."}`; anything else may carry
//! `{"detail": "..."}`. A body that is not JSON is treated like a dropped
//! connection.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::submitter::{CheckInService, ServiceReply};

/// Failure to obtain an interpretable reply from the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("malformed response body (status {status}): {source}")]
    MalformedBody {
        /// HTTP status of the response.
        status: u16,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
struct CheckInRequest<'a> {
    student_id: &'a str,
}

/// [`CheckInService`] speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCheckInService {
    client: Client,
    endpoint: Url,
}

impl HttpCheckInService {
    /// Build a client for `endpoint`.
    ///
    /// `timeout` bounds the whole request; `None` leaves only the
    /// transport's own limits in place.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CheckInService for HttpCheckInService {
    async fn check_in(&self, identifier: &str) -> Result<ServiceReply, ServiceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&CheckInRequest {
                student_id: identifier,
            })
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|source| ServiceError::MalformedBody {
                status: status.as_u16(),
                source,
            })?;

        log::trace!("Service answered {} with {}", status, body);

        if status.is_success() {
            Ok(ServiceReply::Accepted {
                message: text_field(&body, "message"),
            })
        } else {
            Ok(ServiceReply::Refused {
                status: status.as_u16(),
                detail: text_field(&body, "detail"),
            })
        }
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}

/// Read a human-readable field from a JSON object.
///
/// Strings are used verbatim. Structured values (FastAPI-style validation
/// errors put a list under `detail`) are rendered as compact JSON. Missing,
/// null, or empty values yield `None`.
fn text_field(body: &Value, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
