//! Single-attempt submission of an accepted identifier.

use std::sync::Arc;

use async_trait::async_trait;

use super::service::ServiceError;
use crate::display::StatusNotifier;

/// Notice shown before the network call starts.
pub const PROCESSING_MESSAGE: &str = "Processing check-in...";

/// Confirmation used when the service accepts without a `message`.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Check-in successful";

/// Detail used when the service refuses without a `detail`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Text shown for every transport or parse failure.
pub const CONNECTION_ERROR_MESSAGE: &str = "Could not connect to the server.";

/// What the verification service answered, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceReply {
    /// The service reported success.
    Accepted {
        /// Human-readable confirmation, if the body carried one.
        message: Option<String>,
    },
    /// The service reported failure.
    Refused {
        /// HTTP status (or equivalent) of the refusal.
        status: u16,
        /// Human-readable detail, if the body carried one.
        detail: Option<String>,
    },
}

/// Remote verification service.
///
/// Implementations make exactly one attempt and never retry.
#[async_trait]
pub trait CheckInService: Send + Sync {
    /// Ask the service to check in `identifier`.
    async fn check_in(&self, identifier: &str) -> Result<ServiceReply, ServiceError>;

    /// Short description for logs, such as the endpoint URL.
    fn describe(&self) -> String {
        "verification service".to_string()
    }
}

/// Interpreted result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Checked in; carries the confirmation text.
    Success(String),
    /// The service refused; carries its detail or the generic fallback.
    Rejected(String),
    /// The service could not be reached or answered garbage.
    TransportFailure(String),
}

/// Sends accepted identifiers to a [`CheckInService`].
///
/// Cheap to clone so each submission can run on its own task. The submitter
/// never touches the session registry; recording a success is the caller's
/// job.
#[derive(Clone)]
pub struct Submitter {
    service: Arc<dyn CheckInService>,
    notifier: Arc<dyn StatusNotifier>,
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("service", &self.service.describe())
            .field("notifier", &"<notifier>")
            .finish()
    }
}

impl Submitter {
    /// Create a submitter for `service` that reports progress to `notifier`.
    pub fn new(service: Arc<dyn CheckInService>, notifier: Arc<dyn StatusNotifier>) -> Self {
        Self { service, notifier }
    }

    /// Submit `identifier` once and interpret the reply.
    pub async fn submit(&self, identifier: &str) -> Outcome {
        self.notifier.show(PROCESSING_MESSAGE, false);
        log::debug!(
            "Submitting {} to {}",
            identifier,
            self.service.describe()
        );

        match self.service.check_in(identifier).await {
            Ok(ServiceReply::Accepted { message }) => {
                Outcome::Success(message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()))
            }
            Ok(ServiceReply::Refused { status, detail }) => {
                log::debug!("Service refused {} with status {}", identifier, status);
                Outcome::Rejected(detail.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()))
            }
            Err(e) => {
                log::error!("Failed to reach the verification service: {}", e);
                Outcome::TransportFailure(CONNECTION_ERROR_MESSAGE.to_string())
            }
        }
    }
}
