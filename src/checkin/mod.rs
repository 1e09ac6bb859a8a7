//! Scan-to-submission state machine.
//!
//! This module holds the only decision logic in the kiosk: for each decoded
//! code it decides whether to drop it, warn about it, or submit it, and it
//! reconciles the result with the session registry.
//!
//! # Architecture
//!
//! * [`filter`]: global cooldown plus duplicate detection ([`CooldownFilter`]).
//! * [`registry`]: identifiers checked in during this session ([`SessionRegistry`]).
//! * [`submitter`]: one attempt against the verification service ([`Submitter`]).
//! * [`service`]: the HTTP verification service client ([`HttpCheckInService`]).
//! * [`orchestrator`]: composition of the above ([`Orchestrator`]).
//!
//! # Flow
//!
//! ```text
//! Received -> Filtered -> Dropped
//!                      -> Submitting -> Registered | Rejected | Failed
//! ```

pub mod filter;
pub mod orchestrator;
pub mod registry;
pub mod service;
pub mod submitter;

pub use filter::{CooldownFilter, Decision, DEFAULT_SCAN_COOLDOWN};
pub use orchestrator::{Orchestrator, ScanState};
pub use registry::{SessionEntry, SessionRegistry};
pub use service::{HttpCheckInService, ServiceError};
pub use submitter::{CheckInService, Outcome, ServiceReply, Submitter};

/// Opaque identifier extracted from a scanned code.
///
/// No format validation happens locally; the verification service decides
/// whether an identifier is known.
pub type Identifier = String;
