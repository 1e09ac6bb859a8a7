//! Cooldown and duplicate filtering of decoded scans.
//!
//! A decoder holding a code in view fires many times per second. The filter
//! keeps one global "last scan" instant and lets at most one scan through per
//! cooldown window, whatever the identifier. Scans that do get through are
//! then checked against the session registry.

use std::time::{Duration, Instant};

use super::registry::SessionRegistry;

/// Default minimum interval between two admitted scans.
pub const DEFAULT_SCAN_COOLDOWN: Duration = Duration::from_millis(3000);

/// Classification of a single scan event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The identifier is new and the cooldown has elapsed.
    Proceed,
    /// A previous scan was admitted less than one cooldown ago.
    SuppressedByCooldown,
    /// The identifier is already checked in during this session.
    SuppressedAsDuplicate,
}

impl Decision {
    /// Whether this decision leads to a submission.
    #[must_use]
    pub fn proceeds(self) -> bool {
        matches!(self, Self::Proceed)
    }
}

/// Global cooldown state plus the duplicate check.
#[derive(Debug, Clone)]
pub struct CooldownFilter {
    cooldown: Duration,
    last_scan: Option<Instant>,
}

impl CooldownFilter {
    /// Create a filter with the given cooldown window.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_scan: None,
        }
    }

    /// The configured cooldown window.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Instant of the last scan that got past the cooldown check.
    #[must_use]
    pub fn last_scan(&self) -> Option<Instant> {
        self.last_scan
    }

    /// Classify a scan of `identifier` observed at `now`.
    ///
    /// The cooldown slot is consumed as soon as a scan passes the cooldown
    /// check, before the duplicate check. A duplicate therefore still blocks
    /// every other identifier for one window.
    pub fn admit(&mut self, identifier: &str, now: Instant, registry: &SessionRegistry) -> Decision {
        if let Some(last) = self.last_scan {
            // An instant before `last` counts as no time elapsed.
            if now.saturating_duration_since(last) < self.cooldown {
                return Decision::SuppressedByCooldown;
            }
        }
        self.last_scan = Some(now);

        if registry.contains(identifier) {
            Decision::SuppressedAsDuplicate
        } else {
            Decision::Proceed
        }
    }
}

impl Default for CooldownFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_COOLDOWN)
    }
}
