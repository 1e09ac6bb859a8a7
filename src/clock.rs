//! Time sources for the check-in core.
//!
//! The cooldown filter works on monotonic [`Instant`]s while the session
//! registry stores a human-readable local time. Both come from a [`Clock`] so
//! tests can drive time explicitly with [`ManualClock`].

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Current monotonic instant, used for cooldown decisions.
    fn now(&self) -> Instant;

    /// Current local wall-clock time, used for display timestamps.
    fn local_now(&self) -> DateTime<Local>;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Whether chrono can render timestamps with `format`.
///
/// Rendering with an unknown specifier such as `%Q` fails at format time,
/// so formats are checked before they are used.
#[must_use]
pub fn is_valid_time_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Manually advanced clock.
///
/// Both the monotonic and the wall-clock readings start at the moment of
/// construction and only move when [`ManualClock::advance`] or
/// [`ManualClock::set_elapsed`] is called.
///
/// # Example
///
/// ```
/// use checkin_kiosk::clock::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(500));
/// assert_eq!(clock.now() - start, Duration::from_millis(500));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Local>,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current moment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_wall_time(Local::now())
    }

    /// Create a clock whose wall-clock reading starts at `wall_origin`.
    #[must_use]
    pub fn with_wall_time(wall_origin: DateTime<Local>) -> Self {
        Self {
            origin: Instant::now(),
            wall_origin,
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }

    /// Put the clock at exactly `elapsed` after its origin.
    pub fn set_elapsed(&self, elapsed: Duration) {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner()) = elapsed;
    }

    /// The instant the clock started at.
    #[must_use]
    pub fn origin(&self) -> Instant {
        self.origin
    }

    fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn local_now(&self) -> DateTime<Local> {
        let elapsed = chrono::Duration::from_std(self.elapsed()).unwrap_or(chrono::Duration::zero());
        self.wall_origin + elapsed
    }
}
