//! # Time sources for the engine.
//!
//! The cooldown guard needs a monotonic instant and the ledger needs a calendar
//! date. Both come from a [`Clock`] so the engine stays synchronously testable.
//!
//! - [`SystemClock`]: `Instant::now()` and the local calendar date.
//! - [`ManualClock`]: a fixed origin advanced explicitly by tests.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{Days, Local, NaiveDate};

/// Source of monotonic time and of "today".
pub trait Clock: Send + Sync + 'static {
    /// Monotonic instant used for deadlines.
    fn now(&self) -> Instant;

    /// Calendar date used for ledger records.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use chrono::NaiveDate;
/// use lineup::{Clock, ManualClock};
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let clock = ManualClock::new(day);
/// let t0 = clock.now();
/// clock.advance(Duration::from_secs(10));
/// assert_eq!(clock.now() - t0, Duration::from_secs(10));
///
/// clock.advance_days(2);
/// assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
/// ```
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed_ms: AtomicU64,
    day: NaiveDate,
    day_offset: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            origin: Instant::now(),
            elapsed_ms: AtomicU64::new(0),
            day: today,
            day_offset: AtomicI64::new(0),
        }
    }

    /// Moves the monotonic clock forward.
    pub fn advance(&self, by: Duration) {
        let ms = by.as_millis().min(u128::from(u64::MAX)) as u64;
        self.elapsed_ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Moves the calendar forward by `days`.
    pub fn advance_days(&self, days: i64) {
        self.day_offset.fetch_add(days, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.elapsed_ms.load(Ordering::Relaxed))
    }

    fn today(&self) -> NaiveDate {
        let offset = self.day_offset.load(Ordering::Relaxed);
        let shifted = if offset >= 0 {
            self.day.checked_add_days(Days::new(offset.unsigned_abs()))
        } else {
            self.day.checked_sub_days(Days::new(offset.unsigned_abs()))
        };
        shifted.unwrap_or(self.day)
    }
}
