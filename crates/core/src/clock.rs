//! Time source for record timestamps.
//!
//! Stores take a [`Clock`] instead of calling `Utc::now()` directly so tests
//! can control time and assert on exact timestamps.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// A source of the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant (may go backwards).
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.lock() = instant;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned clock still holds a valid instant.
        self.now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

/// Next `updated_at` for a record last stamped at `previous`.
///
/// Returns `now` unless the clock has not moved past `previous` (coarse
/// clocks, or a clock set backwards), in which case it returns
/// `previous + 1µs` so `updated_at` strictly increases per record.
#[must_use]
pub fn next_timestamp(now: DateTime<Utc>, previous: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    if now < floor { floor } else { now }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 25, 9, 30, 0).single().unwrap_or_default()
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(start());
        assert_eq!(clock.now(), start());
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start() + Duration::seconds(90));
    }

    #[test]
    fn test_next_timestamp_uses_now_when_later() {
        let later = start() + Duration::seconds(1);
        assert_eq!(next_timestamp(later, start()), later);
    }

    #[test]
    fn test_next_timestamp_is_strictly_increasing() {
        assert_eq!(
            next_timestamp(start(), start()),
            start() + Duration::microseconds(1)
        );
        let earlier = start() - Duration::hours(1);
        assert!(next_timestamp(earlier, start()) > start());
    }
}
