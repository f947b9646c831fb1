//! Timestamp utilities and the clock abstraction
//!
//! Wall-clock timestamps (`chrono`) are used for event metadata. Listening time is measured
//! against a monotonic [`Clock`] so that system clock adjustments never distort a segment.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Convert a duration to whole milliseconds, saturating at `u64::MAX`
pub fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by `std::time::Instant::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests
///
/// Starts at the instant it was created and only moves when [`ManualClock::advance`] is called.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Instant::now()),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Move the clock forward by `millis` milliseconds
    pub fn advance_ms(&self, millis: u64) {
        self.advance(millis_to_duration(millis));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[tokio::test]
    async fn test_now_successive_calls_advance() {
        let time1 = now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let time2 = now();
        assert!(time2 > time1);
    }

    #[test]
    fn test_millis_to_duration_one_second() {
        let duration = millis_to_duration(1000);
        assert_eq!(duration, Duration::from_secs(1));
    }

    #[test]
    fn test_duration_to_millis_truncates_sub_millisecond() {
        assert_eq!(duration_to_millis(Duration::from_micros(1_999)), 1);
        assert_eq!(duration_to_millis(Duration::ZERO), 0);
    }

    #[test]
    fn test_duration_to_millis_saturates() {
        assert_eq!(duration_to_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        let start = clock.now();
        assert_eq!(clock.now(), start);

        clock.advance_ms(250);
        assert_eq!(clock.now() - start, Duration::from_millis(250));

        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now() - start, Duration::from_millis(2_250));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
