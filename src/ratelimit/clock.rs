//! Time sources for rate limiting, in epoch milliseconds.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;

/// A source of the current time as epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Wall-clock time sampled once, then advanced by tokio's monotonic clock.
///
/// Timers and timestamps move together, including under a paused tokio
/// runtime.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin_millis: i64,
    started: tokio::time::Instant,
}

impl MonotonicClock {
    /// Create a clock anchored to the current wall time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now().timestamp_millis())
    }

    /// A clock reading `origin_millis` right now.
    pub fn starting_at(origin_millis: i64) -> Self {
        Self {
            origin_millis,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> i64 {
        self.origin_millis + self.started.elapsed().as_millis() as i64
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `now_millis`.
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    /// Move the clock to `now_millis`.
    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(1_000);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now_millis(), 1_250);
        clock.set(0);
        assert_eq!(clock.now_millis(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monotonic_clock_follows_tokio_time() {
        let clock = MonotonicClock::starting_at(10_000);
        assert_eq!(clock.now_millis(), 10_000);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(clock.now_millis(), 13_000);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
