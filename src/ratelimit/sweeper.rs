//! Periodic pruning of the stored submission history.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::clock::Clock;
use super::store::RateLimitStore;
use crate::error::{DalilError, Result};
use crate::schedule::ScheduledTask;

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Keeps stored history bounded by pruning it on a fixed interval.
///
/// The sweep stops when the sweeper is stopped or dropped.
pub struct StorageSweeper {
    task: ScheduledTask,
    interval: Duration,
}

impl StorageSweeper {
    /// Start sweeping `store` every `interval`.
    ///
    /// A zero interval is a configuration error.
    pub fn start(store: RateLimitStore, clock: Arc<dyn Clock>, interval: Duration) -> Result<Self> {
        let retention_secs = store.retention().as_secs();
        let task = ScheduledTask::every(interval, move || {
            let dropped = store.sweep(clock.now_millis());
            debug!(dropped = dropped, "Periodic sweep finished");
        })
        .ok_or_else(|| DalilError::Config("sweep interval must be greater than zero".to_string()))?;

        info!(
            interval_secs = interval.as_secs(),
            retention_secs = retention_secs,
            "Starting submission history sweeper"
        );

        Ok(Self { task, interval })
    }

    /// Get the sweep interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop sweeping.
    pub fn stop(&self) {
        self.task.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::MonotonicClock;
    use crate::ratelimit::store::RateLimitWindowState;
    use crate::storage::MemoryStorage;

    const HOUR: i64 = 60 * 60 * 1_000;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_prunes_on_interval() {
        let origin = 100 * HOUR;
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::starting_at(origin));
        let store = RateLimitStore::new(Arc::new(MemoryStorage::new()));
        store.save(&RateLimitWindowState::from_millis([origin - 24 * HOUR + HOUR / 2, origin - HOUR]));

        let sweeper = StorageSweeper::start(store.clone(), clock, DEFAULT_SWEEP_INTERVAL).unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.load().len(), 2);

        tokio::time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(store.load(), RateLimitWindowState::from_millis([origin - HOUR]));

        sweeper.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_sweeper_does_not_run() {
        let origin = 100 * HOUR;
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::starting_at(origin));
        let store = RateLimitStore::new(Arc::new(MemoryStorage::new()));
        store.save(&RateLimitWindowState::from_millis([0]));

        let sweeper = StorageSweeper::start(store.clone(), clock, Duration::from_secs(1)).unwrap();
        sweeper.stop();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.load().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_interval_is_config_error() {
        let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::starting_at(0));
        let store = RateLimitStore::new(Arc::new(MemoryStorage::new()));

        let err = StorageSweeper::start(store, clock, Duration::ZERO).err().unwrap();
        assert!(matches!(err, DalilError::Config(_)));
    }
}
