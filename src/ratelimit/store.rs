//! Persisted sliding-window submission history.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::LocalStorage;

/// Storage key holding the serialized [`RateLimitWindowState`].
pub const SUBMISSIONS_KEY: &str = "dalil.form.submissions";

/// Default retention for stored submissions.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// A single accepted submission, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionRecord(pub i64);

impl SubmissionRecord {
    /// Create a record at `millis`.
    pub fn at(millis: i64) -> Self {
        Self(millis)
    }

    /// Get the epoch milliseconds of this record.
    pub fn millis(&self) -> i64 {
        self.0
    }
}

/// Submission history, oldest first after pruning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitWindowState {
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}

impl RateLimitWindowState {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history from raw epoch milliseconds.
    pub fn from_millis<I: IntoIterator<Item = i64>>(millis: I) -> Self {
        Self {
            submissions: millis.into_iter().map(SubmissionRecord).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

/// Drop every record at or before `now - retention`, and every record more
/// than `retention` ahead of `now`.
///
/// The surviving records are returned sorted ascending.
pub fn prune(state: &RateLimitWindowState, now: i64, retention: Duration) -> RateLimitWindowState {
    let retention = i64::try_from(retention.as_millis()).unwrap_or(i64::MAX);
    let cutoff = now.saturating_sub(retention);
    let horizon = now.saturating_add(retention);
    let mut submissions: Vec<SubmissionRecord> = state
        .submissions
        .iter()
        .copied()
        .filter(|record| record.0 > cutoff && record.0 <= horizon)
        .collect();
    submissions.sort_unstable();
    RateLimitWindowState { submissions }
}

/// Reads and writes the submission history through a [`LocalStorage`].
///
/// Storage failures never reach the caller: an unreadable history is treated
/// as empty and a failed write is logged and dropped, so rate limiting
/// degrades to allowing every submission.
#[derive(Clone)]
pub struct RateLimitStore {
    storage: Arc<dyn LocalStorage>,
    retention: Duration,
}

impl RateLimitStore {
    /// Create a store with the default 24 hour retention.
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self::with_retention(storage, DEFAULT_RETENTION)
    }

    /// Create a store keeping records for `retention`.
    pub fn with_retention(storage: Arc<dyn LocalStorage>, retention: Duration) -> Self {
        Self { storage, retention }
    }

    /// Get the retention horizon.
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Load the persisted history, or an empty one if absent or unparsable.
    pub fn load(&self) -> RateLimitWindowState {
        let raw = match self.storage.get(SUBMISSIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RateLimitWindowState::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read submission history, treating as empty");
                return RateLimitWindowState::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Discarding unparsable submission history");
                RateLimitWindowState::new()
            }
        }
    }

    /// Overwrite the persisted history.
    pub fn save(&self, state: &RateLimitWindowState) {
        let serialized = match serde_json::to_string(state) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize submission history");
                return;
            }
        };

        if let Err(e) = self.storage.set(SUBMISSIONS_KEY, &serialized) {
            warn!(error = %e, "Failed to persist submission history");
        }
    }

    /// Append a submission at `now`, prune to the retention horizon and persist.
    pub fn record(&self, now: i64) -> RateLimitWindowState {
        let mut state = self.load();
        state.submissions.push(SubmissionRecord(now));
        let state = prune(&state, now, self.retention);
        self.save(&state);
        debug!(at = now, stored = state.len(), "Submission recorded");
        state
    }

    /// Prune the persisted history to the retention horizon.
    ///
    /// Returns the number of records dropped.
    pub fn sweep(&self, now: i64) -> usize {
        let state = self.load();
        let pruned = prune(&state, now, self.retention);
        let dropped = state.len() - pruned.len();
        if dropped > 0 || pruned != state {
            self.save(&pruned);
        }
        debug!(dropped = dropped, kept = pruned.len(), "Submission history swept");
        dropped
    }
}

impl std::fmt::Debug for RateLimitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitStore")
            .field("retention", &self.retention)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    const MINUTE: i64 = 60_000;

    struct BrokenStorage;

    impl LocalStorage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_serialized_shape() {
        let state = RateLimitWindowState::from_millis([1, 2]);
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"submissions":[1,2]}"#);
    }

    #[test]
    fn test_prune_drops_boundary_and_sorts() {
        let now = 100 * MINUTE;
        let state = RateLimitWindowState::from_millis([now - MINUTE, now - 10 * MINUTE, now - 11 * MINUTE, now]);

        let pruned = prune(&state, now, Duration::from_secs(600));
        assert_eq!(pruned, RateLimitWindowState::from_millis([now - MINUTE, now]));
    }

    #[test]
    fn test_prune_is_idempotent() {
        let now = 50 * MINUTE;
        let retention = Duration::from_secs(300);
        let state = RateLimitWindowState::from_millis([now, now - 3 * MINUTE, now - 7 * MINUTE, now - 3 * MINUTE]);

        let once = prune(&state, now, retention);
        let twice = prune(&once, now, retention);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_prune_drops_far_future_records() {
        let now = 100 * MINUTE;
        let state = RateLimitWindowState::from_millis([i64::MAX, now + 5 * MINUTE, now]);

        let pruned = prune(&state, now, Duration::from_secs(600));
        assert_eq!(pruned, RateLimitWindowState::from_millis([now, now + 5 * MINUTE]));
        assert_eq!(prune(&pruned, now, Duration::from_secs(600)), pruned);
    }

    #[test]
    fn test_tampered_history_is_swept_away() {
        let storage = Arc::new(MemoryStorage::new());
        let max = i64::MAX;
        storage
            .set(SUBMISSIONS_KEY, &format!(r#"{{"submissions":[{max},{max},{max}]}}"#))
            .unwrap();
        let store = RateLimitStore::new(storage);

        assert_eq!(store.sweep(1_700_000_000_000), 3);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_absent_is_empty() {
        let store = RateLimitStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_garbage_is_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(SUBMISSIONS_KEY, "{submissions: oops").unwrap();

        let store = RateLimitStore::new(storage);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_record_appends_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let store = RateLimitStore::new(storage.clone());

        store.record(1_000);
        store.record(2_000);

        let reloaded = RateLimitStore::new(storage).load();
        assert_eq!(reloaded, RateLimitWindowState::from_millis([1_000, 2_000]));
    }

    #[test]
    fn test_record_prunes_to_retention() {
        let storage = Arc::new(MemoryStorage::new());
        let store = RateLimitStore::new(storage);
        let day = 24 * 60 * MINUTE;

        store.record(0);
        let state = store.record(day + 1);
        assert_eq!(state, RateLimitWindowState::from_millis([day + 1]));
    }

    #[test]
    fn test_sweep_reports_dropped() {
        let storage = Arc::new(MemoryStorage::new());
        let store = RateLimitStore::with_retention(storage, Duration::from_secs(60));
        store.save(&RateLimitWindowState::from_millis([0, 30_000, 90_000]));

        assert_eq!(store.sweep(100_000), 1);
        assert_eq!(store.load(), RateLimitWindowState::from_millis([90_000]));
        assert_eq!(store.sweep(100_000), 0);
    }

    #[test]
    fn test_broken_storage_degrades_silently() {
        let store = RateLimitStore::new(Arc::new(BrokenStorage));

        let state = store.record(5_000);
        assert_eq!(state.len(), 1);
        assert!(store.load().is_empty());
        assert_eq!(store.sweep(5_000), 0);
    }
}
