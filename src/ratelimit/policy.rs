//! Sliding-window submit eligibility.

use std::time::Duration;

use super::store::RateLimitWindowState;

/// Default number of submissions allowed per window.
const DEFAULT_MAX_MESSAGES: u32 = 3;
/// Default sliding window length.
const DEFAULT_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Limits applied to the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum submissions allowed inside the window
    pub max_messages: u32,
    /// Length of the sliding window
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Pure eligibility queries over a submission history.
///
/// A record counts while its timestamp is strictly newer than
/// `now - window`; a record sitting exactly on the boundary has expired.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitPolicy {
    config: RateLimitConfig,
}

impl RateLimitPolicy {
    /// Create a policy for `config`.
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config }
    }

    /// Get the limits this policy applies.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn window_millis(&self) -> i64 {
        self.config.window.as_millis() as i64
    }

    /// Timestamps inside the window, oldest first.
    ///
    /// Records more than one window ahead of `now` cannot come from this
    /// clock and are ignored.
    fn in_window(&self, state: &RateLimitWindowState, now: i64) -> Vec<i64> {
        let window = self.window_millis();
        let cutoff = now.saturating_sub(window);
        let horizon = now.saturating_add(window);
        let mut recent: Vec<i64> = state
            .submissions
            .iter()
            .map(|r| r.millis())
            .filter(|&t| t > cutoff && t <= horizon)
            .collect();
        recent.sort_unstable();
        recent
    }

    /// Number of submissions inside the window.
    pub fn count_in_window(&self, state: &RateLimitWindowState, now: i64) -> u32 {
        self.in_window(state, now).len() as u32
    }

    /// Whether another submission is allowed at `now`.
    pub fn can_submit(&self, state: &RateLimitWindowState, now: i64) -> bool {
        self.count_in_window(state, now) < self.config.max_messages
    }

    /// Whole seconds until the oldest in-window submission expires, or 0 if
    /// a submission is allowed now.
    pub fn remaining_cooldown_seconds(&self, state: &RateLimitWindowState, now: i64) -> u64 {
        let recent = self.in_window(state, now);
        if (recent.len() as u32) < self.config.max_messages {
            return 0;
        }

        let Some(&oldest) = recent.first() else {
            return 0;
        };

        let remaining_ms = oldest
            .saturating_add(self.window_millis())
            .saturating_sub(now);
        if remaining_ms <= 0 {
            0
        } else {
            remaining_ms.saturating_add(999) as u64 / 1000
        }
    }

    /// Submissions still available inside the current window.
    pub fn remaining_quota(&self, state: &RateLimitWindowState, now: i64) -> u32 {
        self.config
            .max_messages
            .saturating_sub(self.count_in_window(state, now))
    }
}
