//! Client-side rate limiting of form submissions.

mod clock;
mod policy;
mod store;
mod sweeper;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use policy::{RateLimitConfig, RateLimitPolicy};
pub use store::{
    prune, RateLimitStore, RateLimitWindowState, SubmissionRecord, DEFAULT_RETENTION,
    SUBMISSIONS_KEY,
};
pub use sweeper::{StorageSweeper, DEFAULT_SWEEP_INTERVAL};
