//! Timed status transitions for the contact form.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::message::{countdown_label, StatusMessage, SUBMIT_LABEL};
use super::view::StatusView;
use crate::config::FormConfig;
use crate::schedule::ScheduledTask;

/// Re-evaluates the rate-limit gate, returning the cooldown left in seconds.
pub type CooldownGate = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Delays applied by [`StatusPresenter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenterTimings {
    pub success_clear: Duration,
    pub reset_delay: Duration,
    pub error_clear: Duration,
    pub info_clear: Duration,
    pub countdown_tick: Duration,
}

impl Default for PresenterTimings {
    fn default() -> Self {
        Self::from(&FormConfig::default())
    }
}

impl From<&FormConfig> for PresenterTimings {
    fn from(config: &FormConfig) -> Self {
        Self {
            success_clear: Duration::from_millis(config.success_clear_ms),
            reset_delay: Duration::from_millis(config.reset_delay_ms),
            error_clear: Duration::from_millis(config.error_clear_ms),
            info_clear: Duration::from_millis(config.info_clear_ms),
            countdown_tick: Duration::from_millis(config.countdown_tick_ms),
        }
    }
}

/// The view plus the message it currently shows.
#[derive(Clone)]
struct Display {
    view: Arc<dyn StatusView>,
    current: Arc<RwLock<Option<StatusMessage>>>,
}

impl Display {
    fn show(&self, message: StatusMessage) {
        self.view.show(&message);
        *self.current.write() = Some(message);
    }

    fn clear(&self) {
        self.view.clear();
        *self.current.write() = None;
    }

    fn block(&self, remaining: u64) {
        self.show(StatusMessage::rate_limited(remaining));
        self.view.set_submit_label(&countdown_label(remaining));
        self.view.set_submit_enabled(false);
    }

    fn unblock(&self) {
        self.clear();
        self.view.set_submit_label(SUBMIT_LABEL);
        self.view.set_submit_enabled(true);
    }

    /// Clear whatever is shown once `delay` has passed.
    async fn clear_after(self, delay: Duration) {
        tokio::time::sleep(delay).await;
        self.clear();
    }
}

/// Drives the status line and submit control through their timed states.
///
/// Every new state replaces the pending clear of the previous one. Timers
/// run on the tokio runtime and are cancelled by [`StatusPresenter::shutdown`]
/// or when the presenter is dropped.
pub struct StatusPresenter {
    display: Display,
    timings: PresenterTimings,
    message_timer: Mutex<Option<ScheduledTask>>,
    reset_timer: Mutex<Option<ScheduledTask>>,
    countdown: Mutex<Option<ScheduledTask>>,
}

impl StatusPresenter {
    /// Create a presenter rendering into `view`.
    pub fn new(view: Arc<dyn StatusView>, timings: PresenterTimings) -> Self {
        Self {
            display: Display {
                view,
                current: Arc::new(RwLock::new(None)),
            },
            timings,
            message_timer: Mutex::new(None),
            reset_timer: Mutex::new(None),
            countdown: Mutex::new(None),
        }
    }

    /// Get the configured delays.
    pub fn timings(&self) -> &PresenterTimings {
        &self.timings
    }

    /// The message on screen, if any.
    pub fn current(&self) -> Option<StatusMessage> {
        self.display.current.read().clone()
    }

    /// Whether a rate-limit countdown is running.
    pub fn is_counting_down(&self) -> bool {
        self.countdown
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn replace_message_timer(&self, task: Option<ScheduledTask>) {
        *self.message_timer.lock() = task;
    }

    fn cancel_reset(&self) {
        self.reset_timer.lock().take();
    }

    fn show_then_clear(&self, message: StatusMessage, after: Duration) {
        self.display.show(message);
        let clear = self.display.clone().clear_after(after);
        self.replace_message_timer(Some(ScheduledTask::spawn(clear)));
    }

    /// Request in progress: disable the control, no auto-clear.
    pub fn present_sending(&self) {
        self.cancel_reset();
        self.replace_message_timer(None);
        self.display.show(StatusMessage::sending());
        self.display.view.set_submit_enabled(false);
    }

    /// Delivered: confirm, reset the fields, then optionally show the
    /// remaining quota before clearing.
    pub fn present_success(&self, remaining_quota: Option<u32>) {
        self.display.show(StatusMessage::success());
        self.display.view.set_submit_enabled(true);

        let view = self.display.view.clone();
        *self.reset_timer.lock() =
            Some(ScheduledTask::after(self.timings.reset_delay, move || view.reset_fields()));

        let display = self.display.clone();
        let timings = self.timings;
        self.replace_message_timer(Some(ScheduledTask::spawn(async move {
            tokio::time::sleep(timings.success_clear).await;
            match remaining_quota {
                Some(remaining) => {
                    display.show(StatusMessage::quota(remaining));
                    display.clear_after(timings.info_clear).await;
                }
                None => display.clear(),
            }
        })));
    }

    /// Validation or network failure; the control stays usable.
    pub fn present_error(&self, message: StatusMessage) {
        self.cancel_reset();
        self.display.view.set_submit_enabled(true);
        self.show_then_clear(message, self.timings.error_clear);
    }

    /// Show the cooldown and count it down once per tick.
    ///
    /// When `gate` reports no cooldown left the control is re-enabled; if the
    /// gate is still closed the countdown continues with the new value.
    pub fn present_rate_limited(&self, cooldown_seconds: u64, gate: CooldownGate) {
        self.cancel_reset();
        self.replace_message_timer(None);
        if cooldown_seconds == 0 {
            self.display.unblock();
            *self.countdown.lock() = None;
            return;
        }

        debug!(cooldown_seconds = cooldown_seconds, "Starting cooldown countdown");
        self.display.block(cooldown_seconds);

        let display = self.display.clone();
        let tick = self.timings.countdown_tick;
        *self.countdown.lock() = Some(ScheduledTask::spawn(async move {
            loop {
                tokio::time::sleep(tick).await;
                let remaining = gate();
                if remaining == 0 {
                    debug!("Cooldown elapsed, submit re-enabled");
                    display.unblock();
                    break;
                }
                display.block(remaining);
            }
        }));
    }

    /// Clear the message and cancel its timer.
    pub fn clear(&self) {
        self.cancel_reset();
        self.replace_message_timer(None);
        self.display.clear();
    }

    /// Cancel every pending timer.
    pub fn shutdown(&self) {
        self.message_timer.lock().take();
        self.reset_timer.lock().take();
        self.countdown.lock().take();
    }
}

impl std::fmt::Debug for StatusPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPresenter")
            .field("timings", &self.timings)
            .field("current", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ValidationError;
    use crate::presenter::message::StatusCategory;
    use crate::presenter::view::{RecordingView, ViewEvent};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn presenter() -> (Arc<RecordingView>, StatusPresenter) {
        let view = Arc::new(RecordingView::default());
        let presenter = StatusPresenter::new(view.clone(), PresenterTimings::default());
        (view, presenter)
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn category(presenter: &StatusPresenter) -> Option<StatusCategory> {
        presenter.current().map(|m| m.category)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sending_is_not_cleared() {
        let (view, presenter) = presenter();
        presenter.present_sending();

        sleep_ms(60_000).await;
        assert_eq!(category(&presenter), Some(StatusCategory::Sending));
        assert_eq!(view.last_enabled(), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_timeline() {
        let (view, presenter) = presenter();
        presenter.present_sending();
        presenter.present_success(Some(2));
        assert_eq!(category(&presenter), Some(StatusCategory::Success));
        assert_eq!(view.last_enabled(), Some(true));

        sleep_ms(1_900).await;
        assert_eq!(view.count(&ViewEvent::ResetFields), 0);
        sleep_ms(200).await;
        assert_eq!(view.count(&ViewEvent::ResetFields), 1);
        assert_eq!(category(&presenter), Some(StatusCategory::Success));

        sleep_ms(3_000).await;
        assert_eq!(category(&presenter), Some(StatusCategory::Info));

        sleep_ms(2_800).await;
        assert_eq!(presenter.current(), Some(StatusMessage::quota(2)));
        sleep_ms(200).await;
        assert_eq!(presenter.current(), None);
        assert_eq!(
            view.shown(),
            vec![StatusMessage::sending(), StatusMessage::success(), StatusMessage::quota(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_without_quota_clears_after_delay() {
        let (_view, presenter) = presenter();
        presenter.present_success(None);

        sleep_ms(4_900).await;
        assert_eq!(category(&presenter), Some(StatusCategory::Success));
        sleep_ms(200).await;
        assert_eq!(presenter.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_clears_after_delay() {
        let (view, presenter) = presenter();
        presenter.present_error(StatusMessage::network_failed(false));

        sleep_ms(4_900).await;
        assert_eq!(category(&presenter), Some(StatusCategory::Error));
        sleep_ms(200).await;
        assert_eq!(presenter.current(), None);
        assert_eq!(view.last_enabled(), Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_state_cancels_pending_clear() {
        let (_view, presenter) = presenter();
        presenter.present_error(StatusMessage::network_failed(true));
        sleep_ms(4_000).await;

        presenter.present_sending();
        sleep_ms(2_000).await;
        assert_eq!(category(&presenter), Some(StatusCategory::Sending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_after_success_keeps_fields() {
        let (view, presenter) = presenter();
        presenter.present_success(Some(2));
        sleep_ms(1_000).await;

        presenter.present_error(StatusMessage::invalid(&ValidationError::InvalidEmail));
        sleep_ms(5_100).await;
        assert_eq!(view.count(&ViewEvent::ResetFields), 0);
        assert_eq!(presenter.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sending_after_success_keeps_fields() {
        let (view, presenter) = presenter();
        presenter.present_success(None);
        sleep_ms(500).await;

        presenter.present_sending();
        sleep_ms(3_000).await;
        assert_eq!(view.count(&ViewEvent::ResetFields), 0);
        assert_eq!(category(&presenter), Some(StatusCategory::Sending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_ticks_and_unblocks() {
        let (view, presenter) = presenter();
        let remaining = Arc::new(AtomicU64::new(3));
        let source = remaining.clone();
        let gate: CooldownGate = Arc::new(move || {
            let left = source.load(Ordering::SeqCst).saturating_sub(1);
            source.store(left, Ordering::SeqCst);
            left
        });

        presenter.present_rate_limited(3, gate);
        assert_eq!(category(&presenter), Some(StatusCategory::RateLimited));
        assert_eq!(view.last_label().as_deref(), Some("انتظر 0:03"));
        assert_eq!(view.last_enabled(), Some(false));
        assert!(presenter.is_counting_down());

        sleep_ms(1_100).await;
        assert_eq!(view.last_label().as_deref(), Some("انتظر 0:02"));

        sleep_ms(1_000).await;
        assert_eq!(view.last_label().as_deref(), Some("انتظر 0:01"));

        sleep_ms(1_000).await;
        assert_eq!(presenter.current(), None);
        assert_eq!(view.last_label().as_deref(), Some(SUBMIT_LABEL));
        assert_eq!(view.last_enabled(), Some(true));
        assert!(!presenter.is_counting_down());

        let labels_before = view.events().len();
        sleep_ms(5_000).await;
        assert_eq!(view.events().len(), labels_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_countdown() {
        let (view, presenter) = presenter();
        let gate: CooldownGate = Arc::new(|| 100);
        presenter.present_rate_limited(100, gate);

        presenter.shutdown();
        let events = view.events().len();
        sleep_ms(10_000).await;
        assert_eq!(view.events().len(), events);
        assert!(!presenter.is_counting_down());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_cooldown_unblocks_immediately() {
        let (view, presenter) = presenter();
        presenter.present_rate_limited(0, Arc::new(|| 0));
        assert_eq!(presenter.current(), None);
        assert_eq!(view.last_enabled(), Some(true));
    }
}
