//! Contact form submission state machine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::input::{FormInput, ValidationError};
use super::transport::{FormSubmission, FormTransport};
use crate::presenter::{CooldownGate, StatusMessage, StatusPresenter};
use crate::ratelimit::{Clock, RateLimitPolicy, RateLimitStore};

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The rate limit is exhausted; nothing was sent
    Blocked { cooldown_seconds: u64 },
    /// A field was missing or malformed; nothing was sent
    Invalid(ValidationError),
    /// Delivered, or a bot was quietly told it was
    Sent,
    /// The endpoint could not be reached or refused the submission
    NetworkFailed { connectivity: bool },
    /// Another submission from this form is still in flight
    InFlight,
}

/// Where the form is in its submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Blocked,
    Rejected,
    Sending,
    Succeeded,
    Failed,
}

/// Rate-limit status of the form at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateStatus {
    pub can_submit: bool,
    pub remaining_quota: u32,
    pub cooldown_seconds: u64,
}

/// Clears the in-flight flag when the attempt ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Validates, rate limits and sends contact form submissions.
///
/// At most one submission per controller is in flight; a submission is
/// recorded against the rate limit only after the endpoint accepts it.
pub struct FormSubmissionController<T: FormTransport> {
    form_name: String,
    policy: RateLimitPolicy,
    store: RateLimitStore,
    transport: Arc<T>,
    clock: Arc<dyn Clock>,
    presenter: Arc<StatusPresenter>,
    state: RwLock<FormState>,
    in_flight: AtomicBool,
}

impl<T: FormTransport> FormSubmissionController<T> {
    /// Create a controller posting `form_name` submissions through `transport`.
    pub fn new(
        form_name: impl Into<String>,
        policy: RateLimitPolicy,
        store: RateLimitStore,
        transport: Arc<T>,
        clock: Arc<dyn Clock>,
        presenter: Arc<StatusPresenter>,
    ) -> Self {
        Self {
            form_name: form_name.into(),
            policy,
            store,
            transport,
            clock,
            presenter,
            state: RwLock::new(FormState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Get the current form state.
    pub fn state(&self) -> FormState {
        *self.state.read()
    }

    /// Get the presenter driving the status line.
    pub fn presenter(&self) -> &Arc<StatusPresenter> {
        &self.presenter
    }

    fn transition(&self, next: FormState) {
        let mut state = self.state.write();
        debug!(from = ?*state, to = ?next, "Form state transition");
        *state = next;
    }

    /// Current rate-limit status, without side effects.
    pub fn check_gate(&self) -> GateStatus {
        let now = self.clock.now_millis();
        let state = self.store.load();
        GateStatus {
            can_submit: self.policy.can_submit(&state, now),
            remaining_quota: self.policy.remaining_quota(&state, now),
            cooldown_seconds: self.policy.remaining_cooldown_seconds(&state, now),
        }
    }

    /// Show the countdown if the form is already rate limited, e.g. on page
    /// load.
    pub fn refresh_gate(&self) -> GateStatus {
        let gate = self.check_gate();
        if !gate.can_submit {
            self.transition(FormState::Blocked);
            self.presenter
                .present_rate_limited(gate.cooldown_seconds, self.cooldown_gate());
        }
        gate
    }

    fn cooldown_gate(&self) -> CooldownGate {
        let policy = self.policy;
        let store = self.store.clone();
        let clock = self.clock.clone();
        Arc::new(move || policy.remaining_cooldown_seconds(&store.load(), clock.now_millis()))
    }

    /// Run one submission attempt through validation, the rate limit and the
    /// transport.
    #[instrument(skip(self, input), fields(form = %self.form_name, attempt = %Uuid::new_v4()))]
    pub async fn submit(&self, input: FormInput) -> SubmissionOutcome {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("Submission ignored, another one is in flight");
            return SubmissionOutcome::InFlight;
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.transition(FormState::Validating);

        if input.is_bot() {
            info!("Honeypot field filled, reporting success without sending");
            self.transition(FormState::Succeeded);
            self.presenter.present_success(None);
            return SubmissionOutcome::Sent;
        }

        let valid = match input.validate() {
            Ok(valid) => valid,
            Err(e) => {
                debug!(reason = %e, "Submission rejected");
                return self.fail(FormState::Rejected, SubmissionOutcome::Invalid(e));
            }
        };

        let gate = self.check_gate();
        if !gate.can_submit {
            info!(cooldown_seconds = gate.cooldown_seconds, "Submission rate limited");
            self.transition(FormState::Blocked);
            self.presenter
                .present_rate_limited(gate.cooldown_seconds, self.cooldown_gate());
            return SubmissionOutcome::Blocked {
                cooldown_seconds: gate.cooldown_seconds,
            };
        }

        self.transition(FormState::Sending);
        self.presenter.present_sending();

        let submission = FormSubmission {
            form_name: self.form_name.clone(),
            name: valid.name,
            email: valid.email,
            message: valid.message,
        };

        match self.transport.send(&submission).await {
            Ok(status) => {
                let now = self.clock.now_millis();
                let recorded = self.store.record(now);
                let remaining = self.policy.remaining_quota(&recorded, now);
                info!(status = status, remaining_quota = remaining, "Submission delivered");

                self.transition(FormState::Succeeded);
                self.presenter
                    .present_success((remaining > 0).then_some(remaining));
                SubmissionOutcome::Sent
            }
            Err(e) => {
                warn!(error = %e, "Submission failed");
                let connectivity = e.is_connectivity();
                self.fail(FormState::Failed, SubmissionOutcome::NetworkFailed { connectivity })
            }
        }
    }

    /// Enter a failure state and show the message for `outcome`.
    fn fail(&self, state: FormState, outcome: SubmissionOutcome) -> SubmissionOutcome {
        self.transition(state);
        if let Some(message) = StatusMessage::for_outcome(&outcome) {
            self.presenter.present_error(message);
        }
        outcome
    }
}

impl<T: FormTransport> std::fmt::Debug for FormSubmissionController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSubmissionController")
            .field("form_name", &self.form_name)
            .field("policy", &self.policy)
            .field("state", &self.state())
            .finish()
    }
}
