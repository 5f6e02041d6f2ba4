//! Status presentation for the contact form.
//!
//! Maps submission outcomes to status messages and owns the timers that
//! clear them, drawing through a [`StatusView`] so the state machine can be
//! exercised without a browser.

mod message;
mod status;
mod view;

pub use message::{cooldown_minutes, countdown_label, StatusCategory, StatusMessage, SUBMIT_LABEL};
pub use status::{CooldownGate, PresenterTimings, StatusPresenter};
pub use view::{ConsoleView, StatusView};

#[cfg(test)]
pub(crate) use view::{RecordingView, ViewEvent};
