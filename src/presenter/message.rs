//! Status messages shown next to the contact form.

use serde::Serialize;

use crate::form::{SubmissionOutcome, ValidationError};

/// Label of the submit control when idle.
pub const SUBMIT_LABEL: &str = "إرسال الرسالة";

/// Visual category of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    Info,
    Sending,
    Success,
    Error,
    RateLimited,
}

/// A rendered status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub category: StatusCategory,
    pub text: String,
}

impl StatusMessage {
    /// Create a message of `category` with `text`.
    pub fn new(category: StatusCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }

    /// Shown while the request is in flight.
    pub fn sending() -> Self {
        Self::new(StatusCategory::Sending, "جاري الإرسال...")
    }

    /// Shown once the endpoint accepted the submission.
    pub fn success() -> Self {
        Self::new(
            StatusCategory::Success,
            "تم إرسال رسالتك بنجاح! شكراً لتواصلك معنا.",
        )
    }

    /// Validation failure for `error`.
    pub fn invalid(error: &ValidationError) -> Self {
        let text = match error {
            ValidationError::MissingField(_) => "يرجى ملء جميع الحقول المطلوبة",
            ValidationError::InvalidEmail => "يرجى إدخال بريد إلكتروني صحيح",
        };
        Self::new(StatusCategory::Error, text)
    }

    /// Delivery failure; `connectivity` selects the offline wording.
    pub fn network_failed(connectivity: bool) -> Self {
        let text = if connectivity {
            "تعذر الاتصال بالخادم. تحقق من اتصالك بالإنترنت وحاول مرة أخرى."
        } else {
            "حدث خطأ أثناء إرسال الرسالة. يرجى المحاولة مرة أخرى."
        };
        Self::new(StatusCategory::Error, text)
    }

    /// Cooldown notice, in whole minutes rounded up.
    pub fn rate_limited(cooldown_seconds: u64) -> Self {
        Self::new(
            StatusCategory::RateLimited,
            format!(
                "لقد تجاوزت الحد المسموح من الرسائل. يرجى المحاولة بعد {} دقيقة.",
                cooldown_minutes(cooldown_seconds)
            ),
        )
    }

    /// Remaining quota notice.
    pub fn quota(remaining: u32) -> Self {
        Self::new(
            StatusCategory::Info,
            format!("يمكنك إرسال {} رسائل أخرى خلال العشر دقائق القادمة.", remaining),
        )
    }

    /// The message for a finished submission, if it shows one.
    pub fn for_outcome(outcome: &SubmissionOutcome) -> Option<Self> {
        match outcome {
            SubmissionOutcome::Sent => Some(Self::success()),
            SubmissionOutcome::Blocked { cooldown_seconds } => {
                Some(Self::rate_limited(*cooldown_seconds))
            }
            SubmissionOutcome::Invalid(error) => Some(Self::invalid(error)),
            SubmissionOutcome::NetworkFailed { connectivity } => {
                Some(Self::network_failed(*connectivity))
            }
            SubmissionOutcome::InFlight => None,
        }
    }
}

/// Whole minutes in `seconds`, rounded up.
pub fn cooldown_minutes(seconds: u64) -> u64 {
    seconds.div_ceil(60)
}

/// Submit label while rate limited, as `m:ss`.
pub fn countdown_label(seconds: u64) -> String {
    format!("انتظر {}:{:02}", seconds / 60, seconds % 60)
}
