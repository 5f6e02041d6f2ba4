//! Rendering adapters for form status.

use super::message::{StatusCategory, StatusMessage};

/// Where the presenter draws its state.
///
/// Implementations only render; they make no decisions.
pub trait StatusView: Send + Sync {
    fn show(&self, message: &StatusMessage);
    fn clear(&self);
    fn set_submit_enabled(&self, enabled: bool);
    fn set_submit_label(&self, label: &str);
    /// Empty the visible form fields.
    fn reset_fields(&self);
}

/// Prints status lines to stdout.
#[derive(Debug, Default)]
pub struct ConsoleView;

impl StatusView for ConsoleView {
    fn show(&self, message: &StatusMessage) {
        let tag = match message.category {
            StatusCategory::Info => "info",
            StatusCategory::Sending => "sending",
            StatusCategory::Success => "success",
            StatusCategory::Error => "error",
            StatusCategory::RateLimited => "rate-limited",
        };
        println!("[{}] {}", tag, message.text);
    }

    fn clear(&self) {}

    fn set_submit_enabled(&self, enabled: bool) {
        tracing::trace!(enabled = enabled, "Submit control toggled");
    }

    fn set_submit_label(&self, label: &str) {
        tracing::trace!(label = %label, "Submit label changed");
    }

    fn reset_fields(&self) {
        tracing::trace!("Form fields reset");
    }
}

#[cfg(test)]
pub(crate) use recording::{RecordingView, ViewEvent};
