//! Contact form: input validation, delivery and the submission state machine.

mod controller;
mod input;
mod transport;

pub use controller::{FormState, FormSubmissionController, GateStatus, SubmissionOutcome};
pub use input::{is_valid_email, Field, FormInput, ValidatedInput, ValidationError};
pub use transport::{
    is_success_status, FormSubmission, FormTransport, HttpTransport, TransportError,
    FORM_NAME_FIELD,
};
