//! Delivery of validated submissions to the form endpoint.

use async_trait::async_trait;
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{DalilError, Result};

/// Name of the discriminator field identifying which form was submitted.
pub const FORM_NAME_FIELD: &str = "form-name";

/// Why a submission did not reach the endpoint successfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The endpoint could not be reached at all
    #[error("endpoint unreachable: {0}")]
    Connectivity(String),
    /// The endpoint answered with a non-success status
    #[error("endpoint returned status {0}")]
    Status(u16),
    /// Any other failure while sending
    #[error("submission failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether the request never reached the endpoint.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, TransportError::Connectivity(_))
    }
}

/// The urlencoded body of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub form_name: String,
    pub name: String,
    pub email: String,
    pub message: String,
}

impl FormSubmission {
    /// Field pairs in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            (FORM_NAME_FIELD, self.form_name.as_str()),
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("message", self.message.as_str()),
        ]
    }
}

/// Whether a response status counts as delivered: any 2xx or 3xx.
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Sends a submission and reports the endpoint's status.
#[async_trait]
pub trait FormTransport: Send + Sync {
    /// Send once. `Ok` carries a success status; anything else is an error.
    async fn send(&self, submission: &FormSubmission) -> std::result::Result<u16, TransportError>;
}

/// POSTs submissions as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport posting to `endpoint`.
    ///
    /// Redirects are not followed so that a redirect answer is observed
    /// as-is and treated as delivered.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(DalilError::Http)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Get the endpoint submissions are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() || err.is_timeout() {
        TransportError::Connectivity(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[async_trait]
impl FormTransport for HttpTransport {
    async fn send(&self, submission: &FormSubmission) -> std::result::Result<u16, TransportError> {
        debug!(endpoint = %self.endpoint, form = %submission.form_name, "Posting form submission");

        let response = self
            .client
            .post(&self.endpoint)
            .form(&submission.fields()[..])
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        if is_success_status(status) {
            Ok(status)
        } else {
            warn!(endpoint = %self.endpoint, status = status, "Form endpoint rejected submission");
            Err(TransportError::Status(status))
        }
    }
}
