//! Error types for Dalil.

use thiserror::Error;

use crate::storage::StorageError;

/// Main error type for Dalil operations.
#[derive(Error, Debug)]
pub enum DalilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted client state could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Algorithm catalog errors
    #[error("Content error: {0}")]
    Content(String),

    /// A page URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Dalil operations.
pub type Result<T> = std::result::Result<T, DalilError>;
