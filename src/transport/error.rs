//! Error types for backend transport.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single backend call or of the log stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint URL could not be built from the configured base address.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be sent (connection refused, timeout, ...).
    #[error("Request error: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// Reading the response body or the stream failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status {
        /// Status code of the response.
        status: StatusCode,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The log stream was interrupted.
    #[error("Log stream error: {0}")]
    Stream(String),
}

impl TransportError {
    /// Returns the HTTP status when the backend answered with an error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
