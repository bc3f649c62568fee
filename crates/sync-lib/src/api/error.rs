//! Error type for the scheduling API client layer

use thiserror::Error;

/// Errors surfaced by token acquisition and API calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response body could not be read
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Token acquisition failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// An update was submitted for a record that was never persisted
    #[error("cannot update unavailability without an id")]
    MissingId,
}
