//! Error types for fact delivery.

use thiserror::Error;

/// Failure of a single delivery attempt.
///
/// Both variants are retryable; the retry driver folds the final one into
/// [`RetriesExhausted`] once the attempt budget is spent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Request construction or network-level send failure
    #[error("request failed: {0}")]
    Transport(String),

    /// The server replied with a non-success status
    #[error("server rejected fact: {status} - {body}")]
    Rejected {
        /// The HTTP status code returned by the server.
        status: u16,
        /// The response body, kept as diagnostic text.
        body: String,
    },
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport(err.to_string())
    }
}

/// Terminal failure of one fact's delivery after the attempt budget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("delivery failed after {attempts} attempts: {last_error}")]
pub struct RetriesExhausted {
    /// Number of attempts made.
    pub attempts: u32,
    /// The error from the final attempt.
    pub last_error: DeliveryError,
}

/// Result type alias for single delivery attempts.
pub type DeliveryResult<T> = Result<T, DeliveryError>;
