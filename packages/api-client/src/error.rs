//! Music API error types

use thiserror::Error;

/// Music API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("failed to parse music API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server rejected the request as conflicting with its state,
    /// such as queueing a song that is already queued
    #[error("request rejected: {0}")]
    Conflict(String),

    /// The requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The server failed to handle the request
    #[error("music API error {status}: {detail}")]
    Server { status: u16, detail: String },

    /// Request timeout
    #[error("request to the music API timed out")]
    Timeout,
}

impl ApiError {
    /// Whether this error is transient and worth retrying
    ///
    /// Retries on timeouts, transport errors and server errors (5xx).
    /// Does NOT retry on client errors: a `Conflict` or `NotFound`
    /// answer will not change by asking again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout => true,
            ApiError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    return true;
                }
                matches!(e.status(), Some(status) if status.is_server_error())
            }
            ApiError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type for music API operations
pub type ApiResult<T> = Result<T, ApiError>;
