//! Sync client error types

use thiserror::Error;

/// Errors surfaced by the synchronization client
#[derive(Error, Debug)]
pub enum SyncError {
    /// WebSocket transport failure (connect, send, or receive)
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Result type for sync client operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure to decode an incoming server frame
///
/// Decoding failures cost only the offending frame; they never tear down
/// the connection.
#[derive(Error, Debug)]
#[error("malformed server frame: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Error reported by an action dispatcher when a control request fails
///
/// Carried back to subscribers as a non-fatal notice; the connection is
/// unaffected.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let err = ActionError::new("queue is empty");
        assert_eq!(err.to_string(), "queue is empty");
    }

    #[test]
    fn test_decode_error_from_serde() {
        let parse_failure = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = DecodeError::from(parse_failure);
        assert!(err.to_string().starts_with("malformed server frame"));
    }
}
