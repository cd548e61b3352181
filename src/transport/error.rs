//! Transport error types
//!
//! Every way a chat request can fail before a usable reply is decoded.
//! The session state machine treats all of them the same way: the thinking
//! placeholder is replaced with an apology and the send control comes back.

use thiserror::Error;

/// Errors that can occur while talking to the chat server
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Non-2xx response
    #[error("Server responded with status: {status}")]
    Status { status: u16, message: String },

    /// The server sent us back to the login page
    #[error("Not authenticated")]
    Unauthorized,

    /// Login form rejected by the server
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection failed or was dropped
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Request could not be built (bad URL, unserializable body)
    #[error("Failed to build request: {0}")]
    Request(String),
}

impl TransportError {
    /// Status code for `Status` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransportError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Server responded with status: 500");
        assert_eq!(err.status(), Some(500));

        assert_eq!(TransportError::Timeout.to_string(), "Request timed out");
        assert_eq!(TransportError::Timeout.status(), None);
        assert_eq!(TransportError::Unauthorized.status(), Some(401));
    }
}
