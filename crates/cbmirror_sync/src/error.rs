//! Error types for remote access and delivery.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while talking to the server.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The request did not complete within the configured timeout.
    #[error("operation timed out")]
    Timeout,

    /// The server answered with a non-200 status.
    #[error("server returned status {0}")]
    Status(u16),

    /// The server answered but did not acknowledge the request.
    #[error("server rejected request: {0}")]
    Rejected(String),

    /// The response or request body could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Timeout => true,
            SyncError::Status(_) => true,
            SyncError::Rejected(_) => true,
            SyncError::Protocol(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection refused").is_retryable());
        assert!(!SyncError::transport_fatal("invalid url").is_retryable());
        assert!(SyncError::Timeout.is_retryable());
        assert!(SyncError::Status(503).is_retryable());
        assert!(SyncError::Rejected("status: error".into()).is_retryable());
        assert!(!SyncError::Protocol("not json".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        assert_eq!(SyncError::Timeout.to_string(), "operation timed out");
        assert!(SyncError::Status(404).to_string().contains("404"));
    }
}
