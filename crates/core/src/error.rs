//! Error types for store clients
//!
//! Every client implementation maps its native failures onto [`ClientError`].
//! A missing record is not an error: reads report it as `None` and deletes
//! report it as a distinct outcome, so only genuine failures land here.

use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors reported by a store client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No server answered at the configured address
    #[error("server unreachable at {address}")]
    Unreachable {
        /// `host:port` that was dialed
        address: String,
    },

    /// Timeout or dropped connection; the same call may succeed if repeated
    #[error("transient failure: {reason}")]
    Transient {
        /// Description from the client
        reason: String,
    },

    /// The server rejected the request
    #[error("server error {code}: {message}")]
    Server {
        /// Server result code
        code: i32,
        /// Server message
        message: String,
    },

    /// The client was used after `disconnect`
    #[error("client is not connected")]
    NotConnected,
}

impl ClientError {
    /// Create a transient error
    pub fn transient(reason: impl Into<String>) -> Self {
        ClientError::Transient {
            reason: reason.into(),
        }
    }

    /// Create a server error
    pub fn server(code: i32, message: impl Into<String>) -> Self {
        ClientError::Server {
            code,
            message: message.into(),
        }
    }

    /// Whether repeating the call may succeed.
    ///
    /// Only transient failures are retried by [`RetryPolicy`](crate::RetryPolicy).
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Transient { .. })
    }
}
