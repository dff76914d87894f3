//! Error types for fixture sessions.
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | `Config` | config loading | Bad or unreadable configuration |
//! | `Connect` | `Session::open`, `before_test` | Server unreachable and `silent` is off |
//! | `NotConnected` | any verb | Session is degraded or between tests |
//! | `SeedFailed` | `seed` | Write not confirmed; the test cannot trust its data |
//! | `Assertion` | `assert_present`, `assert_absent` | Store content does not match |
//! | `KeyNotFound` | `fetch` | No record to fetch |
//! | `Client` | any verb | Read failed at the client |

use aerofix_core::{ClientError, Key};
use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Session errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("invalid config: {reason}")]
    Config {
        /// What is wrong
        reason: String,
    },

    /// Could not reach the server
    #[error("cannot connect to {address}: {source}")]
    Connect {
        /// `host:port` from the config
        address: String,
        /// Client error
        #[source]
        source: ClientError,
    },

    /// No open connection
    #[error("session is not connected")]
    NotConnected,

    /// A seed write did not succeed
    #[error("failed to seed {key}: {source}")]
    SeedFailed {
        /// Key being written
        key: Key,
        /// Client error
        #[source]
        source: ClientError,
    },

    /// Store content does not match the expectation
    #[error("assertion failed for {key}: {reason}")]
    Assertion {
        /// Key under test
        key: Key,
        /// Mismatch description
        reason: String,
    },

    /// Fetch found no record
    #[error("key not found: {0}")]
    KeyNotFound(Key),

    /// Client failure outside of seeding
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl Error {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }

    /// Whether this is an assertion failure rather than an infrastructure error.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Error::Assertion { .. })
    }
}
