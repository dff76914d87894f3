//! Core types for aerofix
//!
//! This crate defines the foundational types shared by the client seam and
//! the test session:
//! - Key: Record locator (namespace, set, user key)
//! - Value: Content of the single `value` bin
//! - Ttl: Record expiration passed on writes
//! - RetryPolicy: Bounded retry applied to cleanup deletes
//! - ClientError: Errors reported by a store client

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod retry;
pub mod types;
pub mod value;

pub use error::{ClientError, ClientResult};
pub use retry::RetryPolicy;
pub use types::{Key, Ttl, VALUE_BIN};
pub use value::Value;
