//! Test fixtures for Aerospike-style key-value stores
//!
//! A [`Session`] seeds records for a test, asserts against them, and removes
//! everything it seeded when the test ends:
//! - Session: Suite-scoped connection, test verbs, lifecycle hooks
//! - TestScope: Per-test guard that cleans up on drop
//! - KeyRegistry: Ordered record of seeded keys and the cleanup pass
//! - FixtureConfig: `aerofix.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod registry;
pub mod scope;
pub mod session;

pub use config::{ConfigOverrides, FixtureConfig, CONFIG_FILE_NAME};
pub use error::{Error, Result};
pub use registry::{FlushReport, KeyRegistry, Resolution};
pub use scope::TestScope;
pub use session::{Session, CLEANUP_RETRY};
