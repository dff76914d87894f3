//! aerofix - test fixtures for Aerospike-style key-value stores
//!
//! Seed records before a test, assert against them during it, and have every
//! seeded record removed when it ends.
//!
//! # Quick Start
//!
//! ```ignore
//! use aerofix::{FixtureConfig, MemoryServer, Session, Value};
//!
//! let mut session = Session::open(FixtureConfig::default(), MemoryServer::new())?;
//!
//! let mut test = session.scope()?;
//! test.seed("user:123", "Alice")?;
//! assert_eq!(test.fetch("user:123")?, Value::from("Alice"));
//! ```
//!
//! # Architecture
//!
//! The session reaches the store only through the [`Connector`] and
//! [`StoreClient`] traits. Point it at a native client binding for a live
//! cluster, or at [`MemoryServer`] for an in-process one.

pub use aerofix_client::{
    ClientOptions, Connector, Deleted, MemoryClient, MemoryServer, StoreClient,
};
pub use aerofix_core::{ClientError, ClientResult, Key, RetryPolicy, Ttl, Value, VALUE_BIN};
pub use aerofix_session::*;
