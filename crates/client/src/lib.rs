//! Store client seam for aerofix
//!
//! The session never talks to a database directly. It goes through the
//! [`Connector`] and [`StoreClient`] traits defined here, which a native
//! client binding implements. [`MemoryServer`] is the in-process
//! implementation used by this workspace's tests and by suites that want to
//! exercise fixtures without a live cluster.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod traits;

pub use aerofix_core::{ClientError, ClientResult, Key, RetryPolicy, Ttl, Value};
pub use memory::{MemoryClient, MemoryServer};
pub use traits::{ClientOptions, Connector, Deleted, StoreClient};
