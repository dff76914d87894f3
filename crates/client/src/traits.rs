//! Client traits
//!
//! This module defines the [`Connector`] and [`StoreClient`] traits that
//! let the session swap a live cluster for an in-process server without
//! changing any fixture code.
//!
//! # Calls
//!
//! | Method | Not found | Failure |
//! |--------|-----------|---------|
//! | [`get`](StoreClient::get) | `Ok(None)` | `Err` |
//! | [`put`](StoreClient::put) | n/a | `Err` |
//! | [`delete`](StoreClient::delete) | `Ok(Deleted::NotFound)` | `Err` after retries |
//! | [`exists`](StoreClient::exists) | `Ok(false)` | `Err` |

use aerofix_core::{ClientResult, Key, RetryPolicy, Ttl, Value};
use serde::{Deserialize, Serialize};

/// Outcome of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deleted {
    /// The record existed and was removed
    Removed,
    /// There was no such record
    NotFound,
}

/// Options handed to [`Connector::connect`].
///
/// Loaded from the `[client]` table of the fixture config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Connect timeout in milliseconds (default: 1000)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Ask the client to reuse a persistent connection (default: true)
    #[serde(default = "default_persistent")]
    pub persistent: bool,
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

fn default_persistent() -> bool {
    true
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            persistent: default_persistent(),
        }
    }
}

/// An open connection to the store.
///
/// All calls are blocking. Implementations map "record not found" onto the
/// `Ok` side (see the table in the module docs) so that callers only see
/// `Err` for genuine failures.
pub trait StoreClient {
    /// Read the `value` bin of a record.
    fn get(&self, key: &Key) -> ClientResult<Option<Value>>;

    /// Write the `value` bin of a record, creating or replacing it.
    fn put(&self, key: &Key, value: &Value, ttl: Ttl) -> ClientResult<()>;

    /// Remove a record, retrying transient failures per `policy`.
    fn delete(&self, key: &Key, policy: &RetryPolicy) -> ClientResult<Deleted>;

    /// Check whether a record exists.
    fn exists(&self, key: &Key) -> ClientResult<bool>;

    /// Close the connection. Later calls fail with `NotConnected`.
    fn disconnect(&mut self);

    /// Whether the connection is open.
    fn is_connected(&self) -> bool;
}

/// Opens [`StoreClient`] connections.
pub trait Connector {
    /// Client type produced by this connector
    type Client: StoreClient;

    /// Connect to `host:port`.
    fn connect(&self, host: &str, port: u16, options: &ClientOptions)
        -> ClientResult<Self::Client>;

    /// Build the record locator for a raw user key.
    ///
    /// Needs no open connection, so a locator is the same whether or not a
    /// client is currently connected.
    fn build_key(&self, namespace: &str, set: &str, raw_key: &str) -> Key {
        Key::new(namespace, set, raw_key)
    }
}

impl<C: Connector + ?Sized> Connector for &C {
    type Client = C::Client;

    fn connect(
        &self,
        host: &str,
        port: u16,
        options: &ClientOptions,
    ) -> ClientResult<Self::Client> {
        (**self).connect(host, port, options)
    }

    fn build_key(&self, namespace: &str, set: &str, raw_key: &str) -> Key {
        (**self).build_key(namespace, set, raw_key)
    }
}
