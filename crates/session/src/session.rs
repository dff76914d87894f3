//! Suite-scoped fixture session.
//!
//! The [`Session`] owns the connection, the configuration and the
//! [`KeyRegistry`] for one test suite. Tests talk to the store only through
//! its verbs:
//!
//! | Verb | Store calls | Tracked |
//! |------|-------------|---------|
//! | [`seed`](Session::seed) | put | yes |
//! | [`assert_present`](Session::assert_present) | get | no |
//! | [`assert_absent`](Session::assert_absent) | get | no |
//! | [`fetch`](Session::fetch) | get | no |
//!
//! # Usage
//!
//! ```ignore
//! use aerofix::{FixtureConfig, MemoryServer, Session};
//!
//! let server = MemoryServer::new();
//! let mut session = Session::open(FixtureConfig::default(), server)?;
//!
//! {
//!     let mut test = session.scope()?;
//!     test.seed("user:1", "alice")?;
//!     test.assert_present("user:1", Some(&"alice".into()))?;
//! } // seeded keys are removed here
//!
//! session.close();
//! ```

use aerofix_client::{Connector, StoreClient};
use aerofix_core::{ClientError, Key, RetryPolicy, Ttl, Value};
use tracing::{debug, info, warn};

use crate::config::{ConfigOverrides, FixtureConfig};
use crate::error::{Error, Result};
use crate::registry::{FlushReport, KeyRegistry};
use crate::scope::TestScope;

/// Retry policy for cleanup deletes.
pub const CLEANUP_RETRY: RetryPolicy = RetryPolicy::ONCE;

/// A fixture session bound to one connector.
///
/// Created with [`Session::open`] at suite start and released with
/// [`Session::close`] (or on drop) at suite end. Release flushes every key
/// still tracked and closes the connection.
pub struct Session<C: Connector> {
    config: FixtureConfig,
    connector: C,
    client: Option<C::Client>,
    registry: KeyRegistry,
    closed: bool,
}

impl<C: Connector> Session<C> {
    /// Open a session.
    ///
    /// Connects immediately unless `reconnect` is set, in which case each
    /// [`before_test`](Self::before_test) connects.
    ///
    /// # Errors
    ///
    /// `Error::Config` for an invalid config, `Error::Connect` when the
    /// server is unreachable and `silent` is off.
    pub fn open(config: FixtureConfig, connector: C) -> Result<Self> {
        config.validate()?;
        let mut session = Self {
            config,
            connector,
            client: None,
            registry: KeyRegistry::new(),
            closed: false,
        };
        if !session.config.reconnect {
            session.connect()?;
        }
        Ok(session)
    }

    /// Tear this session down and open a new one with `overrides` applied.
    ///
    /// Keys tracked by this session are flushed through its own connection
    /// before the new one is opened.
    pub fn reconfigure(mut self, overrides: &ConfigOverrides) -> Result<Self>
    where
        C: Clone,
    {
        let config = self.config.merged(overrides);
        let connector = self.connector.clone();
        self.teardown();
        info!(address = %config.server_address(), "reconfiguring fixture session");
        Session::open(config, connector)
    }

    /// Active configuration.
    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.client.as_ref().is_some_and(|c| c.is_connected())
    }

    /// Keys seeded since the last cleanup, in seed order.
    pub fn tracked_keys(&self) -> &[Key] {
        self.registry.keys()
    }

    /// Record locator for a caller-supplied key, prefix applied.
    pub fn key(&self, raw: &str) -> Key {
        let user_key = format!("{}{}", self.config.prefix, raw);
        self.connector
            .build_key(&self.config.namespace, &self.config.set, &user_key)
    }

    // =========================================================================
    // Test verbs
    // =========================================================================

    /// Write `value` under `key` with the namespace default TTL and track it.
    pub fn seed(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.seed_with_ttl(key, value, Ttl::NamespaceDefault)
    }

    /// Write `value` under `key` with `ttl` and track it for cleanup.
    ///
    /// # Errors
    ///
    /// `Error::SeedFailed` when the write is not confirmed and
    /// `strict_seed` is on. With `strict_seed` off the failure is logged,
    /// the key is not tracked, and `Ok(())` is returned.
    pub fn seed_with_ttl(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        ttl: impl Into<Ttl>,
    ) -> Result<()> {
        let value = value.into();
        let ttl = ttl.into();
        let client = self.client()?;
        let key = self.key(key);

        match client.put(&key, &value, ttl) {
            Ok(()) => {
                debug!(key = %key, ttl = ttl.as_secs(), "seeded record");
                self.registry.record(key);
                Ok(())
            }
            Err(source) if self.config.strict_seed => Err(Error::SeedFailed { key, source }),
            Err(source) => {
                warn!(key = %key, error = %source, "seed write failed, continuing");
                Ok(())
            }
        }
    }

    /// Assert that `key` exists and, if `expected` is given, holds it.
    pub fn assert_present(&self, key: &str, expected: Option<&Value>) -> Result<()> {
        let key = self.key(key);
        let stored = self.client()?.get(&key)?;
        debug!(key = %key, found = stored.is_some(), "assert present");

        match (stored, expected) {
            (None, _) => Err(Error::Assertion {
                key,
                reason: "record is missing".to_string(),
            }),
            (Some(actual), Some(expected)) if actual != *expected => Err(Error::Assertion {
                key,
                reason: format!("expected {}, found {}", describe(expected), describe(&actual)),
            }),
            (Some(_), _) => Ok(()),
        }
    }

    /// Assert that `key` does not exist.
    ///
    /// With `expected` given, only a record holding exactly that value
    /// fails the assertion; a missing record or a different value passes.
    pub fn assert_absent(&self, key: &str, expected: Option<&Value>) -> Result<()> {
        let key = self.key(key);
        let stored = self.client()?.get(&key)?;
        debug!(key = %key, found = stored.is_some(), "assert absent");

        match (stored, expected) {
            (None, _) => Ok(()),
            (Some(actual), None) => Err(Error::Assertion {
                key,
                reason: format!("record exists with {}", describe(&actual)),
            }),
            (Some(actual), Some(expected)) if actual == *expected => Err(Error::Assertion {
                key,
                reason: format!("record holds {}", describe(&actual)),
            }),
            (Some(_), Some(_)) => Ok(()),
        }
    }

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// `Error::KeyNotFound` when there is no such record.
    pub fn fetch(&self, key: &str) -> Result<Value> {
        let key = self.key(key);
        let stored = self.client()?.get(&key)?;
        debug!(key = %key, found = stored.is_some(), "fetch");
        stored.ok_or(Error::KeyNotFound(key))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start a test. Connects when `reconnect` is set.
    pub fn before_test(&mut self) -> Result<()> {
        if self.config.reconnect && !self.is_connected() {
            self.connect()?;
        }
        Ok(())
    }

    /// Finish a test: remove every tracked key, then disconnect when
    /// `reconnect` is set.
    pub fn after_test(&mut self) -> FlushReport {
        let report = self.cleanup();
        if self.config.reconnect {
            self.disconnect();
        }
        report
    }

    /// Run `before_test` now and `after_test` when the guard drops.
    pub fn scope(&mut self) -> Result<TestScope<'_, C>> {
        self.before_test()?;
        Ok(TestScope::new(self))
    }

    /// Remove every tracked key from the store and clear the registry.
    ///
    /// Without a connection the keys cannot be removed; they are dropped
    /// from the registry and reported as failed.
    pub fn cleanup(&mut self) -> FlushReport {
        match self.client.as_ref().filter(|c| c.is_connected()) {
            Some(client) => self.registry.flush(client, &CLEANUP_RETRY),
            None => FlushReport {
                failed: self
                    .registry
                    .discard()
                    .into_iter()
                    .map(|key| (key, ClientError::NotConnected))
                    .collect(),
                ..FlushReport::default()
            },
        }
    }

    /// Release the session: flush tracked keys and disconnect.
    pub fn close(mut self) -> FlushReport {
        self.teardown()
    }

    fn teardown(&mut self) -> FlushReport {
        if self.closed {
            return FlushReport::default();
        }
        self.closed = true;
        let report = self.cleanup();
        self.disconnect();
        report
    }

    fn client(&self) -> Result<&C::Client> {
        self.client
            .as_ref()
            .filter(|c| c.is_connected())
            .ok_or(Error::NotConnected)
    }

    fn connect(&mut self) -> Result<()> {
        let address = self.config.server_address();
        match self
            .connector
            .connect(&self.config.address, self.config.port, &self.config.client)
        {
            Ok(client) => {
                info!(%address, namespace = %self.config.namespace, set = %self.config.set, "connected");
                self.client = Some(client);
                Ok(())
            }
            Err(source) if self.config.silent => {
                warn!(%address, error = %source, "server unreachable, session degraded");
                self.client = None;
                Ok(())
            }
            Err(source) => Err(Error::Connect { address, source }),
        }
    }

    fn disconnect(&mut self) {
        if let Some(mut client) = self.client.take() {
            client.disconnect();
            info!(address = %self.config.server_address(), "disconnected");
        }
    }
}

impl<C: Connector> Drop for Session<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn describe(value: &Value) -> String {
    format!("{} {}", value.type_name(), value)
}
