//! Fixture configuration via `aerofix.toml`
//!
//! A suite keeps one config file next to its tests. Every field has a
//! default, so an empty file (or no file at all) targets a local server on
//! the stock port with the `test` namespace.

use std::path::Path;

use aerofix_client::ClientOptions;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "aerofix.toml";

/// Fixture configuration loaded from `aerofix.toml`.
///
/// # Example
///
/// ```toml
/// address = "127.0.0.1"
/// port = 3000
/// namespace = "test"
/// set = "cache"
/// prefix = "suite_"
/// reconnect = false
///
/// [client]
/// connect_timeout_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Server host.
    #[serde(default = "default_address")]
    pub address: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Namespace every key is built in.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Set name every key is built in.
    #[serde(default = "default_set")]
    pub set: String,
    /// Prepended to every caller-supplied key.
    #[serde(default)]
    pub prefix: String,
    /// Open a fresh connection for each test instead of one per suite.
    #[serde(default)]
    pub reconnect: bool,
    /// Degrade instead of failing when the server is unreachable.
    #[serde(default)]
    pub silent: bool,
    /// Fail the test when a seed write is not confirmed.
    #[serde(default = "default_strict_seed")]
    pub strict_seed: bool,
    /// Options handed to the client on connect.
    #[serde(default)]
    pub client: ClientOptions,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_namespace() -> String {
    "test".to_string()
}

fn default_set() -> String {
    "cache".to_string()
}

fn default_strict_seed() -> bool {
    true
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            namespace: default_namespace(),
            set: default_set(),
            prefix: String::new(),
            reconnect: false,
            silent: false,
            strict_seed: default_strict_seed(),
            client: ClientOptions::default(),
        }
    }
}

impl FixtureConfig {
    /// `host:port` as dialed.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Check the fields a connection cannot work without.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty address, namespace or set, or
    /// a zero port.
    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(Error::config("address must not be empty"));
        }
        if self.port == 0 {
            return Err(Error::config("port must be non-zero"));
        }
        if self.namespace.is_empty() {
            return Err(Error::config("namespace must not be empty"));
        }
        if self.set.is_empty() {
            return Err(Error::config("set must not be empty"));
        }
        Ok(())
    }

    /// Apply `overrides` on top of this config.
    pub fn merged(&self, overrides: &ConfigOverrides) -> FixtureConfig {
        let mut config = self.clone();
        if let Some(address) = &overrides.address {
            config.address = address.clone();
        }
        if let Some(port) = overrides.port {
            config.port = port;
        }
        if let Some(namespace) = &overrides.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(set) = &overrides.set {
            config.set = set.clone();
        }
        if let Some(prefix) = &overrides.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(reconnect) = overrides.reconnect {
            config.reconnect = reconnect;
        }
        if let Some(silent) = overrides.silent {
            config.silent = silent;
        }
        if let Some(strict_seed) = overrides.strict_seed {
            config.strict_seed = strict_seed;
        }
        if let Some(client) = &overrides.client {
            config.client = client.clone();
        }
        config
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# aerofix fixture configuration
#
# Server to seed and clean up
address = "127.0.0.1"
port = 3000

# Every key is built as (namespace, set, prefix + key)
namespace = "test"
set = "cache"
prefix = ""

# Open a fresh connection for every test instead of once per suite
reconnect = false

# When the server is unreachable: false = fail the suite, true = continue degraded
silent = false

# Fail the test when a seed write is not confirmed
strict_seed = true

[client]
connect_timeout_ms = 1000
persistent = true
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FixtureConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config { reason } => {
                Error::config(format!("{} (in '{}')", reason, path.display()))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

/// Partial config applied by [`Session::reconfigure`](crate::Session::reconfigure).
///
/// `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    /// New server host
    pub address: Option<String>,
    /// New server port
    pub port: Option<u16>,
    /// New namespace
    pub namespace: Option<String>,
    /// New set
    pub set: Option<String>,
    /// New key prefix
    pub prefix: Option<String>,
    /// New reconnect policy
    pub reconnect: Option<bool>,
    /// New unreachable-server policy
    pub silent: Option<bool>,
    /// New seed-failure policy
    pub strict_seed: Option<bool>,
    /// New client options
    pub client: Option<ClientOptions>,
}
