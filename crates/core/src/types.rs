//! Record addressing types
//!
//! - Key: Composite record locator (namespace + set + user key)
//! - Ttl: Expiration attached to a write

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Name of the single bin every seeded record carries.
pub const VALUE_BIN: &str = "value";

/// Record locator understood by the backing store
///
/// A key is the triple the server hashes into a record digest. Two keys are
/// the same record exactly when all three parts are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Namespace (top-level storage container)
    pub namespace: String,
    /// Set name within the namespace
    pub set: String,
    /// User key, already carrying any configured prefix
    pub user_key: String,
}

impl Key {
    /// Create a new key
    pub fn new(
        namespace: impl Into<String>,
        set: impl Into<String>,
        user_key: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            set: set.into(),
            user_key: user_key.into(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.set, self.user_key)
    }
}

/// Record time-to-live
///
/// Mirrors the server's integer encoding: `0` defers to the namespace
/// default, `-1` never expires, positive values are seconds. `Seconds`
/// cannot hold zero, so every variant has exactly one integer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ttl {
    /// Use the namespace's configured default
    #[default]
    NamespaceDefault,
    /// Never expire
    Never,
    /// Expire after this many seconds
    Seconds(NonZeroU32),
}

impl Ttl {
    /// Build a TTL from the server's integer form.
    ///
    /// Negative values mean "never expire"; values past `u32::MAX` saturate.
    pub fn from_secs(secs: i64) -> Self {
        if secs < 0 {
            return Ttl::Never;
        }
        let secs = u32::try_from(secs).unwrap_or(u32::MAX);
        NonZeroU32::new(secs).map_or(Ttl::NamespaceDefault, Ttl::Seconds)
    }

    /// Server integer form
    pub fn as_secs(&self) -> i64 {
        match self {
            Ttl::NamespaceDefault => 0,
            Ttl::Never => -1,
            Ttl::Seconds(s) => i64::from(s.get()),
        }
    }
}

impl From<u32> for Ttl {
    fn from(secs: u32) -> Self {
        Ttl::from_secs(i64::from(secs))
    }
}
