//! Key-lifecycle tracking.
//!
//! [`KeyRegistry`] remembers every key a test seeded, in seed order, and
//! removes them from the store at the next test boundary. A recorded key is
//! *pending*; [`flush`](KeyRegistry::flush) resolves each pending key exactly
//! once (deleted, already absent, or given up on) and always leaves the
//! registry empty.
//!
//! Cleanup is best-effort. A key the test removed itself is not an error,
//! and a key that cannot be removed is logged and counted in the
//! [`FlushReport`] without stopping the pass.

use aerofix_client::{Deleted, StoreClient};
use aerofix_core::{ClientError, Key, RetryPolicy};
use tracing::{debug, warn};

/// How a pending key was resolved by a flush.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The record existed and was deleted
    Deleted,
    /// The record was already gone
    AlreadyAbsent,
    /// The existence check or the delete failed
    Failed(ClientError),
}

/// Outcome of one cleanup pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    /// Records deleted
    pub deleted: usize,
    /// Records that were already gone
    pub already_absent: usize,
    /// Keys that could not be cleaned up, with the error seen
    pub failed: Vec<(Key, ClientError)>,
}

impl FlushReport {
    /// Number of keys the pass resolved.
    pub fn total(&self) -> usize {
        self.deleted + self.already_absent + self.failed.len()
    }

    /// Whether every key was deleted or already absent.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn tally(&mut self, key: Key, resolution: Resolution) {
        match resolution {
            Resolution::Deleted => self.deleted += 1,
            Resolution::AlreadyAbsent => self.already_absent += 1,
            Resolution::Failed(err) => self.failed.push((key, err)),
        }
    }
}

/// Ordered record of keys seeded during the current test.
///
/// Keys are not deduplicated: seeding the same key twice records it twice,
/// and the second resolution finds it already absent.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    pending: Vec<Key>,
}

impl KeyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a key that was just written.
    pub fn record(&mut self, key: Key) {
        self.pending.push(key);
    }

    /// Pending keys in seed order.
    pub fn keys(&self) -> &[Key] {
        &self.pending
    }

    /// Number of pending keys.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Forget every pending key without touching the store.
    ///
    /// Returns the dropped keys in seed order.
    pub fn discard(&mut self) -> Vec<Key> {
        let dropped = std::mem::take(&mut self.pending);
        if !dropped.is_empty() {
            warn!(
                dropped = dropped.len(),
                "discarding tracked keys without cleanup"
            );
        }
        dropped
    }

    /// Remove every pending key from the store, then clear the registry.
    ///
    /// Keys are processed in seed order. Each is checked for existence and,
    /// if present, deleted under `policy`. Failures are logged and reported;
    /// they never stop the pass.
    pub fn flush<C>(&mut self, client: &C, policy: &RetryPolicy) -> FlushReport
    where
        C: StoreClient + ?Sized,
    {
        let pending = std::mem::take(&mut self.pending);
        let mut report = FlushReport::default();

        for key in pending {
            let resolution = resolve(client, &key, policy);
            if let Resolution::Failed(err) = &resolution {
                warn!(key = %key, error = %err, "failed to clean up seeded record");
            }
            report.tally(key, resolution);
        }

        debug!(
            deleted = report.deleted,
            already_absent = report.already_absent,
            failed = report.failed.len(),
            "flushed tracked keys"
        );
        report
    }
}

fn resolve<C>(client: &C, key: &Key, policy: &RetryPolicy) -> Resolution
where
    C: StoreClient + ?Sized,
{
    match client.exists(key) {
        Ok(false) => Resolution::AlreadyAbsent,
        Ok(true) => match client.delete(key, policy) {
            Ok(Deleted::Removed) => Resolution::Deleted,
            // Expired or removed between the check and the delete
            Ok(Deleted::NotFound) => Resolution::AlreadyAbsent,
            Err(err) => Resolution::Failed(err),
        },
        Err(err) => Resolution::Failed(err),
    }
}
