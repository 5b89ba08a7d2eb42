//! Concurrent key-value map with per-key TTL
//!
//! Locking discipline:
//! - `set` / `delete` / sweeps take the write lock for a single map mutation
//! - `get` takes the read lock; if the entry it finds has expired, it drops the
//!   read lock and removes the entry in a second, exclusive section
//!
//! No lock is ever held across I/O or an `.await`.

use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::entry::Entry;
use crate::stats::StoreStats;

/// Thread-safe in-memory key-value store with per-key expiration
///
/// Share it between front ends and the [`Reclaimer`](crate::Reclaimer) behind an
/// `Arc`; every access goes through the methods below.
#[derive(Debug, Default)]
pub struct Store {
    /// key -> entry, the only shared mutable state
    map: RwLock<HashMap<String, Entry, RandomState>>,

    /// Operation counters
    stats: StoreStats,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`
    ///
    /// # Arguments
    /// * `key` - Any string, including the empty string
    /// * `value` - Opaque payload
    /// * `ttl_seconds` - Lifetime in seconds; zero or negative never expires
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl_seconds: i64) {
        let entry = Entry::new(value.into(), ttl_seconds, Instant::now());
        let key = key.into();

        self.map.write().insert(key, entry);
        self.stats.record_set();
    }

    /// Look up a live value
    ///
    /// Returns `None` when the key is absent or its deadline has passed. An
    /// expired entry is removed as a side effect, in a separate write section
    /// after the read lock is released.
    ///
    /// Read-then-delete is deliberately not atomic. Two readers racing on the
    /// same expired key may both observe it before either removes it; both
    /// report not-found and the second removal is a no-op. The removal re-checks
    /// the deadline, so a fresh `set` landing inside the window survives.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();

        {
            let map = self.map.read();
            match map.get(key) {
                None => {
                    self.stats.record_miss();
                    return None;
                }
                Some(entry) if entry.is_live_at(now) => {
                    self.stats.record_hit();
                    return Some(entry.value().to_owned());
                }
                Some(_) => {}
            }
        }

        self.stats.record_lazy_expiration();
        if self.remove_expired(key, now) {
            debug!(key, "Removed expired entry on read");
        }
        None
    }

    /// Remove `key` if present
    ///
    /// Idempotent: deleting a missing key is not an error. Returns whether an
    /// entry (live or expired) was physically removed.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.map.write().remove(key).is_some();
        self.stats.record_delete();
        removed
    }

    /// Run one full sweep now, removing every expired entry
    ///
    /// This is what the [`Reclaimer`](crate::Reclaimer) does on each tick.
    ///
    /// # Returns
    /// * Number of entries removed
    pub fn sweep(&self) -> usize {
        let removed = self.purge_expired(Instant::now());
        self.stats.record_sweep(removed);
        removed
    }

    /// Number of physically present entries, including expired entries that
    /// have not been reclaimed yet
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Check if the store holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Get operation counters
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Remove `key` only if it is still expired at `now`
    fn remove_expired(&self, key: &str, now: Instant) -> bool {
        let mut map = self.map.write();
        match map.get(key) {
            Some(entry) if entry.is_expired_at(now) => map.remove(key).is_some(),
            _ => false,
        }
    }

    /// Whole-map pass under the write lock. Total: only compares deadlines.
    pub(crate) fn purge_expired(&self, now: Instant) -> usize {
        let mut map = self.map.write();
        let before = map.len();
        map.retain(|_, entry| entry.is_live_at(now));
        before - map.len()
    }
}
