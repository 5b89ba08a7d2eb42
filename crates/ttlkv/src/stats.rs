//! Store operation counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing what the store has been asked to do.
///
/// All counters use relaxed ordering; they are informational and never used
/// to make decisions about the map itself.
#[derive(Debug, Default)]
pub struct StoreStats {
    sets: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    lazy_expirations: AtomicU64,
    deletes: AtomicU64,
    reclaimed: AtomicU64,
    sweeps: AtomicU64,
}

impl StoreStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// An expired entry was observed by a read. Also counts as a miss.
    pub(crate) fn record_lazy_expiration(&self) {
        self.lazy_expirations.fetch_add(1, Ordering::Relaxed);
        self.record_miss();
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sweep(&self, removed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.reclaimed.fetch_add(removed as u64, Ordering::Relaxed);
    }

    /// Total `set` calls
    pub fn sets(&self) -> u64 {
        self.sets.load(Ordering::Relaxed)
    }

    /// Reads that returned a live value
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Reads that found nothing, or found an expired entry
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Reads that found an expired entry and scheduled it for removal
    pub fn lazy_expirations(&self) -> u64 {
        self.lazy_expirations.load(Ordering::Relaxed)
    }

    /// Total explicit `delete` calls
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Entries removed by background sweeps
    pub fn reclaimed(&self) -> u64 {
        self.reclaimed.load(Ordering::Relaxed)
    }

    /// Completed sweeps
    pub fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
