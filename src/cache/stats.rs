//! Cache Statistics Module
//!
//! Tracks cache effectiveness: hits, misses, lazy expirations and the store
//! failures that were swallowed along the way.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing how the cache has behaved so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads answered with a fresh entry
    pub hits: u64,
    /// Reads that found nothing usable (absent, stale, corrupt, or failed)
    pub misses: u64,
    /// Stale entries evicted on read or by an explicit purge
    pub expirations: u64,
    /// Store operations that failed and were swallowed
    pub store_errors: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expirations ==
    /// Adds `count` evicted stale entries.
    pub fn record_expirations(&mut self, count: u64) {
        self.expirations += count;
    }

    // == Record Store Error ==
    /// Increments the swallowed store failure counter.
    pub fn record_store_error(&mut self) {
        self.store_errors += 1;
    }
}
