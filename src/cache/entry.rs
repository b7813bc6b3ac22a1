//! Cache Entry Module
//!
//! Defines the serialized shape of an individual cache entry and its
//! freshness rule.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A cached payload stamped with its write time.
///
/// Stored as `{"data": <T>, "timestamp": <epoch ms>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload, opaque to the cache
    pub data: T,
    /// Write time (Unix milliseconds)
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry written at `now_ms`.
    pub fn new(data: T, now_ms: i64) -> Self {
        Self {
            data,
            timestamp: now_ms,
        }
    }

    // == Is Fresh ==
    /// Checks whether the entry is still within `ttl_ms` at `now_ms`.
    ///
    /// Boundary condition: an entry whose age equals the TTL exactly is
    /// still fresh. It goes stale one millisecond later.
    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) <= ttl_ms
    }

    // == Age ==
    /// Milliseconds since the entry was written, zero if written "in the future".
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp).max(0)
    }
}
