//! Cache Module
//!
//! Persistent, time-boxed caching with lazy expiry and batch operations.

mod entry;
mod stats;
mod timed;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use timed::{TimedCache, DEFAULT_TTL};
