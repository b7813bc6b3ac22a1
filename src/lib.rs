//! Feed Cache - A persistent, time-boxed client cache
//!
//! Caches read-heavy backend responses (video feed, trending lists, profiles)
//! in a persistent key-value store, expires them lazily after a fixed TTL, and
//! lets callers invalidate entries when their writes make them outdated.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::VideoService;
pub use cache::TimedCache;
pub use config::Config;
