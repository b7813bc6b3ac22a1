//! API Module
//!
//! The read-through layer between the app's screens and the backend.
//!
//! # Pattern
//! - Reads: cache first, fetch on miss, write the result back
//! - Mutations: remove affected keys, then call the backend
//! - Logout: clear the whole cache

pub mod fetch;
pub mod keys;
pub mod service;

pub use fetch::{Fetcher, HttpFetcher};
pub use service::VideoService;
