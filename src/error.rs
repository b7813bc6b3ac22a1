//! Error types for the cache and its callers
//!
//! Provides unified error handling using thiserror. Store errors never leave
//! the cache; API errors are surfaced to whoever asked for the data.

use thiserror::Error;

// == Store Error Enum ==
/// Failure reported by a persistent key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying file or device I/O failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store's own on-disk document could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store refused the operation (quota, closed, simulated outage)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// == API Error Enum ==
/// Failure while talking to the remote backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Backend returned {status} for {path}")]
    Status { status: u16, path: String },

    /// The response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request body could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(serde_json::Error),
}

// == Result Type Aliases ==
/// Convenience Result type for store adapters.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Convenience Result type for the read-through layer.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
