//! Error types for the instrumented cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache, its store backends and replay.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Connection or transport failure against the key-value store
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store understood the command but refused it (e.g. wrong type)
    #[error("Store rejected command: {0}")]
    StoreRejected(String),

    /// A stored value could not be decoded into the requested type
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Key has no value in the store
    #[error("Key not found: {0}")]
    AbsentKey(String),

    /// Writing a report to its output failed
    #[error("Output error: {0}")]
    Output(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Output(err.to_string())
    }
}

// == Redis Error Conversion ==
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout()
        {
            CacheError::StoreUnavailable(err.to_string())
        } else {
            CacheError::StoreRejected(err.to_string())
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
