//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Every variant is a configuration-time failure. Lookups never fail: a
/// missing or expired key is reported as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be a positive number of bytes
    #[error("Invalid capacity: max_size_bytes must be greater than zero (got {0})")]
    InvalidCapacity(u64),

    /// Eviction strategy name is not one of lru, fifo, lfu
    #[error("Unknown eviction strategy: {0} (expected one of lru, fifo, lfu)")]
    UnknownStrategy(String),

    /// Any other invalid configuration value
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The background sweeper needs a tokio runtime to run on
    #[error("No tokio runtime available to run the expiration sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
