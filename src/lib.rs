//! Mini Cache - An in-process byte-bounded cache
//!
//! Provides a generic key-value cache with TTL expiration, a background
//! expiration sweeper and LRU / FIFO / LFU eviction.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, CacheStore, EntryInfo, EvictionStrategy};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweeper;
