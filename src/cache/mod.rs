//! Cache Module
//!
//! Provides in-memory caching with byte-based capacity, TTL expiration and
//! LRU / FIFO / LFU eviction.

mod clock;
mod entry;
pub mod eviction;
mod handle;
pub mod size;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use eviction::{create_policy, EvictionPolicy, EvictionStrategy};
pub use handle::Cache;
pub use size::{EstimateSize, Footprint, Opaque, SizeEstimator, Structured};
pub use stats::{CacheStats, StatsCollector};
pub use store::{CacheStore, EntryInfo};
