//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Stats Collector ==
/// Running counters owned by the store.
#[derive(Debug, Clone, Default)]
pub struct StatsCollector {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
    size_estimate_fallbacks: u64,
}

impl StatsCollector {
    // == Constructor ==
    /// Creates a new collector with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts an entry removed to satisfy capacity.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Counts an entry removed because its TTL elapsed.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    /// Counts a value sized with the fallback constant.
    pub fn record_size_fallback(&mut self) {
        self.size_estimate_fallbacks += 1;
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Snapshot ==
    /// Combines the counters with the store's live size figures.
    pub fn snapshot(&self, total_size_bytes: u64, entry_count: usize) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            expirations: self.expirations,
            size_estimate_fallbacks: self.size_estimate_fallbacks,
            total_size_bytes,
            entry_count,
            hit_rate: self.hit_rate(),
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of cache performance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed to satisfy capacity
    pub evictions: u64,
    /// Number of entries removed after their TTL elapsed
    pub expirations: u64,
    /// Number of values sized with the fallback constant
    pub size_estimate_fallbacks: u64,
    /// Estimated bytes held by stored entries
    pub total_size_bytes: u64,
    /// Current number of entries in the cache
    pub entry_count: usize,
    /// hits / (hits + misses), 0.0 before any lookup
    pub hit_rate: f64,
}
