//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Timestamps are Unix milliseconds taken from the store's clock; the entry
/// itself never reads the time.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at_ms: u64,
    /// Time to live in milliseconds
    pub ttl_ms: u64,
    /// Estimated footprint counted against capacity
    pub size_bytes: u64,
    /// Number of hits served from this entry
    pub access_count: u64,
    /// Store-wide insertion sequence number
    pub seq: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    pub fn new(value: V, inserted_at_ms: u64, ttl_ms: u64, size_bytes: u64, seq: u64) -> Self {
        Self {
            value,
            inserted_at_ms,
            ttl_ms,
            size_bytes,
            access_count: 0,
            seq,
        }
    }

    /// Timestamp at which the entry stops being live.
    pub fn expires_at_ms(&self) -> u64 {
        self.inserted_at_ms.saturating_add(self.ttl_ms)
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once `now >= inserted_at + ttl`,
    /// so a zero TTL is expired immediately.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms()
    }

    /// Milliseconds since insertion.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.inserted_at_ms)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms().saturating_sub(now_ms)
    }
}
