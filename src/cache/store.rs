//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with byte-based capacity
//! accounting, a pluggable eviction policy and TTL expiration.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::eviction::{create_policy, EvictionPolicy, EvictionStrategy};
use crate::cache::size::{EstimateSize, SizeEstimator};
use crate::cache::stats::{CacheStats, StatsCollector};
use crate::cache::CacheEntry;
use crate::config::CacheConfig;
use crate::error::Result;

// == Entry Info ==
/// Diagnostic view of a single key.
///
/// Every optional field is `None` when `exists` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryInfo {
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub age_ms: Option<u64>,
    pub ttl_ms: Option<u64>,
    pub ttl_remaining_ms: Option<u64>,
    pub access_count: Option<u64>,
}

// == Cache Store ==
/// Single-owner cache table.
///
/// Not synchronized: wrap it in a lock (see [`crate::cache::Cache`]) to share
/// it. The policy tracks exactly the stored keys. `size()`, `count()` and
/// `stats()` cover only live entries: an expired entry still held in the
/// table until a lookup or sweep removes it is not reported, and it is
/// reclaimed before any live entry is evicted for space.
pub struct CacheStore<V, C = SystemClock> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Victim selection for the active strategy
    policy: Box<dyn EvictionPolicy>,
    /// Performance statistics
    stats: StatsCollector,
    estimator: SizeEstimator,
    clock: C,
    /// Capacity in estimated bytes
    max_size_bytes: u64,
    /// Default TTL in seconds for entries without explicit TTL
    default_ttl_secs: u64,
    /// Sum of `size_bytes` over `entries`, expired or not
    total_size_bytes: u64,
    /// No stored entry expires before this instant
    earliest_expiry_ms: u64,
    next_seq: u64,
}

impl<V> CacheStore<V, SystemClock>
where
    V: EstimateSize + Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore reading time from the system clock.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<V, C> CacheStore<V, C>
where
    V: EstimateSize + Clone,
    C: Clock,
{
    /// Creates a new CacheStore with a custom clock.
    ///
    /// Fails on an invalid configuration; nothing is defaulted.
    pub fn with_clock(config: &CacheConfig, clock: C) -> Result<Self> {
        config.validate()?;
        info!(
            max_size_bytes = config.max_size_bytes,
            strategy = %config.eviction_strategy,
            default_ttl_secs = config.default_ttl_secs,
            "initializing cache store"
        );

        Ok(Self {
            entries: HashMap::new(),
            policy: create_policy(config.eviction_strategy),
            stats: StatsCollector::new(),
            estimator: SizeEstimator::new(),
            clock,
            max_size_bytes: config.max_size_bytes,
            default_ttl_secs: config.default_ttl_secs,
            total_size_bytes: 0,
            earliest_expiry_ms: u64::MAX,
            next_seq: 0,
        })
    }

    // == Configure ==
    /// Applies a new capacity, default TTL and eviction strategy.
    ///
    /// Entries are kept. A strategy change rebuilds policy tracking from the
    /// stored keys in insertion order, each with neutral priority. A smaller
    /// capacity drops expired entries, then evicts down to the new limit.
    /// On error nothing changes.
    pub fn configure(&mut self, config: &CacheConfig) -> Result<()> {
        config.validate()?;

        if config.eviction_strategy != self.policy.strategy() {
            info!(
                from = %self.policy.strategy(),
                to = %config.eviction_strategy,
                entries = self.entries.len(),
                "switching eviction strategy"
            );
            self.rebuild_policy(config.eviction_strategy);
        }

        self.max_size_bytes = config.max_size_bytes;
        self.default_ttl_secs = config.default_ttl_secs;

        let evicted = self.evict_until_fits(0);
        if evicted > 0 {
            info!(evicted, max_size_bytes = self.max_size_bytes, "capacity reduced");
        }
        Ok(())
    }

    fn rebuild_policy(&mut self, strategy: EvictionStrategy) {
        let mut live: Vec<(&String, u64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key, entry.seq))
            .collect();
        live.sort_unstable_by_key(|(_, seq)| *seq);

        let mut policy = create_policy(strategy);
        for (key, _) in live {
            policy.on_insert(key);
        }
        self.policy = policy;
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the old entry is removed first so its size
    /// is not counted twice. If the value does not fit, expired entries are
    /// dropped first; live entries are then evicted through the active policy
    /// until it does. A value larger than the whole capacity is
    /// still stored, after everything else has been evicted.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl_secs` - Optional TTL in seconds (uses the default TTL if None)
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl_secs: Option<u64>) {
        let key = key.into();

        let estimate = self.estimator.estimate(&value);
        if estimate.fallback {
            self.stats.record_size_fallback();
        }
        let size = estimate.bytes;

        if self.remove_entry(&key).is_some() {
            debug!(key = %key, "overwriting existing entry");
        }

        if size > self.max_size_bytes {
            warn!(
                key = %key,
                size_bytes = size,
                max_size_bytes = self.max_size_bytes,
                "value exceeds cache capacity; storing it alone"
            );
        }
        self.evict_until_fits(size);

        let ttl_ms = ttl_secs
            .unwrap_or(self.default_ttl_secs)
            .saturating_mul(1000);
        let seq = self.next_seq;
        self.next_seq += 1;

        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_ms, size, seq);
        self.total_size_bytes += size;
        self.earliest_expiry_ms = self.earliest_expiry_ms.min(entry.expires_at_ms());
        self.policy.on_insert(&key);
        debug!(key = %key, size_bytes = size, ttl_ms, "SET");
        self.entries.insert(key, entry);
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired. Expired entries are
    /// removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        match self.entries.get_mut(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                entry.access_count += 1;
                let value = entry.value.clone();
                self.policy.on_access(key);
                self.stats.record_hit();
                debug!(key, "GET hit");
                Some(value)
            }
            Some(_) => {
                self.remove_entry(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                debug!(key, "GET expired");
                None
            }
            None => {
                self.stats.record_miss();
                debug!(key, "GET miss");
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key, returning whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        debug!(key, removed, "DELETE");
        removed
    }

    // == Has ==
    /// Returns true if the key is stored and unexpired.
    ///
    /// Does not touch eviction order or statistics.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Clear ==
    /// Removes every entry and zeroes all statistics.
    pub fn clear(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        self.policy.clear();
        self.total_size_bytes = 0;
        self.earliest_expiry_ms = u64::MAX;
        self.stats.reset();
        info!(removed, "cache cleared");
    }

    /// Live (unexpired) keys in unspecified order.
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now_ms();
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Total estimated bytes of live entries.
    pub fn size(&self) -> u64 {
        self.live_totals().0
    }

    /// Number of live entries.
    pub fn count(&self) -> usize {
        self.live_totals().1
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Bytes and count of unexpired entries.
    ///
    /// O(1) until the earliest stored expiry passes, then a scan until the
    /// expired entries are removed.
    fn live_totals(&self) -> (u64, usize) {
        let now = self.clock.now_ms();
        if now < self.earliest_expiry_ms {
            return (self.total_size_bytes, self.entries.len());
        }
        self.entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .fold((0, 0), |(bytes, count), entry| (bytes + entry.size_bytes, count + 1))
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn strategy(&self) -> EvictionStrategy {
        self.policy.strategy()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total_size_bytes, entry_count) = self.live_totals();
        self.stats.snapshot(total_size_bytes, entry_count)
    }

    // == Entry Info ==
    pub fn entry_info(&self, key: &str) -> EntryInfo {
        let now = self.clock.now_ms();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => EntryInfo {
                exists: true,
                size_bytes: Some(entry.size_bytes),
                age_ms: Some(entry.age_ms(now)),
                ttl_ms: Some(entry.ttl_ms),
                ttl_remaining_ms: Some(entry.ttl_remaining_ms(now)),
                access_count: Some(entry.access_count),
            },
            _ => EntryInfo::default(),
        }
    }

    // == Prune To Size ==
    /// Evicts entries through the active policy until `size() <= target_bytes`.
    ///
    /// Expired entries are dropped before any live entry is evicted; they
    /// count as expirations. Returns the number of live entries evicted.
    pub fn prune_to_size(&mut self, target_bytes: u64) -> usize {
        if self.total_size_bytes > target_bytes {
            self.purge_expired();
        }

        let mut evicted = 0;
        while self.total_size_bytes > target_bytes && !self.entries.is_empty() {
            if !self.evict_one() {
                break;
            }
            evicted += 1;
        }
        if evicted > 0 {
            info!(evicted, target_bytes, size_bytes = self.total_size_bytes, "pruned cache");
        }
        evicted
    }

    // == Expiration ==
    /// Copies every stored key, expired or not.
    pub fn keys_snapshot(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Removes `key` if it is stored and expired.
    pub fn remove_if_expired(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now));
        if expired {
            self.remove_entry(key);
            self.stats.record_expiration();
        }
        expired
    }

    /// Removes all expired entries in one pass.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        if now < self.earliest_expiry_ms {
            return 0;
        }

        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
            self.stats.record_expiration();
        }
        self.earliest_expiry_ms = self
            .entries
            .values()
            .map(CacheEntry::expires_at_ms)
            .min()
            .unwrap_or(u64::MAX);

        if !expired_keys.is_empty() {
            debug!(removed = expired_keys.len(), "purged expired entries");
        }
        expired_keys.len()
    }

    // == Removal Path ==
    /// The only place entries leave the table.
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.total_size_bytes -= entry.size_bytes;
        self.policy.on_remove(key);
        Some(entry)
    }

    /// Evicts until `incoming` more bytes fit or the table is empty.
    ///
    /// Expired entries go first, without consulting the policy.
    fn evict_until_fits(&mut self, incoming: u64) -> usize {
        if self.total_size_bytes.saturating_add(incoming) > self.max_size_bytes {
            self.purge_expired();
        }

        let mut evicted = 0;
        while self.total_size_bytes.saturating_add(incoming) > self.max_size_bytes
            && !self.entries.is_empty()
        {
            if !self.evict_one() {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    /// Removes the policy's victim. False only on a policy defect.
    fn evict_one(&mut self) -> bool {
        loop {
            let Some(victim) = self.policy.select_victim() else {
                error!(
                    entries = self.entries.len(),
                    strategy = %self.policy.strategy(),
                    "eviction policy returned no victim for a non-empty cache"
                );
                debug_assert!(false, "eviction policy out of sync with store");
                return false;
            };

            if let Some(entry) = self.remove_entry(&victim) {
                self.stats.record_eviction();
                debug!(key = %victim, size_bytes = entry.size_bytes, "evicted");
                return true;
            }

            // Tracked but not stored: drop it and ask again
            error!(key = %victim, "eviction policy tracked a key missing from the store");
            self.policy.on_remove(&victim);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_len(&self) -> usize {
        self.policy.len()
    }

    /// Entries held in the table, expired or not.
    #[cfg(test)]
    pub(crate) fn stored_len(&self) -> usize {
        self.entries.len()
    }
}

impl<V, C> fmt::Debug for CacheStore<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("entries", &self.entries.len())
            .field("strategy", &self.policy.strategy())
            .field("total_size_bytes", &self.total_size_bytes)
            .field("max_size_bytes", &self.max_size_bytes)
            .finish()
    }
}
