//! Shared Cache Handle
//!
//! Thread-safe front door to a [`CacheStore`] that also owns the store's
//! expiration sweeper.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{CacheStats, CacheStore, Clock, EntryInfo, EstimateSize, SystemClock};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, SharedStore};

// == Cache ==
/// A thread-safe cache with a background expiration sweeper.
///
/// Store, eviction policy and statistics sit behind one mutex, so every
/// operation (including `get`, which may expire an entry and reorders the
/// policy) sees and leaves them consistent.
///
/// # Example
/// ```no_run
/// use mini_cache::{Cache, CacheConfig, EvictionStrategy};
///
/// # async fn run() -> mini_cache::error::Result<()> {
/// let cache: Cache<String> = Cache::new(CacheConfig::new(1024, EvictionStrategy::Lru))?;
/// cache.set("greeting", "hello".to_string(), None);
/// assert_eq!(cache.get("greeting").as_deref(), Some("hello"));
/// cache.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct Cache<V, C = SystemClock> {
    store: SharedStore<V, C>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> Cache<V, SystemClock>
where
    V: EstimateSize + Clone + Send + 'static,
{
    /// Creates a cache on the system clock and starts its sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<V, C> Cache<V, C>
where
    V: EstimateSize + Clone + Send + 'static,
    C: Clock,
{
    /// Creates a cache with a custom clock and starts its sweeper.
    pub fn with_clock(config: CacheConfig, clock: C) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let store = Arc::new(Mutex::new(CacheStore::with_clock(&config, clock)?));
        let sweeper = spawn_sweeper(
            &runtime,
            store.clone(),
            config.sweep_interval(),
            config.sweep_batch_size,
        );

        Ok(Self {
            store,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Reconfigures capacity, strategy and default TTL in place.
    ///
    /// The sweep interval is fixed for the lifetime of the cache.
    pub fn configure(&self, config: &CacheConfig) -> Result<()> {
        self.store.lock().configure(config)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.store.lock().get(key)
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl_secs: Option<u64>) {
        self.store.lock().set(key, value, ttl_secs)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.lock().has(key)
    }

    pub fn clear(&self) {
        self.store.lock().clear()
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.lock().keys()
    }

    /// Total estimated bytes of stored entries.
    pub fn size(&self) -> u64 {
        self.store.lock().size()
    }

    pub fn count(&self) -> usize {
        self.store.lock().count()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn entry_info(&self, key: &str) -> EntryInfo {
        self.store.lock().entry_info(key)
    }

    /// Trims to `target_bytes` in response to external memory pressure.
    pub fn prune_to_size(&self, target_bytes: u64) -> usize {
        self.store.lock().prune_to_size(target_bytes)
    }

    /// Removes every expired entry now instead of waiting for the sweeper.
    pub fn purge_expired(&self) -> usize {
        self.store.lock().purge_expired()
    }

    /// True until [`Cache::shutdown`] has been called.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Shutdown ==
    /// Stops the sweeper and waits for it to finish.
    ///
    /// Once this returns no further sweep runs. Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            // Cancellation is the expected outcome
            let _ = handle.await;
            info!("expiration sweeper stopped");
        }
    }
}

impl<V, C> Drop for Cache<V, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}
