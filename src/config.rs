//! Configuration Module
//!
//! Handles loading, validating and managing cache configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::EvictionStrategy;
use crate::error::{CacheError, Result};

/// Default capacity: 64 MiB of estimated value bytes
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// Default TTL applied when `set` is called without one
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Default interval between background expiration sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Default number of keys checked per sweeper critical section
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = 256;

/// Cache configuration parameters.
///
/// Can be built in code, deserialized, or loaded from environment variables.
/// Call [`CacheConfig::validate`] (the cache constructors do) before use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Capacity in estimated bytes
    pub max_size_bytes: u64,
    /// Which entry to drop when capacity is exceeded
    pub eviction_strategy: EvictionStrategy,
    /// TTL in seconds for entries set without an explicit TTL
    pub default_ttl_secs: u64,
    /// Background sweeper interval in seconds
    pub sweep_interval_secs: u64,
    /// Keys examined per sweeper lock acquisition
    pub sweep_batch_size: usize,
}

impl CacheConfig {
    /// Creates a config with the given capacity and strategy, other fields defaulted.
    pub fn new(max_size_bytes: u64, eviction_strategy: EvictionStrategy) -> Self {
        Self {
            max_size_bytes,
            eviction_strategy,
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE_BYTES` - Capacity in bytes (default: 64 MiB)
    /// - `CACHE_EVICTION_STRATEGY` - `lru`, `fifo` or `lfu` (default: lru)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_SWEEP_INTERVAL` - Sweeper frequency in seconds (default: 60)
    /// - `CACHE_SWEEP_BATCH_SIZE` - Keys per sweep batch (default: 256)
    ///
    /// Unset variables take their default. A variable that is set but does not
    /// parse is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            max_size_bytes: env_or("CACHE_MAX_SIZE_BYTES", defaults.max_size_bytes)?,
            eviction_strategy: match env::var("CACHE_EVICTION_STRATEGY") {
                Ok(raw) => raw.parse()?,
                Err(_) => defaults.eviction_strategy,
            },
            default_ttl_secs: env_or("CACHE_DEFAULT_TTL", defaults.default_ttl_secs)?,
            sweep_interval_secs: env_or("CACHE_SWEEP_INTERVAL", defaults.sweep_interval_secs)?,
            sweep_batch_size: env_or("CACHE_SWEEP_BATCH_SIZE", defaults.sweep_batch_size)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every field, returning the first configuration error found.
    pub fn validate(&self) -> Result<()> {
        if self.max_size_bytes == 0 {
            return Err(CacheError::InvalidCapacity(self.max_size_bytes));
        }
        if self.sweep_interval_secs == 0 {
            return Err(CacheError::Configuration(
                "sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.sweep_batch_size == 0 {
            return Err(CacheError::Configuration(
                "sweep_batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Sweeper interval as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            eviction_strategy: EvictionStrategy::Lru,
            default_ttl_secs: DEFAULT_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            sweep_batch_size: DEFAULT_SWEEP_BATCH_SIZE,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            CacheError::Configuration(format!("{name} has an invalid value: {raw:?}"))
        }),
        Err(_) => Ok(default),
    }
}
