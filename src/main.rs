//! Mini Cache - workload driver
//!
//! Runs a deterministic synthetic get/set workload against a cache built from
//! environment configuration and logs statistics after every round.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::{Cache, CacheConfig};

/// Distinct keys the workload draws from
const KEYSPACE: u64 = 4_096;

/// Lookups per round
const OPS_PER_ROUND: u64 = 2_000;

/// Time between rounds
const ROUND_INTERVAL: Duration = Duration::from_secs(1);

/// Main entry point for the workload driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache, which starts its expiration sweeper
/// 4. Run workload rounds on a timer
/// 5. Stop the sweeper on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env().context("loading cache configuration")?;
    info!(
        "Configuration loaded: max_size_bytes={}, strategy={}, default_ttl={}s, sweep_interval={}s",
        config.max_size_bytes,
        config.eviction_strategy,
        config.default_ttl_secs,
        config.sweep_interval_secs
    );

    let cache: Cache<String> = Cache::new(config).context("creating cache")?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(ROUND_INTERVAL);
    let mut round: u64 = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                run_round(&cache, round);
                let stats = cache.stats();
                info!(
                    round,
                    entries = stats.entry_count,
                    size_bytes = stats.total_size_bytes,
                    hits = stats.hits,
                    misses = stats.misses,
                    evictions = stats.evictions,
                    expirations = stats.expirations,
                    hit_rate = stats.hit_rate,
                    "workload round complete"
                );
                round += 1;
            }
        }
    }

    cache.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// One round of read-through traffic over a skewed keyspace.
fn run_round(cache: &Cache<String>, round: u64) {
    for op in 0..OPS_PER_ROUND {
        // Squaring skews traffic toward low key ids
        let spread = (op * 7_919 + round * 104_729) % KEYSPACE;
        let id = spread * spread / KEYSPACE;
        let key = format!("item:{id}");

        if cache.get(&key).is_none() {
            let value = "v".repeat(64 + (id % 960) as usize);
            cache.set(key, value, Some(30 + id % 300));
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
