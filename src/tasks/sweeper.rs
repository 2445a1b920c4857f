//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::{CacheStore, Clock, EstimateSize};

/// A store shared between foreground callers and the sweeper.
pub type SharedStore<V, C> = Arc<Mutex<CacheStore<V, C>>>;

/// Removes expired entries from `store`, `batch_size` keys per lock.
///
/// Keys are snapshotted under one short lock; each batch then re-checks and
/// removes under its own lock, yielding to the runtime between batches.
///
/// Returns the number of entries removed.
pub async fn sweep_expired<V, C>(store: &SharedStore<V, C>, batch_size: usize) -> usize
where
    V: EstimateSize + Clone,
    C: Clock,
{
    let keys = store.lock().keys_snapshot();
    let mut removed = 0;

    for batch in keys.chunks(batch_size.max(1)) {
        {
            let mut guard = store.lock();
            for key in batch {
                if guard.remove_if_expired(key) {
                    removed += 1;
                }
            }
        }
        tokio::task::yield_now().await;
    }

    removed
}

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The first sweep runs one full `interval` after spawning.
///
/// # Arguments
/// * `runtime` - Runtime the task is spawned on
/// * `store` - Store shared with the owning cache
/// * `interval` - Time between sweeps
/// * `batch_size` - Keys examined per lock acquisition
///
/// # Returns
/// A JoinHandle for the spawned task, aborted by the owner on shutdown.
pub fn spawn_sweeper<V, C>(
    runtime: &Handle,
    store: SharedStore<V, C>,
    interval: Duration,
    batch_size: usize,
) -> JoinHandle<()>
where
    V: EstimateSize + Clone + Send + 'static,
    C: Clock,
{
    runtime.spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            batch_size, "starting expiration sweeper"
        );

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let removed = sweep_expired(&store, batch_size).await;

            if removed > 0 {
                info!(removed, "TTL sweep: removed expired entries");
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
