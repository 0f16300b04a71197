//! Read-Cache Clear Task
//!
//! Background task that bounds the memory held by clean read-through entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::store::ClearThrougher;

/// Spawns a background task that periodically clears clean cache entries.
///
/// Every interval, if the top layer holds more than `max_clean_entries`
/// clean entries, clean entries are dropped from it and every layer below.
/// Pending writes are never touched.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Arc::new(MemStore::new()).cache_wrap());
/// let clear_handle = spawn_clear_task(cache.clone(), 30, 10_000);
/// // Later, during shutdown:
/// clear_handle.abort();
/// ```
pub fn spawn_clear_task(
    cache: Arc<CacheStore>,
    clear_interval_secs: u64,
    max_clean_entries: usize,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(clear_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting read-cache clear task with interval of {} seconds",
            clear_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let clean = cache.stats().clean_entries();
            if clean > max_clean_entries {
                cache.clear_through();
                info!("Read-cache clear: dropped {} clean entries", clean);
            } else {
                debug!("Read-cache clear: {} clean entries, below threshold", clean);
            }
        }
    })
}
