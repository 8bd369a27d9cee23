//! Cache Janitor
//!
//! Background task that periodically removes expired cache entries.
//! Reads already hide expired entries, so this only reclaims memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that sweeps expired entries every `period`.
///
/// The task runs in an infinite loop; the sweep itself happens under the
/// store's lock, so it never observes an entry mid-update.
///
/// # Arguments
/// * `cache` - Shared cache to sweep
/// * `period` - Delay between sweeps; the service uses the cache TTL
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheStore::<String>::new(100, ttl));
/// let janitor = spawn_janitor_task(cache.clone(), ttl);
/// // Later, during shutdown:
/// janitor.abort();
/// ```
pub fn spawn_janitor_task<V>(cache: Arc<CacheStore<V>>, period: Duration) -> JoinHandle<()>
where
    V: Clone + Send + 'static,
{
    tokio::spawn(async move {
        info!("Starting cache janitor with period of {:?}", period);

        loop {
            tokio::time::sleep(period).await;

            let removed = cache.purge_expired();

            if removed > 0 {
                info!("Cache janitor: removed {} expired entries", removed);
            } else {
                debug!("Cache janitor: no expired entries found");
            }
        }
    })
}
