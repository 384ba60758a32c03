//! Expiry Sweep Task
//!
//! Caches expire lazily: a stale record stays in memory until a read or write
//! touches its key. In a long-lived process this task bounds how long dead
//! records are held by removing them on a fixed interval. It never changes
//! what a read returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheRegistry;

/// Spawns a task that sweeps expired records from every domain of `registry`
/// every `interval`.
///
/// The returned handle can be aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(CacheRegistry::<String>::with_defaults()?);
/// let sweep_handle = spawn_sweep_task(registry.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(registry: Arc<CacheRegistry<V>>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = registry.sweep_expired();
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
