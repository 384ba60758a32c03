//! Cached Loader Module
//!
//! Serves a value from its domain cache or runs a producer and writes the
//! result through before handing it back.
//!
//! The producer runs on its own tokio task. Dropping the future returned by
//! `load` (the requester went away) stops delivery but not population: the
//! task finishes, caches a successful result for later callers, and its
//! output is discarded.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::CacheRegistry;
use crate::error::LoadError;

// == Cached Loader ==
/// Read-through loader over a registry.
///
/// Concurrent misses on the same key each run their own producer; use
/// [`CoalescingLoader`] to share one.
#[derive(Debug)]
pub struct CachedLoader<V> {
    registry: Arc<CacheRegistry<V>>,
}

impl<V> Clone for CachedLoader<V> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<V> CachedLoader<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(registry: Arc<CacheRegistry<V>>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CacheRegistry<V>> {
        &self.registry
    }

    // == Load ==
    /// Returns the cached value for `(domain, key)`, or runs `producer`,
    /// caches its value and returns it.
    ///
    /// A producer error comes back as `LoadError::Producer` and nothing is
    /// cached. There are no retries.
    pub async fn load<F, Fut, E>(
        &self,
        domain: &str,
        key: &str,
        producer: F,
    ) -> Result<V, LoadError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Send + 'static,
    {
        if let Some(value) = self.registry.get(domain, key) {
            debug!(domain, key, "load served from cache");
            return Ok(value);
        }

        debug!(domain, key, "cache miss, running producer");
        let handle = spawn_populate(
            Arc::clone(&self.registry),
            domain.to_string(),
            key.to_string(),
            producer(),
            None,
        );
        join_load(handle).await
    }
}

// == Coalescing Loader ==
type InFlight<V, E> = Shared<BoxFuture<'static, Result<V, LoadError<E>>>>;
type Slot = (String, String);

/// Loader that runs at most one producer per `(domain, key)` at a time.
///
/// Callers that miss while a producer for the same key is running wait for
/// that producer instead of starting their own, and all receive its result.
/// The slot is released once the value is cached or the producer failed,
/// panicked or was torn down; the next miss then starts a fresh run.
pub struct CoalescingLoader<V, E> {
    registry: Arc<CacheRegistry<V>>,
    in_flight: Arc<Mutex<HashMap<Slot, InFlight<V, E>>>>,
}

impl<V, E> Clone for CoalescingLoader<V, E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<V, E> std::fmt::Debug for CoalescingLoader<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoalescingLoader")
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}

impl<V, E> CoalescingLoader<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(registry: Arc<CacheRegistry<V>>) -> Self {
        Self {
            registry,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &Arc<CacheRegistry<V>> {
        &self.registry
    }

    /// Number of producers currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    // == Load ==
    /// Same contract as [`CachedLoader::load`], with concurrent misses on one
    /// key sharing a single producer run. `producer` is not called when the
    /// caller joins a run that is already in flight.
    pub async fn load<F, Fut>(
        &self,
        domain: &str,
        key: &str,
        producer: F,
    ) -> Result<V, LoadError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        // The slot lock covers the cache read so a run cannot finish between
        // our miss and the slot check. One counted read per call.
        let shared = {
            let mut in_flight = self.in_flight.lock();

            if let Some(value) = self.registry.get(domain, key) {
                debug!(domain, key, "load served from cache");
                return Ok(value);
            }

            let slot: Slot = (domain.to_string(), key.to_string());
            if let Some(running) = in_flight.get(&slot) {
                debug!(domain, key, "joining in-flight load");
                running.clone()
            } else {
                debug!(domain, key, "cache miss, running producer");
                self.start(&mut in_flight, slot, producer())
            }
        };

        shared.await
    }

    // The slot map lock is held across spawn so the task cannot release its
    // slot before the slot exists.
    fn start<Fut>(
        &self,
        in_flight: &mut HashMap<Slot, InFlight<V, E>>,
        slot: Slot,
        fut: Fut,
    ) -> InFlight<V, E>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let slots = Arc::clone(&self.in_flight);
        let finished = slot.clone();
        let release: Release = Box::new(move || {
            slots.lock().remove(&finished);
        });
        let handle = spawn_populate(
            Arc::clone(&self.registry),
            slot.0.clone(),
            slot.1.clone(),
            fut,
            Some(release),
        );
        let shared = join_load(handle).boxed().shared();
        in_flight.insert(slot, shared.clone());
        shared
    }
}

/// Hook run by the populate task once it is done with the cache.
type Release = Box<dyn FnOnce() + Send + 'static>;

/// Runs the release hook when dropped, so a panicking or aborted producer
/// still gives up its slot.
struct ReleaseGuard(Option<Release>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if let Some(release) = self.0.take() {
            release();
        }
    }
}

// == Helpers ==
/// Runs the producer on its own task and writes a successful result through
/// to the registry before the task completes.
fn spawn_populate<V, E, Fut>(
    registry: Arc<CacheRegistry<V>>,
    domain: String,
    key: String,
    fut: Fut,
    release: Option<Release>,
) -> JoinHandle<Result<V, E>>
where
    V: Clone + Send + Sync + 'static,
    E: Send + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    tokio::spawn(async move {
        let _release = ReleaseGuard(release);
        let result = fut.await;

        match &result {
            Ok(value) => {
                registry.set(&domain, key.as_str(), value.clone());
                debug!(domain = %domain, key = %key, "producer succeeded, cache populated");
            }
            Err(_) => {
                debug!(domain = %domain, key = %key, "producer failed, nothing cached");
            }
        }

        result
    })
}

/// Waits for a populate task. A producer panic is resumed on the caller.
async fn join_load<V, E>(handle: JoinHandle<Result<V, E>>) -> Result<V, LoadError<E>> {
    match handle.await {
        Ok(result) => result.map_err(LoadError::Producer),
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(_) => Err(LoadError::Aborted),
    }
}
