//! Cache Store Module
//!
//! Bounded, expiring key-value storage with LRU eviction. `CacheStore` holds
//! the state and takes the current time as an argument; `Cache` wraps it in a
//! lock with a clock so it can be shared between callers.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::clock::{system_clock, SharedClock};
use crate::cache::{CacheCounters, CacheEntry, CacheStats, LruTracker};
use crate::config::DomainConfig;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Unsynchronized cache state. Every operation is told what time it is.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Hit/miss/eviction counters
    counters: CacheCounters,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Maximum age of a record
    ttl: Duration,
    /// Latest time any operation has seen; timestamps never go below it
    latest: u64,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// A zero capacity leaves eviction undefined and is rejected.
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::new(),
            counters: CacheCounters::new(),
            capacity,
            ttl,
            latest: 0,
        })
    }

    // A clock that steps backwards is read as standing still, so recorded
    // access times stay in the same order as the LRU deque.
    fn observe(&mut self, now: u64) -> u64 {
        self.latest = self.latest.max(now);
        self.latest
    }

    // == Get ==
    /// Returns a clone of the value if present and fresh at `now`.
    ///
    /// Expired records are removed on the spot and counted as misses.
    pub fn get<Q>(&mut self, key: &Q, now: u64) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.observe(now);
        let expired = match self.entries.get(key) {
            None => {
                self.counters.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(now, self.ttl),
        };

        if expired {
            if let Some((owned_key, _)) = self.entries.remove_entry(key) {
                self.lru.remove(&owned_key);
            }
            self.counters.record_miss();
            return None;
        }

        let (owned_key, entry) = self.entries.get_key_value(key)?;
        let owned_key = owned_key.clone();
        let value = entry.value.clone();

        if let Some(entry) = self.entries.get_mut(key) {
            entry.touch(now);
        }
        self.lru.touch(&owned_key);
        self.counters.record_hit();
        Some(value)
    }

    // == Set ==
    /// Stores `value` under `key` as a fresh write at `now`.
    ///
    /// Overwriting an existing key replaces the value and both timestamps.
    /// Inserting a new key into a full store evicts the least recently
    /// accessed record first. Returns the evicted key, if any.
    pub fn set(&mut self, key: K, value: V, now: u64) -> Option<K> {
        let now = self.observe(now);
        let mut evicted = None;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            debug_assert!(self.lru_matches_access_times());
            if let Some(oldest) = self.lru.evict_oldest() {
                self.entries.remove(&oldest);
                self.counters.record_eviction();
                evicted = Some(oldest);
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, now));
        evicted
    }

    // == Has ==
    /// Reports whether `key` holds a fresh record at `now`.
    ///
    /// Pure predicate: counters and access times are left alone.
    pub fn has<Q>(&self, key: &Q, now: u64) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = now.max(self.latest);
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired(now, self.ttl))
            .unwrap_or(false)
    }

    // == Clear ==
    /// Drops every record and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.counters.reset();
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }

    // == Sweep Expired ==
    /// Physically removes every record expired at `now`.
    ///
    /// Counters are untouched; nobody asked for these keys.
    /// Returns the number of records removed.
    pub fn sweep_expired(&mut self, now: u64) -> usize {
        let now = self.observe(now);
        let ttl = self.ttl;
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        expired_keys.len()
    }

    // The deque's back holds the record with the smallest `last_accessed_at`.
    fn lru_matches_access_times(&self) -> bool {
        let oldest = match self.lru.peek_oldest().and_then(|key| self.entries.get(key)) {
            Some(entry) => entry.last_accessed_at,
            None => return self.entries.is_empty(),
        };
        self.entries
            .values()
            .all(|entry| entry.last_accessed_at >= oldest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

// == Cache ==
/// Thread-safe cache instance: one lock around one `CacheStore`.
///
/// Each primitive takes the lock once, so callers never observe a
/// half-evicted or half-written state.
#[derive(Debug)]
pub struct Cache<K, V> {
    name: String,
    store: Mutex<CacheStore<K, V>>,
    clock: SharedClock,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Creates a cache on the system clock.
    pub fn new(name: impl Into<String>, capacity: usize, ttl: Duration) -> Result<Self> {
        Self::with_clock(name, capacity, ttl, system_clock())
    }

    pub fn with_clock(
        name: impl Into<String>,
        capacity: usize,
        ttl: Duration,
        clock: SharedClock,
    ) -> Result<Self> {
        let name = name.into();
        let store = CacheStore::new(capacity, ttl)
            .map_err(|err| CacheError::InvalidConfig(format!("{name}: {err}")))?;

        Ok(Self {
            name,
            store: Mutex::new(store),
            clock,
        })
    }

    pub fn from_config(config: &DomainConfig, clock: SharedClock) -> Result<Self> {
        Self::with_clock(config.name.clone(), config.capacity, config.ttl, clock)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + std::fmt::Debug + ?Sized,
    {
        let mut store = self.store.lock();
        let value = store.get(key, self.clock.now_ms());
        debug!(cache = %self.name, ?key, hit = value.is_some(), "cache get");
        value
    }

    pub fn set(&self, key: K, value: V) {
        let mut store = self.store.lock();
        if let Some(evicted) = store.set(key, value, self.clock.now_ms()) {
            debug!(cache = %self.name, ?evicted, "evicted least recently used entry");
        }
    }

    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let store = self.store.lock();
        store.has(key, self.clock.now_ms())
    }

    pub fn clear(&self) {
        self.store.lock().clear();
        debug!(cache = %self.name, "cache cleared");
    }

    /// Snapshot of the counters. Not ordered with respect to concurrent writers.
    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn sweep_expired(&self) -> usize {
        let mut store = self.store.lock();
        store.sweep_expired(self.clock.now_ms())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    pub fn ttl(&self) -> Duration {
        self.store.lock().ttl()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_secs(300);

    fn store(capacity: usize) -> CacheStore<String, String> {
        CacheStore::new(capacity, TTL).unwrap()
    }

    fn set(store: &mut CacheStore<String, String>, key: &str, value: &str, now: u64) {
        store.set(key.to_string(), value.to_string(), now);
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_store_zero_capacity_rejected() {
        let result = CacheStore::<String, String>::new(0, TTL);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        set(&mut store, "case-1", "colic", 0);
        assert_eq!(store.get("case-1", 1), Some("colic".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);

        assert_eq!(store.get("nonexistent", 0), None);
        assert_eq!(store.stats().miss_count, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);

        set(&mut store, "k", "v1", 0);
        set(&mut store, "k", "v2", 10);

        assert_eq!(store.get("k", 11), Some("v2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let mut store: CacheStore<String, String> =
            CacheStore::new(10, Duration::from_millis(100)).unwrap();

        set(&mut store, "k", "v1", 0);
        set(&mut store, "k", "v2", 80);

        assert_eq!(store.get("k", 150), Some("v2".to_string()));
        assert_eq!(store.get("k", 181), None);
    }

    #[test]
    fn test_store_ttl_expiry_boundary() {
        let mut store: CacheStore<String, String> =
            CacheStore::new(10, Duration::from_millis(100)).unwrap();

        set(&mut store, "k", "v", 0);

        assert_eq!(store.get("k", 99), Some("v".to_string()));
        assert_eq!(store.get("k", 101), None);
        assert!(!store.has("k", 101));
        // The expired record was dropped by the read
        assert!(store.is_empty());

        let stats = store.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        set(&mut store, "key1", "value1", 0);
        set(&mut store, "key2", "value2", 1);
        set(&mut store, "key3", "value3", 2);
        let evicted = store.set("key4".to_string(), "value4".to_string(), 3);

        assert_eq!(evicted, Some("key1".to_string()));
        assert_eq!(store.len(), 3);
        assert!(!store.has("key1", 4));
        assert!(store.has("key2", 4));
        assert!(store.has("key3", 4));
        assert!(store.has("key4", 4));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(2);

        set(&mut store, "a", "1", 0);
        set(&mut store, "b", "2", 1);
        store.get("a", 2);
        set(&mut store, "c", "3", 3);

        assert!(!store.has("b", 4), "b was least recently accessed");
        assert!(store.has("a", 4));
        assert!(store.has("c", 4));
    }

    #[test]
    fn test_store_lru_ties_broken_by_operation_order() {
        let mut store = store(2);

        // All at the same millisecond
        set(&mut store, "a", "1", 5);
        set(&mut store, "b", "2", 5);
        let evicted = store.set("c".to_string(), "3".to_string(), 5);

        assert_eq!(evicted, Some("a".to_string()));
    }

    #[test]
    fn test_store_clock_stepping_back_keeps_lru_order() {
        let mut store = store(2);

        set(&mut store, "a", "1", 1_000);
        // Wall clock jumped back
        set(&mut store, "b", "2", 400);
        assert!(store.entries["b"].last_accessed_at >= store.entries["a"].last_accessed_at);

        let evicted = store.set("c".to_string(), "3".to_string(), 600);
        assert_eq!(evicted, Some("a".to_string()));
        assert!(store.has("b", 600));
        assert!(store.has("c", 600));
    }

    #[test]
    fn test_store_clock_stepping_back_does_not_revive_expired() {
        let mut store: CacheStore<String, String> =
            CacheStore::new(10, Duration::from_millis(100)).unwrap();

        set(&mut store, "k", "v", 0);
        set(&mut store, "other", "v", 150);

        assert!(!store.has("k", 50));
        assert_eq!(store.get("k", 50), None);
    }

    #[test]
    fn test_store_overwrite_does_not_evict() {
        let mut store = store(2);

        set(&mut store, "a", "1", 0);
        set(&mut store, "b", "2", 1);
        let evicted = store.set("a".to_string(), "1b".to_string(), 2);

        assert_eq!(evicted, None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_has_is_pure() {
        let mut store = store(2);

        set(&mut store, "a", "1", 0);
        set(&mut store, "b", "2", 1);
        assert!(store.has("a", 2));
        set(&mut store, "c", "3", 3);

        // has() did not refresh "a", so it was still the LRU candidate
        assert!(!store.has("a", 4));
        let stats = store.stats();
        assert_eq!(stats.total_requests, 0);
    }

    #[test]
    fn test_store_expired_record_counts_in_size_until_touched() {
        let mut store: CacheStore<String, String> =
            CacheStore::new(10, Duration::from_millis(100)).unwrap();

        set(&mut store, "k", "v", 0);
        assert!(!store.has("k", 500));
        assert_eq!(store.stats().size, 1);
    }

    #[test]
    fn test_store_clear_resets_counters() {
        let mut store = store(10);

        set(&mut store, "a", "1", 0);
        store.get("a", 1);
        store.get("missing", 1);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats(), CacheStats::default());

        // Clearing an empty store is a no-op
        store.clear();
        assert_eq!(store.stats(), CacheStats::default());
    }

    #[test]
    fn test_store_sweep_expired() {
        let mut store: CacheStore<String, String> =
            CacheStore::new(10, Duration::from_millis(100)).unwrap();

        set(&mut store, "old", "1", 0);
        set(&mut store, "new", "2", 90);

        let removed = store.sweep_expired(150);
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.has("new", 150));
        assert_eq!(store.stats().total_requests, 0);
    }

    #[test]
    fn test_cache_uses_injected_clock() {
        let clock = Arc::new(ManualClock::new(0));
        let cache: Cache<String, u32> =
            Cache::with_clock("quizResults", 4, Duration::from_millis(100), clock.clone())
                .unwrap();

        cache.set("quiz-7".to_string(), 88);
        clock.advance(Duration::from_millis(99));
        assert_eq!(cache.get("quiz-7"), Some(88));

        clock.advance(Duration::from_millis(2));
        assert_eq!(cache.get("quiz-7"), None);
        assert!(!cache.has("quiz-7"));

        let stats = cache.stats();
        assert_eq!((stats.hit_count, stats.miss_count, stats.hit_rate), (1, 1, 50));
    }

    #[test]
    fn test_cache_zero_capacity_names_the_cache() {
        let err = Cache::<String, u32>::new("cases", 0, TTL).unwrap_err();
        match err {
            CacheError::InvalidConfig(msg) => assert!(msg.starts_with("cases:")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
