//! Cache registry - routes requests to the cache configured for each domain.

use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::cache::clock::{system_clock, SharedClock};
use crate::cache::{Cache, CacheStats};
use crate::config::{default_domains, DomainConfig};
use crate::error::{CacheError, Result};

/// Fixed set of named caches, each with its own capacity and TTL.
///
/// Domains are decided at construction. Operations on a name outside that
/// set never fail: reads miss, writes are dropped, and a warning is logged.
/// Callers that want a hard error use [`CacheRegistry::cache`].
///
/// ## Example
///
/// ```rust
/// use vet_cache::cache::CacheRegistry;
///
/// let registry: CacheRegistry<String> = CacheRegistry::with_defaults().unwrap();
/// registry.set("cases", "case-42", "Canine parvovirus".to_string());
/// assert!(registry.has("cases", "case-42"));
/// assert_eq!(registry.get("casez", "case-42"), None);
/// ```
#[derive(Debug)]
pub struct CacheRegistry<V> {
    caches: HashMap<String, Cache<String, V>>,
}

impl<V: Clone> CacheRegistry<V> {
    /// Builds a registry from a domain table on the system clock.
    pub fn new(domains: &[DomainConfig]) -> Result<Self> {
        Self::with_clock(domains, system_clock())
    }

    /// Builds a registry whose caches all read time from `clock`.
    ///
    /// Fails on an empty table, a duplicated domain name or a zero capacity.
    pub fn with_clock(domains: &[DomainConfig], clock: SharedClock) -> Result<Self> {
        if domains.is_empty() {
            return Err(CacheError::InvalidConfig(
                "at least one domain is required".to_string(),
            ));
        }

        let mut caches = HashMap::with_capacity(domains.len());
        for domain in domains {
            if domain.name.is_empty() {
                return Err(CacheError::InvalidConfig(
                    "domain name cannot be empty".to_string(),
                ));
            }
            if caches.contains_key(&domain.name) {
                return Err(CacheError::InvalidConfig(format!(
                    "domain '{}' configured twice",
                    domain.name
                )));
            }
            let cache = Cache::from_config(domain, clock.clone())?;
            caches.insert(domain.name.clone(), cache);
        }

        info!(domains = caches.len(), "Cache registry initialized");
        Ok(Self { caches })
    }

    /// Registry over the application's default domain table.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&default_domains())
    }

    // == Strict Access ==
    /// Returns the cache for `domain`, or `UnknownDomain`.
    pub fn cache(&self, domain: &str) -> Result<&Cache<String, V>> {
        self.caches
            .get(domain)
            .ok_or_else(|| CacheError::UnknownDomain(domain.to_string()))
    }

    fn lenient(&self, domain: &str, op: &'static str) -> Option<&Cache<String, V>> {
        let cache = self.caches.get(domain);
        if cache.is_none() {
            warn!(domain, op, "ignoring request for unconfigured cache domain");
        }
        cache
    }

    // == Primitives ==
    pub fn get(&self, domain: &str, key: &str) -> Option<V> {
        self.lenient(domain, "get")?.get(key)
    }

    pub fn set(&self, domain: &str, key: impl Into<String>, value: V) {
        if let Some(cache) = self.lenient(domain, "set") {
            cache.set(key.into(), value);
        }
    }

    pub fn has(&self, domain: &str, key: &str) -> bool {
        self.lenient(domain, "has")
            .map(|cache| cache.has(key))
            .unwrap_or(false)
    }

    /// Clears one domain, or every domain when `domain` is `None`.
    pub fn clear(&self, domain: Option<&str>) {
        match domain {
            Some(name) => {
                if let Some(cache) = self.lenient(name, "clear") {
                    cache.clear();
                }
            }
            None => self.clear_all(),
        }
    }

    pub fn clear_all(&self) {
        for cache in self.caches.values() {
            cache.clear();
        }
        info!("All cache domains cleared");
    }

    // == Diagnostics ==
    /// Stats for every domain, keyed by domain name.
    ///
    /// Each domain is snapshotted independently; the map as a whole is not a
    /// consistent cut across domains.
    pub fn stats_all(&self) -> BTreeMap<String, CacheStats> {
        self.caches
            .iter()
            .map(|(name, cache)| (name.clone(), cache.stats()))
            .collect()
    }

    /// Removes expired records from every domain. Returns the total removed.
    pub fn sweep_expired(&self) -> usize {
        self.caches.values().map(|cache| cache.sweep_expired()).sum()
    }

    /// Configured domain names, sorted.
    pub fn domains(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.caches.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.caches.contains_key(domain)
    }
}
