//! Vet Cache - Domain-scoped in-process caches
//!
//! A fixed set of named caches ("cases", "resources", ...) each bounded in
//! size and age, with LRU eviction, hit/miss accounting and a cached-load
//! coordinator that is safe against requesters going away mid-fetch.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheRegistry, CachedLoader, CoalescingLoader};
pub use config::{default_domains, Config, DomainConfig};
pub use error::{CacheError, LoadError};
pub use tasks::spawn_sweep_task;
