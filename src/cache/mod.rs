//! Cache Module
//!
//! Domain-scoped in-memory caches with TTL expiration, LRU eviction and a
//! cached-load coordinator.

pub mod clock;
mod entry;
mod loader;
mod lru;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use entry::CacheEntry;
pub use loader::{CachedLoader, CoalescingLoader};
pub use lru::LruTracker;
pub use registry::CacheRegistry;
pub use stats::{hit_rate_percent, CacheCounters, CacheStats};
pub use store::{Cache, CacheStore};

// == Public Constants ==
/// Maximum key length in bytes accepted by the HTTP surface
pub const MAX_KEY_LENGTH: usize = 256;
