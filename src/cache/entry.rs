//! Cache Entry Module
//!
//! Defines the record stored for each key, with the timestamps used for
//! TTL expiry and LRU ordering.

use std::time::Duration;

// == Cache Entry ==
/// A single stored value and its bookkeeping timestamps.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Write timestamp (Unix milliseconds), drives TTL expiry
    pub stored_at: u64,
    /// Last successful read (Unix milliseconds), drives LRU ordering
    pub last_accessed_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh record written at `now`.
    pub fn new(value: V, now: u64) -> Self {
        Self {
            value,
            stored_at: now,
            last_accessed_at: now,
        }
    }

    // == Is Expired ==
    /// Checks whether the record has outlived `ttl` at time `now`.
    ///
    /// Boundary condition: a record is still fresh when exactly `ttl` has
    /// elapsed and expires strictly after that.
    pub fn is_expired(&self, now: u64, ttl: Duration) -> bool {
        now.saturating_sub(self.stored_at) > ttl.as_millis() as u64
    }

    // == Touch ==
    /// Records a successful read at `now`.
    ///
    /// `last_accessed_at` never moves below `stored_at`, even if the clock
    /// stepped backwards.
    pub fn touch(&mut self, now: u64) {
        self.last_accessed_at = now.max(self.stored_at);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(100);

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("value", 1_000);

        assert_eq!(entry.value, "value");
        assert_eq!(entry.stored_at, 1_000);
        assert_eq!(entry.last_accessed_at, 1_000);
        assert!(!entry.is_expired(1_000, TTL));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("value", 0);

        assert!(!entry.is_expired(99, TTL));
        assert!(!entry.is_expired(100, TTL), "exactly ttl elapsed is still fresh");
        assert!(entry.is_expired(101, TTL));
    }

    #[test]
    fn test_touch_updates_last_access_only() {
        let mut entry = CacheEntry::new("value", 10);
        entry.touch(50);

        assert_eq!(entry.stored_at, 10);
        assert_eq!(entry.last_accessed_at, 50);
        // Expiry is measured from the write, not the read
        assert!(entry.is_expired(111, TTL));
    }

    #[test]
    fn test_touch_never_precedes_store() {
        let mut entry = CacheEntry::new("value", 500);
        entry.touch(400);
        assert_eq!(entry.last_accessed_at, 500);
    }

    #[test]
    fn test_clock_behind_store_is_not_expired() {
        let entry = CacheEntry::new("value", 500);
        assert!(!entry.is_expired(100, TTL));
    }
}
