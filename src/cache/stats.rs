//! Cache Statistics Module
//!
//! Hit/miss accounting for a single cache and the snapshot reported to
//! diagnostics.

use serde::Serialize;

// == Cache Counters ==
/// Running counters owned by a cache. Reset only by `clear`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheCounters {
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a miss. Absent keys and expired records both land here.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Snapshot ==
    /// Builds the reported stats for a cache currently holding `size` records.
    pub fn snapshot(&self, size: usize) -> CacheStats {
        let total_requests = self.hits + self.misses;
        CacheStats {
            size,
            hit_rate: hit_rate_percent(self.hits, total_requests),
            total_requests,
            hit_count: self.hits,
            miss_count: self.misses,
            evictions: self.evictions,
        }
    }
}

// == Cache Stats ==
/// Point-in-time statistics for one cache.
///
/// `size` counts every physically present record, including expired ones
/// that have not been touched since they went stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    /// Whole-number percentage in 0..=100
    pub hit_rate: u32,
    pub total_requests: u64,
    pub hit_count: u64,
    pub miss_count: u64,
    pub evictions: u64,
}

// == Hit Rate ==
/// `round(100 * hits / total)`, rounding halves up; 0 when there were no requests.
pub fn hit_rate_percent(hits: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let hits = hits as u128;
    let total = total as u128;
    ((200 * hits + total) / (2 * total)) as u32
}
