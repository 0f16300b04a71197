//! Cache Statistics Module
//!
//! Tracks read-through efficiency and write-back volume of a cache layer.

use serde::Serialize;

// == Cache Stats ==
/// Counters and gauges for one cache layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of reads served from this layer
    pub hits: u64,
    /// Number of reads that fell through to the parent
    pub misses: u64,
    /// Number of keys replayed into the parent by writes
    pub writes_flushed: u64,
    /// Number of clean entries dropped by clear-through
    pub clean_cleared: u64,
    /// Current number of cached entries, clean and dirty
    pub cached_entries: usize,
    /// Current number of pending writes
    pub pending_writes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_flushed(&mut self, count: usize) {
        self.writes_flushed += count as u64;
    }

    pub fn record_cleared(&mut self, count: usize) {
        self.clean_cleared += count as u64;
    }

    /// Returns the number of clean (read-through) entries.
    pub fn clean_entries(&self) -> usize {
        self.cached_entries.saturating_sub(self.pending_writes)
    }
}
