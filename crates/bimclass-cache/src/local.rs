//! Local in-memory tier using moka.
//!
//! Bounded entry count with LRU eviction and a sliding idle expiry: every
//! read pushes the deadline out again. Nothing here knows about write time.

use std::time::Duration;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

/// Process-local cache tier keyed by pattern hash.
pub struct LocalTier<V> {
    cache: Cache<String, V>,
}

impl<V> LocalTier<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a tier holding at most `max_entries`, each expiring after
    /// `idle` without a read or write.
    pub fn new(max_entries: u64, idle: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(idle)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { cache }
    }

    /// Get a value, resetting its idle timer.
    pub fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key)
    }

    /// Insert or replace a value.
    pub fn insert(&self, key: String, value: V) {
        self.cache.insert(key, value);
    }

    /// Remove a value. Removing an absent key is a no-op.
    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }

    /// Entry count after flushing moka's pending maintenance.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
