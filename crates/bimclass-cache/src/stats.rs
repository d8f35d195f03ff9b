//! Lookup results, compute outcomes, and cache statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use bimclass_core::models::hit_rate;

/// Which tier answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    Local,
    Shared,
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Shared => f.write_str("shared"),
        }
    }
}

/// A cache hit and the tier that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<V> {
    pub value: V,
    pub tier: CacheTier,
}

/// How `get_or_compute` treats existing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeMode {
    /// Serve an existing entry if there is one.
    #[default]
    ReadThrough,
    /// Ignore existing entries, recompute, and overwrite both tiers.
    Refresh,
}

/// Where a `get_or_compute` value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeOrigin {
    Cached(CacheTier),
    /// This caller ran the computation.
    Computed,
    /// Another caller in this process ran it; this one waited.
    Joined,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComputeOutcome<V> {
    pub value: V,
    pub origin: ComputeOrigin,
}

/// Point-in-time cache statistics.
///
/// `hits`/`misses` count keys looked up through `get`/`get_many`.
/// `item_count` is the local tier's entry count; the shared tier is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub item_count: u64,
    pub local_hits: u64,
    pub shared_hits: u64,
    /// Shared-tier calls that failed and were degraded to a miss or skipped.
    pub shared_failures: u64,
    /// Computations run by this process through `get_or_compute`.
    pub computations: u64,
    /// Keys with a computation currently in flight in this process.
    pub in_flight: u64,
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    local_hits: AtomicU64,
    shared_hits: AtomicU64,
    misses: AtomicU64,
    shared_failures: AtomicU64,
    computations: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn record_hit(&self, tier: CacheTier) {
        match tier {
            CacheTier::Local => self.local_hits.fetch_add(1, Ordering::Relaxed),
            CacheTier::Shared => self.shared_hits.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub(crate) fn record_misses(&self, n: u64) {
        self.misses.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn record_shared_failure(&self) {
        self.shared_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, item_count: u64, in_flight: u64) -> CacheStats {
        let local_hits = self.local_hits.load(Ordering::Relaxed);
        let shared_hits = self.shared_hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let hits = local_hits + shared_hits;
        CacheStats {
            hits,
            misses,
            hit_rate: hit_rate(hits, hits + misses),
            item_count,
            local_hits,
            shared_hits,
            shared_failures: self.shared_failures.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            in_flight,
        }
    }
}
