//! Two-tier cache for classification results.
//!
//! Local tier (moka, LRU + sliding idle expiry) → shared tier (fixed TTL from
//! write, behind `ISharedCacheTier`). Writes go to both tiers. Misses can be
//! resolved through `TieredCache::get_or_compute`, which runs at most one
//! computation per key in this process and uses an expiring shared-tier lease
//! to coordinate across processes.

pub mod coordinator;
mod lease;
pub mod local;
pub mod shared;
mod single_flight;
pub mod stats;

pub use coordinator::TieredCache;
pub use local::LocalTier;
pub use shared::InMemorySharedTier;
pub use stats::{CacheStats, CacheTier, ComputeMode, ComputeOrigin, ComputeOutcome, Lookup};
