use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::CacheError;

/// The distributed cache tier shared by every process.
///
/// Values are opaque bytes with a fixed TTL from write; reads never extend
/// it. Leases provide the atomic check-and-set that makes single-flight hold
/// across processes, and expire on their own so a crashed holder cannot
/// wedge a key.
#[async_trait]
pub trait ISharedCacheTier: Send + Sync {
    /// Fetch several keys in one round trip. Missing or expired keys are absent.
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a key. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Atomically take the compute lease for `key` if nobody holds a live one.
    async fn try_acquire_lease(
        &self,
        key: &str,
        owner: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError>;

    /// Push the expiry of `owner`'s lease on `key` to `ttl` from now.
    ///
    /// Returns `false` when `owner` no longer holds the lease.
    async fn extend_lease(
        &self,
        key: &str,
        owner: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError>;

    /// Release a lease held by `owner`. A lease held by someone else is left alone.
    async fn release_lease(&self, key: &str, owner: &str) -> Result<(), CacheError>;

    /// Tier name for logs and degradation events.
    fn name(&self) -> &str;
}
