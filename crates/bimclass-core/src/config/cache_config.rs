use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Tiered cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries held by the local tier before LRU eviction.
    pub local_capacity: u64,
    /// Local tier sliding expiration: seconds of inactivity before an entry expires.
    pub local_idle_secs: u64,
    /// Shared tier fixed TTL, counted from the write.
    pub shared_ttl_secs: u64,
    /// Lifetime of a shared-tier compute lease. A crashed holder's lease expires after this.
    pub lease_ttl_secs: u64,
    /// How often a process waiting on another process's lease re-reads the shared tier.
    pub lease_poll_interval_ms: u64,
    /// Maximum time to wait on a foreign lease before computing locally.
    pub lease_wait_secs: u64,
}

impl CacheConfig {
    pub fn local_idle(&self) -> Duration {
        Duration::from_secs(self.local_idle_secs)
    }

    pub fn shared_ttl(&self) -> Duration {
        Duration::from_secs(self.shared_ttl_secs)
    }

    pub fn lease_ttl(&self) -> Duration {
        Duration::from_secs(self.lease_ttl_secs)
    }

    pub fn lease_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lease_poll_interval_ms)
    }

    pub fn lease_wait(&self) -> Duration {
        Duration::from_secs(self.lease_wait_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            local_capacity: defaults::DEFAULT_LOCAL_CAPACITY,
            local_idle_secs: defaults::DEFAULT_LOCAL_IDLE_SECS,
            shared_ttl_secs: defaults::DEFAULT_SHARED_TTL_SECS,
            lease_ttl_secs: defaults::DEFAULT_LEASE_TTL_SECS,
            lease_poll_interval_ms: defaults::DEFAULT_LEASE_POLL_INTERVAL_MS,
            lease_wait_secs: defaults::DEFAULT_LEASE_WAIT_SECS,
        }
    }
}
