//! In-memory shared tier.
//!
//! Stands in for a distributed key-value store inside one process: several
//! `TieredCache` instances pointed at the same `InMemorySharedTier` behave
//! like separate service instances behind one shared cache. Entry expiry is
//! fixed at write time and never extended by reads. Times come from
//! `tokio::time::Instant` so a paused test clock drives expiry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use bimclass_core::errors::CacheError;
use bimclass_core::traits::ISharedCacheTier;

#[derive(Debug, Clone)]
struct StoredValue {
    bytes: Vec<u8>,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
struct Lease {
    owner: String,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct InMemorySharedTier {
    values: DashMap<String, StoredValue>,
    leases: DashMap<String, Lease>,
    round_trips: AtomicU64,
}

impl InMemorySharedTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `key` expires, if it is present.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.values
            .get(key)
            .filter(|v| v.expires_at > now)
            .map(|v| v.expires_at - now)
    }

    /// Whether a live entry exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.ttl_remaining(key).is_some()
    }

    /// Owner of the live lease on `key`, if any.
    pub fn lease_holder(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.leases
            .get(key)
            .filter(|l| l.expires_at > now)
            .map(|l| l.owner.clone())
    }

    /// Live entry count.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.values.iter().filter(|v| v.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of calls that reached this tier.
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::Relaxed)
    }

    fn touch(&self) {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl ISharedCacheTier for InMemorySharedTier {
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, CacheError> {
        self.touch();
        let now = Instant::now();
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            // Lazily drop expired entries on read.
            self.values.remove_if(key, |_, v| v.expires_at <= now);
            if let Some(v) = self.values.get(key) {
                found.insert(key.clone(), v.bytes.clone());
            }
        }
        Ok(found)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.touch();
        self.values.insert(
            key.to_string(),
            StoredValue {
                bytes: value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.touch();
        self.values.remove(key);
        Ok(())
    }

    async fn try_acquire_lease(
        &self,
        key: &str,
        owner: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        self.touch();
        let now = Instant::now();
        let lease = Lease {
            owner: owner.to_string(),
            expires_at: now + ttl,
        };
        let acquired = match self.leases.entry(key.to_string()) {
            Entry::Occupied(mut held) => {
                let current = held.get();
                if current.expires_at > now && current.owner != owner {
                    false
                } else {
                    if current.expires_at <= now {
                        debug!(key, previous_owner = %current.owner, "taking over expired lease");
                    }
                    held.insert(lease);
                    true
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(lease);
                true
            }
        };
        Ok(acquired)
    }

    async fn extend_lease(
        &self,
        key: &str,
        owner: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError> {
        self.touch();
        match self.leases.get_mut(key) {
            Some(mut lease) if lease.owner == owner => {
                lease.expires_at = Instant::now() + ttl;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_lease(&self, key: &str, owner: &str) -> Result<(), CacheError> {
        self.touch();
        self.leases.remove_if(key, |_, l| l.owner == owner);
        Ok(())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
