//! Shared cache tier that can be switched off.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use bimclass_core::errors::CacheError;
use bimclass_core::traits::ISharedCacheTier;

/// Map-backed shared tier whose every call fails while it is down.
///
/// TTLs are ignored. Leases never expire and are exclusive per owner.
#[derive(Debug, Default)]
pub struct FlakySharedTier {
    values: Mutex<HashMap<String, Vec<u8>>>,
    leases: Mutex<HashMap<String, String>>,
    down: AtomicBool,
    failed_calls: AtomicUsize,
}

impl FlakySharedTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tier that starts out unreachable.
    pub fn down() -> Self {
        let tier = Self::default();
        tier.set_down(true);
        tier
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn failed_calls(&self) -> usize {
        self.failed_calls.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().unwrap().contains_key(key)
    }

    /// Put raw bytes straight into the store, bypassing any cache.
    pub fn seed(&self, key: &str, bytes: Vec<u8>) {
        self.values.lock().unwrap().insert(key.to_string(), bytes);
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.down.load(Ordering::SeqCst) {
            self.failed_calls.fetch_add(1, Ordering::SeqCst);
            return Err(CacheError::Unavailable {
                tier: "flaky".into(),
                reason: "connection refused".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ISharedCacheTier for FlakySharedTier {
    async fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>, CacheError> {
        self.check()?;
        let values = self.values.lock().unwrap();
        Ok(keys
            .iter()
            .filter_map(|k| values.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn try_acquire_lease(
        &self,
        key: &str,
        owner: &str,
        _ttl: Duration,
    ) -> Result<bool, CacheError> {
        self.check()?;
        let mut leases = self.leases.lock().unwrap();
        match leases.get(key) {
            Some(holder) if holder != owner => Ok(false),
            _ => {
                leases.insert(key.to_string(), owner.to_string());
                Ok(true)
            }
        }
    }

    async fn extend_lease(
        &self,
        key: &str,
        owner: &str,
        _ttl: Duration,
    ) -> Result<bool, CacheError> {
        self.check()?;
        let leases = self.leases.lock().unwrap();
        Ok(leases.get(key).is_some_and(|holder| holder == owner))
    }

    async fn release_lease(&self, key: &str, owner: &str) -> Result<(), CacheError> {
        self.check()?;
        let mut leases = self.leases.lock().unwrap();
        if leases.get(key).is_some_and(|holder| holder == owner) {
            leases.remove(key);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "flaky"
    }
}
