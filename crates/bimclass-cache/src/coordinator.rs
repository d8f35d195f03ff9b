//! TieredCache: local tier → shared tier, write-through to both.
//!
//! Lookup order: local (moka) → shared (one batched round trip for every
//! local miss) → absent. Shared hits are promoted to the local tier. Any
//! shared-tier failure is degraded to a miss and recorded; only an explicit
//! `delete` reports it, since the invalidation cannot be guaranteed.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

use bimclass_core::cache_span;
use bimclass_core::config::CacheConfig;
use bimclass_core::errors::CacheError;
use bimclass_core::models::DegradationEvent;
use bimclass_core::traits::ISharedCacheTier;

use crate::lease::LeaseGuard;
use crate::local::LocalTier;
use crate::single_flight::{Flight, InFlight};
use crate::stats::{
    CacheCounters, CacheStats, CacheTier, ComputeMode, ComputeOrigin, ComputeOutcome, Lookup,
};

const MAX_DEGRADATION_EVENTS: usize = 1_000;

/// Two-tier cache with per-key single-flight.
pub struct TieredCache<V> {
    local: LocalTier<V>,
    shared: Arc<dyn ISharedCacheTier>,
    config: CacheConfig,
    flights: InFlight<V>,
    counters: CacheCounters,
    /// Bumped by every delete. A shared-tier read that started under an
    /// older epoch does not backfill the local tier.
    invalidation_epoch: Mutex<u64>,
    degradation: Mutex<VecDeque<DegradationEvent>>,
    owner_id: String,
}

enum LeaseWait<V> {
    Acquired(LeaseGuard),
    /// Another process finished while we waited.
    Filled(V),
    /// Compute without holding the lease.
    Unleased,
}

impl<V> TieredCache<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a cache over `shared` with a fresh local tier and a unique
    /// lease owner id.
    pub fn new(config: &CacheConfig, shared: Arc<dyn ISharedCacheTier>) -> Self {
        Self {
            local: LocalTier::new(config.local_capacity, config.local_idle()),
            shared,
            config: config.clone(),
            flights: InFlight::new(),
            counters: CacheCounters::default(),
            invalidation_epoch: Mutex::new(0),
            degradation: Mutex::new(VecDeque::new()),
            owner_id: format!("bimclass-{}", Uuid::new_v4()),
        }
    }

    /// Lease owner identity of this cache instance.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The process-local tier.
    pub fn local(&self) -> &LocalTier<V> {
        &self.local
    }

    /// Look up one key through both tiers.
    pub async fn get(&self, key: &str) -> Option<Lookup<V>> {
        self.get_many(&[key.to_string()]).await.remove(key)
    }

    /// Look up many keys. Absent keys are missing from the returned map.
    pub async fn get_many(&self, keys: &[String]) -> HashMap<String, Lookup<V>> {
        let span = cache_span!(keys.len());
        async {
            let mut seen: HashSet<&str> = HashSet::with_capacity(keys.len());
            let mut found = HashMap::with_capacity(keys.len());
            let mut local_misses = Vec::new();

            for key in keys {
                if !seen.insert(key.as_str()) {
                    continue;
                }
                match self.local.get(key) {
                    Some(value) => {
                        self.counters.record_hit(CacheTier::Local);
                        found.insert(
                            key.clone(),
                            Lookup {
                                value,
                                tier: CacheTier::Local,
                            },
                        );
                    }
                    None => local_misses.push(key.clone()),
                }
            }

            let mut misses = 0u64;
            if !local_misses.is_empty() {
                match self.read_shared(&local_misses).await {
                    Ok(mut shared_hits) => {
                        for key in local_misses {
                            match shared_hits.remove(&key) {
                                Some(value) => {
                                    self.counters.record_hit(CacheTier::Shared);
                                    found.insert(
                                        key,
                                        Lookup {
                                            value,
                                            tier: CacheTier::Shared,
                                        },
                                    );
                                }
                                None => misses += 1,
                            }
                        }
                    }
                    Err(e) => {
                        self.degrade("get_many", &e, "treated as miss");
                        misses = local_misses.len() as u64;
                    }
                }
            }
            self.counters.record_misses(misses);

            debug!(requested = seen.len(), hits = found.len(), misses, "cache lookup");
            found
        }
        .instrument(span)
        .await
    }

    /// Write `value` to both tiers.
    ///
    /// Only a serialization failure is an error; a shared-tier failure leaves
    /// the value in the local tier and is recorded as a degradation.
    pub async fn set(&self, key: &str, value: V) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(&value).map_err(|e| CacheError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.local.insert(key.to_string(), value);
        if let Err(e) = self.shared.set(key, bytes, self.config.shared_ttl()).await {
            self.degrade("set", &e, "local tier only");
        }
        debug!(key, "cache write");
        Ok(())
    }

    /// Remove `key` from both tiers. Deleting an absent key succeeds.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.invalidate_local(key);
        let result = self.shared.delete(key).await;
        // A read that fetched the old value before the shared delete landed
        // must not leave it behind locally.
        self.invalidate_local(key);

        if let Err(e) = &result {
            self.degrade("delete", e, "local tier invalidated only");
        } else {
            debug!(key, "cache delete");
        }
        result
    }

    /// Return the cached value for `key`, or compute it exactly once.
    ///
    /// Concurrent callers for the same key in this process share one
    /// computation; the others receive its result or its error. Across
    /// processes a shared-tier lease serializes computation. The holder renews
    /// it while computing; a foreign lease is waited on for at most
    /// `lease_wait`, and a crashed holder's lease lapses after `lease_ttl`.
    ///
    /// A successful result is written to both tiers before it is handed out.
    /// Errors are never cached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        mode: ComputeMode,
        compute: F,
    ) -> Result<ComputeOutcome<V>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: fmt::Display,
    {
        let leader = loop {
            if mode == ComputeMode::ReadThrough {
                if let Some(value) = self.local.get(key) {
                    return Ok(ComputeOutcome {
                        value,
                        origin: ComputeOrigin::Cached(CacheTier::Local),
                    });
                }
            }
            match self.flights.join(key) {
                Flight::Leader(leader) => break leader,
                Flight::Follower(follower) => match follower.wait().await {
                    Some(result) => {
                        return result.map(|value| ComputeOutcome {
                            value,
                            origin: ComputeOrigin::Joined,
                        })
                    }
                    None => debug!(key, "in-flight computation abandoned; retrying"),
                },
            }
        };

        let result = self.lead(key, mode, compute).await;
        leader.complete(result.as_ref().map(|o| o.value.clone()).map_err(|e| e.clone()));
        result
    }

    /// Snapshot of the hit/miss counters plus current local and in-flight sizes.
    pub fn stats(&self) -> CacheStats {
        self.counters
            .snapshot(self.local.len(), self.flights.len() as u64)
    }

    /// Take the degradation events recorded since the last drain.
    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        lock(&self.degradation).drain(..).collect()
    }

    async fn lead<F, Fut, E>(
        &self,
        key: &str,
        mode: ComputeMode,
        compute: F,
    ) -> Result<ComputeOutcome<V>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: fmt::Display,
    {
        let lease = match mode {
            ComputeMode::ReadThrough => match self.read_shared(&[key.to_string()]).await {
                Ok(mut found) => {
                    if let Some(value) = found.remove(key) {
                        return Ok(ComputeOutcome {
                            value,
                            origin: ComputeOrigin::Cached(CacheTier::Shared),
                        });
                    }
                    match self.wait_for_lease(key).await {
                        LeaseWait::Acquired(guard) => Some(guard),
                        LeaseWait::Filled(value) => {
                            return Ok(ComputeOutcome {
                                value,
                                origin: ComputeOrigin::Cached(CacheTier::Shared),
                            })
                        }
                        LeaseWait::Unleased => None,
                    }
                }
                Err(e) => {
                    self.degrade("get_many", &e, "computing without a lease");
                    None
                }
            },
            // A refresh never waits on someone else's computation.
            ComputeMode::Refresh => {
                match LeaseGuard::acquire(&self.shared, key, &self.owner_id, self.config.lease_ttl())
                    .await
                {
                    Ok(guard) => guard,
                    Err(e) => {
                        self.degrade("lease", &e, "computing without a lease");
                        None
                    }
                }
            }
        };

        self.counters.record_computation();
        let computed = match &lease {
            Some(guard) => guard.renew_while(self.config.lease_ttl(), compute()).await,
            None => compute().await,
        };
        let computed = computed.map_err(|e| CacheError::ComputeFailed {
            key: key.to_string(),
            reason: e.to_string(),
        });

        let result = match computed {
            Ok(value) => match self.set(key, value.clone()).await {
                Ok(()) => Ok(ComputeOutcome {
                    value,
                    origin: ComputeOrigin::Computed,
                }),
                Err(e) => Err(e),
            },
            Err(e) => {
                debug!(key, error = %e, "computation failed; nothing cached");
                Err(e)
            }
        };

        if let Some(lease) = lease {
            lease.release().await;
        }
        result
    }

    async fn wait_for_lease(&self, key: &str) -> LeaseWait<V> {
        let deadline = Instant::now() + self.config.lease_wait();
        loop {
            match LeaseGuard::acquire(&self.shared, key, &self.owner_id, self.config.lease_ttl())
                .await
            {
                Ok(Some(guard)) => return LeaseWait::Acquired(guard),
                Ok(None) => {}
                Err(e) => {
                    self.degrade("lease", &e, "computing without a lease");
                    return LeaseWait::Unleased;
                }
            }

            if Instant::now() >= deadline {
                warn!(key, "gave up waiting on foreign lease; computing anyway");
                return LeaseWait::Unleased;
            }
            tokio::time::sleep(self.config.lease_poll_interval()).await;

            match self.read_shared(&[key.to_string()]).await {
                Ok(mut found) => {
                    if let Some(value) = found.remove(key) {
                        return LeaseWait::Filled(value);
                    }
                }
                Err(e) => {
                    self.degrade("get_many", &e, "computing without a lease");
                    return LeaseWait::Unleased;
                }
            }
        }
    }

    /// One shared-tier round trip; decoded hits are promoted to the local tier.
    async fn read_shared(&self, keys: &[String]) -> Result<HashMap<String, V>, CacheError> {
        let epoch = *lock(&self.invalidation_epoch);
        let raw = self.shared.get_many(keys).await?;

        let mut decoded = HashMap::with_capacity(raw.len());
        for (key, bytes) in raw {
            match serde_json::from_slice::<V>(&bytes) {
                Ok(value) => {
                    decoded.insert(key, value);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "undecodable shared cache entry; treated as miss")
                }
            }
        }

        let current = lock(&self.invalidation_epoch);
        if *current == epoch {
            for (key, value) in &decoded {
                self.local.insert(key.clone(), value.clone());
            }
        } else {
            debug!(keys = decoded.len(), "skipping backfill that raced a delete");
        }
        drop(current);

        Ok(decoded)
    }

    fn invalidate_local(&self, key: &str) {
        let mut epoch = lock(&self.invalidation_epoch);
        *epoch += 1;
        self.local.invalidate(key);
    }

    fn degrade(&self, operation: &str, error: &CacheError, fallback: &str) {
        warn!(
            tier = self.shared.name(),
            operation,
            error = %error,
            fallback,
            "shared cache tier degraded"
        );
        self.counters.record_shared_failure();
        let mut events = lock(&self.degradation);
        if events.len() >= MAX_DEGRADATION_EVENTS {
            events.pop_front();
        }
        events.push_back(DegradationEvent::now(
            "cache",
            format!("{} {operation}: {error}", self.shared.name()),
            fallback,
        ));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
