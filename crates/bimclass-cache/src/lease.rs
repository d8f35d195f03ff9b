//! Cross-process compute lease held while a value is being computed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use bimclass_core::errors::CacheError;
use bimclass_core::traits::ISharedCacheTier;

/// Floor for the renewal period of very short leases.
const MIN_RENEW_PERIOD: Duration = Duration::from_millis(10);

/// A held shared-tier lease.
///
/// Released explicitly with [`LeaseGuard::release`]. If the guard is dropped
/// first (cancellation, panic) a release is spawned on the current runtime;
/// failing that, the lease simply expires after its TTL.
pub(crate) struct LeaseGuard {
    shared: Arc<dyn ISharedCacheTier>,
    key: String,
    owner: String,
    released: bool,
}

impl LeaseGuard {
    /// Try to take the lease on `key`. `Ok(None)` means someone else holds it.
    pub(crate) async fn acquire(
        shared: &Arc<dyn ISharedCacheTier>,
        key: &str,
        owner: &str,
        ttl: Duration,
    ) -> Result<Option<Self>, CacheError> {
        let acquired = shared.try_acquire_lease(key, owner, ttl).await?;
        Ok(acquired.then(|| Self {
            shared: Arc::clone(shared),
            key: key.to_string(),
            owner: owner.to_string(),
            released: false,
        }))
    }

    /// Drive `work` to completion, renewing the lease every third of `ttl`.
    pub(crate) async fn renew_while<F: Future>(&self, ttl: Duration, work: F) -> F::Output {
        let period = (ttl / 3).max(MIN_RENEW_PERIOD);
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(work);

        loop {
            tokio::select! {
                biased;
                out = &mut work => return out,
                _ = heartbeat.tick() => {
                    match self.shared.extend_lease(&self.key, &self.owner, ttl).await {
                        Ok(true) => debug!(key = %self.key, "lease renewed"),
                        Ok(false) => warn!(key = %self.key, "lease lost while computing"),
                        Err(e) => warn!(key = %self.key, error = %e, "lease renewal failed"),
                    }
                }
            }
        }
    }

    pub(crate) async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.shared.release_lease(&self.key, &self.owner).await {
            warn!(key = %self.key, error = %e, "lease release failed; it will expire");
        }
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(key = %self.key, "no runtime to release lease; it will expire");
            return;
        };
        let shared = Arc::clone(&self.shared);
        let key = std::mem::take(&mut self.key);
        let owner = std::mem::take(&mut self.owner);
        handle.spawn(async move {
            if let Err(e) = shared.release_lease(&key, &owner).await {
                debug!(key = %key, error = %e, "abandoned lease release failed; it will expire");
            }
        });
    }
}
