//! Per-key in-flight markers.
//!
//! The first caller for a key becomes the leader and owns a watch sender;
//! later callers subscribe to it. The marker is removed when the leader is
//! dropped, whatever the reason: result delivered, error, panic, or the
//! leader's future being cancelled. A follower that sees the sender go away
//! without a value simply tries again.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

use bimclass_core::errors::CacheError;

type Slot<V> = Option<Result<V, CacheError>>;

pub(crate) struct InFlight<V> {
    markers: Arc<DashMap<String, watch::Receiver<Slot<V>>>>,
}

pub(crate) enum Flight<V> {
    Leader(FlightLeader<V>),
    Follower(FlightFollower<V>),
}

impl<V: Clone + Send + Sync + 'static> InFlight<V> {
    pub(crate) fn new() -> Self {
        Self {
            markers: Arc::new(DashMap::new()),
        }
    }

    /// Become the leader for `key`, or follow the current one.
    pub(crate) fn join(&self, key: &str) -> Flight<V> {
        match self.markers.entry(key.to_string()) {
            Entry::Occupied(marker) => Flight::Follower(FlightFollower {
                rx: marker.get().clone(),
            }),
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(None);
                slot.insert(rx);
                Flight::Leader(FlightLeader {
                    tx,
                    key: key.to_string(),
                    markers: Arc::clone(&self.markers),
                })
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.markers.len()
    }
}

pub(crate) struct FlightLeader<V> {
    tx: watch::Sender<Slot<V>>,
    key: String,
    markers: Arc<DashMap<String, watch::Receiver<Slot<V>>>>,
}

impl<V> FlightLeader<V> {
    /// Publish the result to every follower and clear the marker.
    pub(crate) fn complete(self, result: Result<V, CacheError>) {
        self.tx.send_replace(Some(result));
    }
}

impl<V> Drop for FlightLeader<V> {
    fn drop(&mut self) {
        self.markers.remove(&self.key);
    }
}

pub(crate) struct FlightFollower<V> {
    rx: watch::Receiver<Slot<V>>,
}

impl<V: Clone> FlightFollower<V> {
    /// Wait for the leader. `None` if it went away without publishing.
    pub(crate) async fn wait(mut self) -> Option<Result<V, CacheError>> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(slot) => (*slot).clone(),
            Err(_) => None,
        }
    }
}
