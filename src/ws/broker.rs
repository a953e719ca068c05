//! Subscription broker - observer registry and fan-out
//!
//! Tracks connected observers, pushes every ingested point to all of them,
//! and answers per-observer snapshot requests from the store.
//!
//! # Locking
//!
//! A sequencing mutex orders publishes, registrations and snapshots against
//! each other. Under it the observer map and the store's log lock are taken
//! one at a time, never nested. Delivery only enqueues, so nothing waits on
//! I/O while the sequencer is held.
//!
//! This gives each observer a stream that lines up with the log: the
//! announcement always comes first, and a snapshot holds exactly the points
//! published before it, with later points arriving as pushes.

use crate::core::{Point, PointStore};
use crate::infrastructure::metrics::MetricsCollector;
use crate::ws::observer::{DeliveryError, Observer};
use crate::ws::protocol::ObserverEvent;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle returned by [`SubscriptionBroker::register`]
///
/// Monotonically assigned; never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(pub u64);

impl std::fmt::Display for ObserverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "obs-{}", self.0)
    }
}

/// Registry of live observers
pub struct SubscriptionBroker {
    store: Arc<PointStore>,
    metrics: Arc<MetricsCollector>,
    observers: RwLock<HashMap<ObserverHandle, Arc<dyn Observer>>>,
    next_id: AtomicU64,
    sequencer: Mutex<()>,
}

impl SubscriptionBroker {
    pub fn new(store: Arc<PointStore>, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            store,
            metrics,
            observers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            sequencer: Mutex::new(()),
        }
    }

    /// Announce the available models, then add the observer to the push set
    ///
    /// If the announcement cannot be delivered the observer is never added;
    /// the returned handle is then already unregistered.
    pub fn register(&self, observer: Arc<dyn Observer>) -> ObserverHandle {
        let handle = ObserverHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let _order = self.sequencer.lock();

        let names = self.store.model_names();
        if let Err(e) = observer.deliver(ObserverEvent::AvailableModels(names)) {
            self.drop_observer(handle, e);
            return handle;
        }

        let count = {
            let mut observers = self.observers.write();
            observers.insert(handle, observer);
            observers.len()
        };
        self.metrics.set_observers(count);
        tracing::info!(%handle, observers = count, "Observer registered");

        handle
    }

    /// Remove an observer; unknown or already removed handles are a no-op
    ///
    /// Returns whether the handle was registered.
    pub fn unregister(&self, handle: ObserverHandle) -> bool {
        let (removed, count) = {
            let mut observers = self.observers.write();
            let removed = observers.remove(&handle).is_some();
            (removed, observers.len())
        };

        if removed {
            self.metrics.set_observers(count);
            tracing::info!(%handle, observers = count, "Observer unregistered");
        }
        removed
    }

    /// Append a point to the store and push it to every observer
    ///
    /// Returns the number of deliveries.
    pub fn publish(&self, point: &Point) -> usize {
        let _order = self.sequencer.lock();
        self.store.append(point);
        self.broadcast(point)
    }

    /// Push a point to every registered observer
    ///
    /// Each observer is tried independently. Failed observers are
    /// unregistered after the pass. Returns the number of deliveries.
    /// Does not touch the store; use [`publish`](Self::publish) for points
    /// that should also be retained.
    pub fn broadcast(&self, point: &Point) -> usize {
        let targets: Vec<(ObserverHandle, Arc<dyn Observer>)> = self
            .observers
            .read()
            .iter()
            .map(|(handle, observer)| (*handle, observer.clone()))
            .collect();

        if targets.is_empty() {
            return 0;
        }

        let event = ObserverEvent::DataPoint(point.clone());
        let mut delivered = 0;
        let mut failed = Vec::new();

        for (handle, observer) in &targets {
            match observer.deliver(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => failed.push((*handle, e)),
            }
        }

        self.metrics.record_deliveries(delivered as u64);
        for (handle, e) in failed {
            self.drop_observer(handle, e);
        }

        delivered
    }

    /// Send a snapshot of `model_names` to one observer
    ///
    /// Returns false if the handle is not registered or delivery failed.
    pub fn snapshot<S: AsRef<str>>(&self, handle: ObserverHandle, model_names: &[S]) -> bool {
        let _order = self.sequencer.lock();
        let observer = match self.observers.read().get(&handle) {
            Some(observer) => observer.clone(),
            None => return false,
        };

        let data = self.store.query(model_names);
        tracing::debug!(
            %handle,
            requested = model_names.len(),
            returned = data.len(),
            "Serving snapshot"
        );

        match observer.deliver(ObserverEvent::RefreshedData(data)) {
            Ok(()) => {
                self.metrics.record_snapshot();
                true
            }
            Err(e) => {
                self.drop_observer(handle, e);
                false
            }
        }
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_registered(&self, handle: ObserverHandle) -> bool {
        self.observers.read().contains_key(&handle)
    }

    fn drop_observer(&self, handle: ObserverHandle, error: DeliveryError) {
        self.metrics.record_delivery_failure();
        tracing::warn!(%handle, %error, "Delivery failed, dropping observer");
        self.unregister(handle);
    }
}
