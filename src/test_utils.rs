//! Test observers and helpers shared across module tests

use crate::core::{Point, Snapshot};
use crate::ws::observer::{DeliveryError, Observer};
use crate::ws::protocol::ObserverEvent;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Observer that records every event it is given
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().clone()
    }

    /// Pushed points, in delivery order
    pub fn points(&self) -> Vec<Point> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::DataPoint(point) => Some(point.clone()),
                _ => None,
            })
            .collect()
    }

    /// Snapshot replies, in delivery order
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ObserverEvent::RefreshedData(snapshot) => Some(snapshot.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn deliver(&self, event: ObserverEvent) -> Result<(), DeliveryError> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Observer that accepts `ok_deliveries` events, then reports a broken transport
pub struct FailingObserver {
    ok_deliveries: usize,
    attempts: AtomicUsize,
}

impl FailingObserver {
    pub fn after(ok_deliveries: usize) -> Self {
        Self {
            ok_deliveries,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Observer for FailingObserver {
    fn deliver(&self, _event: ObserverEvent) -> Result<(), DeliveryError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.ok_deliveries {
            Ok(())
        } else {
            Err(DeliveryError::Disconnected)
        }
    }
}
