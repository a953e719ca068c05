//! Observer capability
//!
//! The broker only knows observers through this trait. Each implementation
//! contains its own failures: a returned `DeliveryError` makes the broker
//! drop that observer and nothing else.

use crate::ws::protocol::ObserverEvent;
use tokio::sync::mpsc;

/// Something that receives broker events
///
/// `deliver` must not block; transports queue the event and write it from
/// their own task.
pub trait Observer: Send + Sync {
    fn deliver(&self, event: ObserverEvent) -> Result<(), DeliveryError>;
}

/// Delivery failures, treated by the broker as an implicit disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Observer queue full")]
    QueueFull,
    #[error("Observer disconnected")]
    Disconnected,
}

/// Observer backed by a bounded tokio channel
///
/// The receiving half is drained by the connection's session task.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<ObserverEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiver its session drains
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ObserverEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl Observer for ChannelObserver {
    #[inline]
    fn deliver(&self, event: ObserverEvent) -> Result<(), DeliveryError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Disconnected,
        })
    }
}
