//! Observer fan-out and the WebSocket transport

pub mod broker;
pub mod observer;
pub mod protocol;
pub mod session;

pub use broker::{ObserverHandle, SubscriptionBroker};
pub use observer::{ChannelObserver, DeliveryError, Observer};
pub use protocol::{ClientMessage, ObserverEvent};
