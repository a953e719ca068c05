//! WebSocket observer session
//!
//! One task per connection. Registers a `ChannelObserver` with the broker,
//! then forwards queued events to the socket and snapshot requests to the
//! broker until either side goes away.

use crate::ws::observer::ChannelObserver;
use crate::ws::protocol::ClientMessage;
use crate::ws::{ObserverHandle, SubscriptionBroker};
use axum::extract::ws::{Message, WebSocket};
use std::sync::Arc;
use tracing::Level;

/// Drive one observer connection to completion
///
/// The session ends when the client closes, the socket errors, or the
/// broker drops the observer (its queue sender goes away).
pub async fn run_session(
    mut socket: WebSocket,
    broker: Arc<SubscriptionBroker>,
    queue_capacity: usize,
) {
    let (observer, mut events) = ChannelObserver::channel(queue_capacity);
    let handle = broker.register(Arc::new(observer));

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    crate::log_ws!(
                        Level::INFO,
                        %handle,
                        "Observer dropped by broker, closing session"
                    );
                    break;
                };
                let text = match event.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        crate::log_ws!(
                            Level::ERROR,
                            %handle,
                            "Failed to encode {}: {}",
                            event.name(),
                            e
                        );
                        continue;
                    }
                };
                if let Err(e) = socket.send(Message::Text(text)).await {
                    crate::log_ws!(Level::DEBUG, %handle, "Send failed: {}", e);
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => handle_frame(&broker, handle, &text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary
                    Some(Err(e)) => {
                        crate::log_ws!(Level::DEBUG, %handle, "Receive failed: {}", e);
                        break;
                    }
                }
            }
        }
    }

    broker.unregister(handle);
}

fn handle_frame(broker: &SubscriptionBroker, handle: ObserverHandle, text: &str) {
    match ClientMessage::parse(text) {
        Ok(ClientMessage::DataRequest(models)) => {
            broker.snapshot(handle, models.as_slice());
        }
        Err(e) => {
            // Malformed frames are ignored; the connection stays open
            crate::log_ws!(Level::WARN, %handle, "Ignoring malformed frame: {}", e);
        }
    }
}
