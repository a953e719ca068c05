//! Minimal observer: connects, requests every announced model, then prints pushes.
//!
//! cargo run --example ws_observer -- ws://localhost:8120/ws

use futures_util::{SinkExt, StreamExt};
use lossboard::ws::{ClientMessage, ObserverEvent};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

#[tokio::main]
async fn main() {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://localhost:8120/ws".to_string());
    println!("Connecting to {}...", url);

    let (mut ws_stream, _) = connect_async(url.as_str()).await.expect("Failed to connect");
    println!("Connected!");

    while let Some(msg) = ws_stream.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                println!("Error: {}", e);
                break;
            }
        };

        match serde_json::from_str::<ObserverEvent>(text.as_str()) {
            Ok(ObserverEvent::AvailableModels(models)) => {
                println!("Available models: {:?}", models);
                let request = serde_json::to_string(&ClientMessage::DataRequest(models))
                    .expect("Failed to encode request");
                ws_stream
                    .send(Message::Text(request.into()))
                    .await
                    .expect("Failed to send");
            }
            Ok(ObserverEvent::RefreshedData(snapshot)) => {
                for (model, series) in &snapshot {
                    for (kind, samples) in series {
                        println!("{} {}: {} samples", model, kind, samples.len());
                    }
                }
            }
            Ok(ObserverEvent::DataPoint(point)) => {
                println!(
                    "{} {} step={} value={:.4}",
                    point.model_name, point.point_type, point.step, point.value
                );
            }
            Err(e) => println!("Unrecognized frame ({}): {}", e, text.as_str()),
        }
    }

    println!("Connection closed");
}
