//! Observer wire protocol
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.

use crate::core::{Point, Snapshot};
use serde::{Deserialize, Serialize};

/// Server -> observer events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ObserverEvent {
    /// Sent once on connect so the observer can pick models to request
    AvailableModels(Vec<String>),
    /// Reply to a `data_request`, scoped to the requested models
    RefreshedData(Snapshot),
    /// Live push of one ingested point, unfiltered
    DataPoint(Point),
}

impl ObserverEvent {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            ObserverEvent::AvailableModels(_) => "available_models",
            ObserverEvent::RefreshedData(_) => "refreshed_data",
            ObserverEvent::DataPoint(_) => "data_point",
        }
    }
}

/// Observer -> server messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request a snapshot of the named models
    DataRequest(Vec<String>),
}

impl ClientMessage {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
