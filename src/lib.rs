//! Live training-metrics relay
//!
//! Ingests (model, metric type, value, step) points, retains them in memory,
//! pushes each one to every connected observer, and serves per-model
//! snapshots to observers that join late.

pub mod core;
pub mod engine;
pub mod hot_path;
pub mod infrastructure;
pub mod ws;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use crate::core::{Point, PointStore, RawPoint};
pub use engine::AppEngine;
pub use hot_path::{IngestionGateway, ValidationError};
pub use infrastructure::config::{Config, ConfigError};
pub use ws::{Observer, ObserverHandle, SubscriptionBroker};

use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum LossboardError {
    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LossboardError>;
