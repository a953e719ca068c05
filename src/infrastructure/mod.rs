//! Infrastructure - cold path only
//!
//! This module contains non-latency-critical code:
//! - Logging and metrics
//! - Configuration management
//! - HTTP/WebSocket server
//! - Demo data generation

pub mod api;
pub mod config;
pub mod generator;
pub mod logging;
pub mod metrics;

pub use api::{start_server, AppState};
pub use generator::DemoGenerator;
