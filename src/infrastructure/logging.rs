//! Centralized file-based logging system
//!
//! Writes logs to files under the configured directory, separated by type:
//! - main/ - General application logs (JSON)
//! - error/ - Error and warning logs only
//! - ws/ - Observer sessions and broker fan-out
//! - api/ - HTTP server logs
//! - ingest/ - Gateway and demo generator logs

use crate::infrastructure::config::LoggingConfig;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_TYPES: [&str; 5] = ["main", "error", "ws", "api", "ingest"];

/// Initialize centralized file logging
///
/// Creates the log directory tree and sets up file appenders for each log type.
/// Returns the WorkerGuards, which must be kept alive for the duration of the program.
///
/// # Errors
/// Fails if the directories cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> std::io::Result<Vec<WorkerGuard>> {
    for log_type in &LOG_TYPES {
        fs::create_dir_all(config.dir.join(log_type))?;
    }

    let mut guards = Vec::new();

    // Main log - all logs
    let (main_appender, main_guard) = create_appender(&config.dir, "main");
    guards.push(main_guard);

    // Error log - ERROR and WARN only
    let (error_appender, error_guard) = create_appender(&config.dir, "error");
    guards.push(error_guard);

    // WebSocket log - sessions and broker
    let (ws_appender, ws_guard) = create_appender(&config.dir, "ws");
    guards.push(ws_guard);

    // API log - HTTP server
    let (api_appender, api_guard) = create_appender(&config.dir, "api");
    guards.push(api_guard);

    // Ingest log - gateway and generator
    let (ingest_appender, ingest_guard) = create_appender(&config.dir, "ingest");
    guards.push(ingest_guard);

    let main_layer = tracing_subscriber::fmt::layer()
        .with_writer(main_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json();

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::LevelFilter::WARN);

    let ws_layer = tracing_subscriber::fmt::layer()
        .with_writer(ws_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target().contains("ws")
                || metadata.target().contains("broker")
                || metadata.target().contains("session")
        }));

    let api_layer = tracing_subscriber::fmt::layer()
        .with_writer(api_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target().contains("api") || metadata.target().contains("server")
        }));

    let ingest_layer = tracing_subscriber::fmt::layer()
        .with_writer(ingest_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target().contains("ingest")
                || metadata.target().contains("gateway")
                || metadata.target().contains("generator")
        }));

    // Console layer for development
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(main_layer)
        .with(error_layer)
        .with(ws_layer)
        .with(api_layer)
        .with(ingest_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::AlreadyExists, e))?;

    tracing::info!("Logging system initialized. Log files in {}", config.dir.display());

    Ok(guards)
}

/// Create a daily rolling, non-blocking file appender
fn create_appender(dir: &Path, name: &str) -> (NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir.join(name), name);

    tracing_appender::non_blocking(appender)
}

/// Log macro helpers for specific log types
#[macro_export]
macro_rules! log_ws {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "ws", $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_api {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "api", $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_ingest {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "ingest", $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_main {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "main", $level, $($arg)+)
    };
}
