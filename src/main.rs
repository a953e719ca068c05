//! Live training-metrics relay
//!
//! # Architecture
//! - **core**: Point types and the in-memory log (PointStore)
//! - **hot_path**: Ingestion gateway (validation, append, fan-out hand-off)
//! - **ws**: Subscription broker, observer capability, WebSocket sessions
//! - **infrastructure**: Cold path (logging, metrics, config, api, demo data)

use lossboard::infrastructure::config::Config;
use lossboard::infrastructure::logging::init_logging;
use lossboard::{log_main, AppEngine, Result};
use tracing::Level;

/// Resolves on ctrl-c
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log_main!(Level::INFO, "Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Guards flush the file appenders on drop
    let _guards = init_logging(&config.logging)?;
    log_main!(
        Level::INFO,
        "Starting lossboard on {} (static assets: {})",
        config.bind_addr(),
        config.server.static_path.display()
    );

    let engine = AppEngine::new(config);
    engine.run(shutdown_signal()).await?;

    Ok(())
}
