//! Core Application Engine
//!
//! Builds the store, broker and gateway once, hands them to the HTTP/WS
//! layer and the demo generator, and owns them for the process lifetime.

use crate::core::PointStore;
use crate::hot_path::IngestionGateway;
use crate::infrastructure::config::Config;
use crate::infrastructure::metrics::MetricsCollector;
use crate::infrastructure::{start_server, AppState, DemoGenerator};
use crate::ws::SubscriptionBroker;
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Main engine owning the core components
pub struct AppEngine {
    config: Config,
    store: Arc<PointStore>,
    metrics: Arc<MetricsCollector>,
    broker: Arc<SubscriptionBroker>,
    gateway: Arc<IngestionGateway>,
}

impl AppEngine {
    /// Create the engine with an empty log and no observers
    pub fn new(config: Config) -> Self {
        let store = Arc::new(PointStore::new());
        let metrics = Arc::new(MetricsCollector::new());
        let broker = Arc::new(SubscriptionBroker::new(store.clone(), metrics.clone()));
        let gateway = Arc::new(IngestionGateway::new(
            store.clone(),
            broker.clone(),
            metrics.clone(),
        ));

        Self {
            config,
            store,
            metrics,
            broker,
            gateway,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> Arc<IngestionGateway> {
        self.gateway.clone()
    }

    pub fn broker(&self) -> Arc<SubscriptionBroker> {
        self.broker.clone()
    }

    /// Get metrics collector reference
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Shared state for the API server
    pub fn state(&self) -> AppState {
        AppState {
            gateway: self.gateway.clone(),
            broker: self.broker.clone(),
            store: self.store.clone(),
            metrics: self.metrics.clone(),
            observer_queue_capacity: self.config.broker.observer_queue_capacity,
        }
    }

    /// Backfill and start the demo tickers
    pub fn start_demo(&self) -> Vec<JoinHandle<()>> {
        let generator = Arc::new(DemoGenerator::new(
            self.gateway.clone(),
            self.config.demo.clone(),
        ));
        generator.backfill();
        generator.spawn()
    }

    /// Serve until `shutdown` resolves
    pub async fn run(&self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        tracing::info!(
            "Starting engine (demo {})",
            if self.config.demo.enabled { "on" } else { "off" }
        );

        let demo_tasks = if self.config.demo.enabled {
            self.start_demo()
        } else {
            Vec::new()
        };

        let result = start_server(self.state(), &self.config, shutdown).await;

        for task in demo_tasks {
            task.abort();
        }

        let metrics = self.metrics.snapshot();
        tracing::info!(
            "Engine stopped: {} points ingested, {} rejected, {} retained",
            metrics.points_ingested,
            metrics.points_rejected,
            self.store.len()
        );

        result
    }
}
