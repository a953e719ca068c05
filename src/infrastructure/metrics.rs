//! Metrics collection for system monitoring
//!
//! Lock-free metrics counters using atomic operations.
//! Updated on the ingest and fan-out paths, exported via the stats endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime};

/// System metrics collector
///
/// Thread-safe counters shared by the gateway and broker.
/// Snapshots taken for API export.
pub struct MetricsCollector {
    /// Points accepted by the gateway
    points_ingested: AtomicU64,
    /// Points rejected by validation
    points_rejected: AtomicU64,
    /// Successful per-observer deliveries
    deliveries: AtomicU64,
    /// Deliveries that failed and dropped the observer
    delivery_failures: AtomicU64,
    /// Snapshot replies sent
    snapshots_served: AtomicU64,
    /// Currently registered observers
    observers: AtomicU64,
    /// Last accepted point timestamp (Unix millis)
    last_ingest_time: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

/// Metrics snapshot for API export
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub points_ingested: u64,
    pub points_rejected: u64,
    pub deliveries: u64,
    pub delivery_failures: u64,
    pub snapshots_served: u64,
    pub observers: u64,
    pub ingest_rate: f64, // points per second
    pub uptime_seconds: u64,
}

impl MetricsCollector {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self {
            points_ingested: AtomicU64::new(0),
            points_rejected: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            snapshots_served: AtomicU64::new(0),
            observers: AtomicU64::new(0),
            last_ingest_time: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn record_ingested(&self) {
        self.points_ingested.fetch_add(1, Ordering::Relaxed);
        self.last_ingest_time.store(unix_millis(), Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.points_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_deliveries(&self, count: u64) {
        self.deliveries.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_snapshot(&self) {
        self.snapshots_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Set the registered observer gauge
    pub fn set_observers(&self, count: usize) {
        self.observers.store(count as u64, Ordering::Relaxed);
    }

    /// Get current snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let ingested = self.points_ingested.load(Ordering::Relaxed);

        let uptime = self.start_time.elapsed().as_secs();
        let rate = if uptime > 0 {
            ingested as f64 / uptime as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            points_ingested: ingested,
            points_rejected: self.points_rejected.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            snapshots_served: self.snapshots_served.load(Ordering::Relaxed),
            observers: self.observers.load(Ordering::Relaxed),
            ingest_rate: rate,
            uptime_seconds: uptime,
        }
    }

    /// Milliseconds since the last accepted point, capped at 10000ms
    pub fn idle_ms(&self) -> u64 {
        let last = self.last_ingest_time.load(Ordering::Relaxed);
        if last == 0 {
            return 10000; // Nothing ingested yet
        }

        unix_millis().saturating_sub(last).min(10000)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
