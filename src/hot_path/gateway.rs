//! Ingestion gateway (Hot Path)
//!
//! The only way points enter the log. Validates the required fields,
//! assigns a step when the producer omitted one, appends to the store and
//! hands the accepted point to the broker.
//!
//! Append and broadcast happen together in [`SubscriptionBroker::publish`],
//! so observers see each series in the order the store recorded it.

use crate::core::{Point, PointStore, RawPoint};
use crate::infrastructure::metrics::MetricsCollector;
use crate::ws::SubscriptionBroker;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Rejection of a submitted point
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Validating front door to the store
pub struct IngestionGateway {
    store: Arc<PointStore>,
    broker: Arc<SubscriptionBroker>,
    metrics: Arc<MetricsCollector>,
    /// Step handed out when a producer sends none
    next_step: AtomicI64,
}

impl IngestionGateway {
    pub fn new(
        store: Arc<PointStore>,
        broker: Arc<SubscriptionBroker>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            broker,
            metrics,
            next_step: AtomicI64::new(0),
        }
    }

    /// Validate, store, and broadcast one point
    ///
    /// # Errors
    /// `ValidationError::MissingField` for the first absent field among
    /// `modelName`, `pointType`, `value`. Nothing is stored or pushed.
    pub fn ingest(&self, raw: RawPoint) -> Result<Point, ValidationError> {
        let point = match self.validate(raw) {
            Ok(point) => point,
            Err(e) => {
                self.metrics.record_rejected();
                tracing::debug!(error = %e, "Point rejected");
                return Err(e);
            }
        };

        let delivered = self.broker.publish(&point);

        self.metrics.record_ingested();
        tracing::trace!(
            model = %point.model_name,
            kind = %point.point_type,
            step = point.step,
            delivered,
            "Point ingested"
        );

        Ok(point)
    }

    fn validate(&self, raw: RawPoint) -> Result<Point, ValidationError> {
        let model_name = raw.model_name.ok_or(ValidationError::MissingField("modelName"))?;
        let point_type = raw.point_type.ok_or(ValidationError::MissingField("pointType"))?;
        let value = raw.value.ok_or(ValidationError::MissingField("value"))?;
        let step = raw
            .step
            .unwrap_or_else(|| self.next_step.fetch_add(1, Ordering::Relaxed));

        Ok(Point {
            model_name,
            point_type,
            value,
            step,
        })
    }

    pub fn store(&self) -> &Arc<PointStore> {
        &self.store
    }

    pub fn broker(&self) -> &Arc<SubscriptionBroker> {
        &self.broker
    }
}
