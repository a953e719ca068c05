//! Point types shared by the store, gateway, and broker
//!
//! A `Point` is one accepted observation. Inside the log the identity fields
//! are implied by the (model, type) nesting, so series hold `Sample`s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single accepted observation
///
/// Built only by the ingestion gateway after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub model_name: String,
    pub point_type: String,
    pub value: f64,
    pub step: i64,
}

impl Point {
    pub fn new(
        model_name: impl Into<String>,
        point_type: impl Into<String>,
        value: f64,
        step: i64,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            point_type: point_type.into(),
            value,
            step,
        }
    }

    /// Value/step pair as stored in a series
    #[inline]
    pub fn sample(&self) -> Sample {
        Sample {
            value: self.value,
            step: self.step,
        }
    }
}

/// One entry of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub value: f64,
    pub step: i64,
}

/// Point as submitted by a producer, before validation
///
/// Accepts the canonical field names as well as the `pointValue` /
/// `globalStep` names used by existing training scripts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPoint {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub point_type: Option<String>,
    #[serde(default, alias = "pointValue")]
    pub value: Option<f64>,
    #[serde(default, alias = "globalStep")]
    pub step: Option<i64>,
}

impl RawPoint {
    /// Fully populated raw point
    pub fn new(model_name: &str, point_type: &str, value: f64, step: i64) -> Self {
        Self {
            model_name: Some(model_name.to_string()),
            point_type: Some(point_type.to_string()),
            value: Some(value),
            step: Some(step),
        }
    }
}

/// Ordered samples for one (model, type) pair, in arrival order
pub type Series = Vec<Sample>;

/// All series of one model, keyed by point type
pub type ModelSeries = BTreeMap<String, Series>;

/// Point-in-time copy of the requested models
pub type Snapshot = BTreeMap<String, ModelSeries>;
