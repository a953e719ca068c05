//! Core types and the retained log
//!
//! This module contains the data model used throughout the system:
//! - Point: One accepted (model, type, value, step) observation
//! - RawPoint: Producer input prior to validation
//! - PointStore: The append-only log keyed by (model, type)

pub mod point;
pub mod store;

pub use point::{ModelSeries, Point, RawPoint, Sample, Series, Snapshot};
pub use store::PointStore;
