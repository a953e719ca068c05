//! Hot path operations - the ingest boundary
//!
//! This module contains the code every producer request runs through:
//! - Field validation and step assignment
//! - Append into the store
//! - Hand-off to the broker for fan-out

pub mod gateway;

pub use gateway::{IngestionGateway, ValidationError};
