//! Advisor library for agronomic inference
//!
//! This crate provides the core functionality for:
//! - Feature derivation and soil-moisture forecasting
//! - Confidence resolution for forecast outputs
//! - The weather-based irrigation override
//! - The irrigation decision policy
//! - Leaf-photo disease diagnosis
//! - Prometheus observability

pub mod diagnosis;
pub mod error;
pub mod forecaster;
pub mod models;
pub mod observability;
pub mod policy;
pub mod weather;

pub use error::{DiagnoseError, ForecastError};
pub use models::*;
pub use observability::AdvisorMetrics;
