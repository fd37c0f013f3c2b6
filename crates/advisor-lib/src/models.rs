//! Core data models for the advisor service
//!
//! Wire names preserve the sensor platform's field naming
//! (`lightIntensity`, `soilMoisture_lag_60`, ...) so existing callers
//! keep working; internal names are snake_case.

use serde::{Deserialize, Serialize};

use crate::policy::IrrigationAction;

/// Instantaneous sensor values supplied by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(rename = "lightIntensity")]
    pub light_intensity: f64,
}

/// Pre-aggregated values over a trailing 60-minute window, supplied by
/// the caller rather than computed here. All five fields are required;
/// a missing field rejects the request before any computation runs.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalAggregate {
    #[serde(rename = "soilMoisture_lag_60")]
    pub soil_moisture_lag_60: f64,
    #[serde(rename = "temperature_lag_60")]
    pub temperature_lag_60: f64,
    #[serde(rename = "soilMoisture_rolling_mean_60m")]
    pub soil_moisture_rolling_mean_60m: f64,
    #[serde(rename = "temperature_rolling_mean_60m")]
    pub temperature_rolling_mean_60m: f64,
    #[serde(rename = "lightIntensity_rolling_mean_60m")]
    pub light_intensity_rolling_mean_60m: f64,
}

/// Request body for the moisture forecast endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub current_data: SensorReading,
    pub historical_data: HistoricalAggregate,
}

/// Ordered feature input for the forecast model. The name order is the
/// model's declared order, not the derivation order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Full response payload of the moisture forecast endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub predictions: Vec<PredictionPoint>,
    pub suggestion: Suggestion,
    pub model_info: ModelInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionPoint {
    pub timestamp: String,
    pub predicted_temperature: f64,
    pub predicted_humidity: f64,
    pub predicted_soil_moisture: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub action: IrrigationAction,
    pub message: String,
    pub confidence: f64,
    pub details: SuggestionDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionDetails {
    pub predicted_delta: f64,
    pub weather_info: String,
    pub current_moisture: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub version: String,
    pub trained_on: String,
    pub features_used: usize,
    pub r2_score: f64,
}
