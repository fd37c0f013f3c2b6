//! Soil-moisture forecasting pipeline
//!
//! Derives features from a request, runs the regression artifact,
//! resolves a confidence value, applies the irrigation policy, and
//! assembles the full response payload.

mod confidence;
mod features;
mod inference;

pub use confidence::{resolve, Confidence, ConfidenceSource, DEFAULT_CONFIDENCE};
pub use features::{derive, FeatureSet};
pub use inference::{ForecastMetadata, OnnxRegressor};

use chrono::{DateTime, Local};

use crate::error::ForecastError;
use crate::models::{
    FeatureVector, ModelInfo, PredictRequest, PredictionPoint, PredictionResponse, Suggestion,
    SuggestionDetails,
};
use crate::policy;
use crate::weather::RainOutlook;

/// Seam over the regression artifact so handlers and tests can swap
/// the ONNX model for a stub.
pub trait MoistureRegressor: Send + Sync {
    fn predict_delta(&self, vector: &FeatureVector) -> Result<f64, ForecastError>;

    /// Validation score captured at training time, when the estimator
    /// tracked one.
    fn validation_score(&self) -> Option<f64> {
        None
    }

    /// Out-of-bag score, for bagged ensembles.
    fn oob_score(&self) -> Option<f64> {
        None
    }
}

/// One forecast run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecast {
    pub predicted_delta: f64,
    pub predicted_moisture: f64,
}

/// The forecast model plus its training metadata, immutable after load
pub struct MoistureForecaster {
    regressor: Box<dyn MoistureRegressor>,
    metadata: ForecastMetadata,
}

impl MoistureForecaster {
    pub fn new(regressor: Box<dyn MoistureRegressor>, metadata: ForecastMetadata) -> Self {
        Self {
            regressor,
            metadata,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.metadata.feature_names
    }

    /// Run one forecast. The predicted moisture is the proxy value
    /// plus the model's delta.
    pub fn forecast(
        &self,
        request: &PredictRequest,
        now: DateTime<Local>,
    ) -> Result<Forecast, ForecastError> {
        let proxy = request.historical_data.soil_moisture_lag_60;
        let set = features::derive(&request.current_data, &request.historical_data, now);
        let vector = set.ordered(&self.metadata.feature_names)?;
        let predicted_delta = self.regressor.predict_delta(&vector)?;

        Ok(Forecast {
            predicted_delta,
            predicted_moisture: proxy + predicted_delta,
        })
    }

    /// Resolve confidence through the ordered fallback chain:
    /// training metadata R², then the estimator's validation score,
    /// then its out-of-bag score, then the fixed default.
    pub fn confidence(&self) -> Confidence {
        confidence::resolve(&[
            (ConfidenceSource::TrainingMetadata, self.metadata.r2_score),
            (
                ConfidenceSource::ValidationScore,
                self.regressor.validation_score(),
            ),
            (ConfidenceSource::OutOfBagScore, self.regressor.oob_score()),
        ])
    }

    /// Full request handling: forecast, policy decision, response
    /// assembly. Deterministic for a fixed regressor, outlook and
    /// instant.
    pub fn advise(
        &self,
        request: &PredictRequest,
        outlook: &RainOutlook,
        moisture_threshold: f64,
        now: DateTime<Local>,
    ) -> Result<PredictionResponse, ForecastError> {
        let forecast = self.forecast(request, now)?;
        let advice = policy::decide(forecast.predicted_moisture, outlook, moisture_threshold);
        let confidence = self.confidence();
        let proxy = request.historical_data.soil_moisture_lag_60;

        Ok(PredictionResponse {
            predictions: vec![PredictionPoint {
                timestamp: now.to_rfc3339(),
                predicted_temperature: round2(request.current_data.temperature),
                predicted_humidity: round2(request.current_data.humidity),
                predicted_soil_moisture: round2(forecast.predicted_moisture),
            }],
            suggestion: Suggestion {
                action: advice.action,
                message: advice.message,
                confidence: round4(confidence.value),
                details: SuggestionDetails {
                    predicted_delta: round2(forecast.predicted_delta),
                    weather_info: format!(
                        "Rain: {}mm, Raining soon: {}",
                        outlook.rain_mm, outlook.triggered
                    ),
                    current_moisture: round2(proxy),
                    threshold: moisture_threshold,
                },
            },
            model_info: ModelInfo {
                model_type: self
                    .metadata
                    .model_name
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                version: "1.0".to_string(),
                trained_on: "sensor_data.csv".to_string(),
                features_used: self.metadata.feature_names.len(),
                r2_score: round4(confidence.value),
            },
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
