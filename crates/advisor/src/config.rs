//! Service configuration
//!
//! All tunables come from `ADVISOR_*` environment variables (a local
//! `.env` file is loaded at startup for development). Nothing in the
//! library layer reads the environment; the values are resolved here
//! once and passed into the components that need them.

use advisor_lib::policy::DEFAULT_MOISTURE_THRESHOLD;
use advisor_lib::weather::{WeatherConfig, DEFAULT_RAIN_THRESHOLD_MM};
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Advisor service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// OpenWeatherMap credential; when absent the rain check is
    /// skipped and forecasts proceed without the override
    #[serde(default)]
    pub weather_api_key: Option<String>,

    /// Geographic point the forecast is queried for
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// 3-hour rainfall (mm) above which irrigation is skipped
    #[serde(default = "default_rain_threshold_mm")]
    pub rain_threshold_mm: f64,

    /// Moisture percentage below which irrigation is recommended
    #[serde(default = "default_moisture_threshold")]
    pub moisture_threshold: f64,

    /// Weather lookup timeout in seconds
    #[serde(default = "default_weather_timeout_secs")]
    pub weather_timeout_secs: u64,

    /// Forecast model artifact (ONNX)
    #[serde(default = "default_forecast_model_path")]
    pub forecast_model_path: PathBuf,

    /// Forecast metadata sidecar (feature order, training scores)
    #[serde(default = "default_forecast_metadata_path")]
    pub forecast_metadata_path: PathBuf,

    /// Leaf disease classifier artifact (ONNX)
    #[serde(default = "default_classifier_model_path")]
    pub classifier_model_path: PathBuf,

    /// Class-name-to-index mapping written at classifier training time
    #[serde(default = "default_class_labels_path")]
    pub class_labels_path: PathBuf,
}

fn default_api_port() -> u16 {
    8000
}

fn default_latitude() -> f64 {
    21.0285
}

fn default_longitude() -> f64 {
    105.8542
}

fn default_rain_threshold_mm() -> f64 {
    DEFAULT_RAIN_THRESHOLD_MM
}

fn default_moisture_threshold() -> f64 {
    DEFAULT_MOISTURE_THRESHOLD
}

fn default_weather_timeout_secs() -> u64 {
    5
}

fn default_forecast_model_path() -> PathBuf {
    PathBuf::from("models/moisture_forecast.onnx")
}

fn default_forecast_metadata_path() -> PathBuf {
    PathBuf::from("models/moisture_forecast.json")
}

fn default_classifier_model_path() -> PathBuf {
    PathBuf::from("models/leaf_classifier.onnx")
}

fn default_class_labels_path() -> PathBuf {
    PathBuf::from("models/class_indices.json")
}

impl AdvisorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ADVISOR"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Weather provider settings for this service instance
    pub fn weather(&self) -> WeatherConfig {
        WeatherConfig {
            api_key: self.weather_api_key.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            rain_threshold_mm: self.rain_threshold_mm,
            timeout: Duration::from_secs(self.weather_timeout_secs),
            ..WeatherConfig::default()
        }
    }
}
