//! Agro Advisor - agronomic inference service
//!
//! Serves soil-moisture forecasts with irrigation suggestions and
//! leaf-photo disease diagnoses over HTTP. Model artifacts load once
//! at startup; the forecast model is required, the classifier only
//! degrades its own endpoint when missing.

use advisor::api::{self, AppState};
use advisor::config::AdvisorConfig;
use advisor_lib::diagnosis::{ClassLabelMap, LeafDiagnoser, OnnxClassifier};
use advisor_lib::forecaster::{ForecastMetadata, MoistureForecaster, OnnxRegressor};
use advisor_lib::observability::AdvisorMetrics;
use advisor_lib::weather::WeatherClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Local .env is a development convenience; absence is fine
    dotenvy::dotenv().ok();

    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = SERVICE_VERSION, "Starting agro-advisor");

    let config = AdvisorConfig::load()?;
    info!(
        api_port = config.api_port,
        moisture_threshold = config.moisture_threshold,
        rain_threshold_mm = config.rain_threshold_mm,
        "Service configured"
    );

    // The forecast model is required; the service must not come up
    // without it
    let metadata = ForecastMetadata::from_file(&config.forecast_metadata_path)
        .context("forecast model metadata is required to start")?;
    let model_name = metadata
        .model_name
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    let regressor = OnnxRegressor::from_file(&config.forecast_model_path, &metadata)
        .context("forecast model is required to start")?;
    let forecaster = MoistureForecaster::new(Box::new(regressor), metadata);
    info!(
        model = %model_name,
        features = forecaster.feature_names().len(),
        "Forecast model loaded"
    );

    let diagnoser = load_diagnoser(&config);

    let metrics = AdvisorMetrics::new();
    metrics.set_forecast_model(&model_name);
    if let Some(diagnoser) = &diagnoser {
        metrics.set_diagnosis_classes(diagnoser.num_classes() as i64);
    }

    let weather = WeatherClient::new(config.weather())?;

    let state = Arc::new(AppState {
        forecaster,
        diagnoser,
        weather,
        moisture_threshold: config.moisture_threshold,
        metrics,
    });

    api::serve(config.api_port, state).await
}

/// Load the classifier and its label map. Either one missing or
/// corrupt disables the diagnosis endpoint without stopping startup.
fn load_diagnoser(config: &AdvisorConfig) -> Option<LeafDiagnoser> {
    let labels = match ClassLabelMap::from_file(&config.class_labels_path) {
        Ok(labels) => labels,
        Err(e) => {
            warn!(error = %e, "class label map unavailable, /diagnose disabled");
            return None;
        }
    };

    let classifier = match OnnxClassifier::from_file(&config.classifier_model_path) {
        Ok(classifier) => classifier,
        Err(e) => {
            warn!(error = %e, "leaf classifier unavailable, /diagnose disabled");
            return None;
        }
    };

    let diagnoser = LeafDiagnoser::new(Box::new(classifier), labels);
    info!(classes = diagnoser.num_classes(), "Leaf classifier loaded");
    Some(diagnoser)
}
