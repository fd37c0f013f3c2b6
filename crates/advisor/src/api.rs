//! HTTP API for the advisor service
//!
//! Two inference endpoints plus health and Prometheus metrics. The
//! pipelines share no state: artifacts live read-only in [`AppState`]
//! and every request works on its own data.

use advisor_lib::diagnosis::LeafDiagnoser;
use advisor_lib::forecaster::MoistureForecaster;
use advisor_lib::models::PredictRequest;
use advisor_lib::observability::AdvisorMetrics;
use advisor_lib::weather::WeatherClient;
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state, built once at startup
pub struct AppState {
    pub forecaster: MoistureForecaster,
    /// Absent when the classifier artifacts failed to load; only the
    /// diagnosis endpoint degrades in that case
    pub diagnoser: Option<LeafDiagnoser>,
    pub weather: WeatherClient,
    pub moisture_threshold: f64,
    pub metrics: AdvisorMetrics,
}

#[derive(Debug, Serialize)]
struct DiagnoseResponse {
    disease: String,
    confidence: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// Liveness check
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Moisture forecast plus irrigation suggestion
async fn predict_soil_moisture(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    // Missing or malformed body fields are rejected before any
    // computation runs
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let outlook = state.weather.check_rain().await;

    let started = Instant::now();
    match state
        .forecaster
        .advise(&request, &outlook, state.moisture_threshold, Local::now())
    {
        Ok(response) => {
            state
                .metrics
                .observe_forecast_latency(started.elapsed().as_secs_f64());
            state.metrics.inc_forecasts_generated();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            state.metrics.inc_forecast_errors();
            error!(error = %e, "moisture forecast failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Leaf-photo disease diagnosis
async fn diagnose(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let Some(diagnoser) = state.diagnoser.as_ref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "disease classifier is not available",
        );
    };

    let image_bytes = match read_image_field(&mut multipart).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, "missing 'image' form field"),
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let started = Instant::now();
    match diagnoser.diagnose(&image_bytes) {
        Ok(diagnosis) => {
            state
                .metrics
                .observe_diagnose_latency(started.elapsed().as_secs_f64());
            state.metrics.inc_diagnoses_generated();
            (
                StatusCode::OK,
                Json(DiagnoseResponse {
                    disease: diagnosis.label,
                    confidence: format!("{:.2}%", diagnosis.confidence * 100.0),
                }),
            )
                .into_response()
        }
        Err(e) if e.is_client_error() => {
            state.metrics.inc_diagnose_errors();
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            state.metrics.inc_diagnose_errors();
            error!(error = %e, "leaf diagnosis failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Pull the `image` part out of the upload, skipping unrelated fields
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<Vec<u8>>, String> {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("image") {
                    return match field.bytes().await {
                        Ok(bytes) => Ok(Some(bytes.to_vec())),
                        Err(e) => Err(format!("could not read image field: {e}")),
                    };
                }
            }
            Ok(None) => return Ok(None),
            Err(e) => return Err(format!("invalid multipart body: {e}")),
        }
    }
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict/soil_moisture", post(predict_soil_moisture))
        .route("/diagnose", post(diagnose))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
