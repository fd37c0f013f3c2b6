//! Integration tests for the advisor API endpoints

use advisor::api::{create_router, AppState};
use advisor_lib::diagnosis::{ClassLabelMap, LeafClassifier, LeafDiagnoser};
use advisor_lib::error::{DiagnoseError, ForecastError};
use advisor_lib::forecaster::{ForecastMetadata, MoistureForecaster, MoistureRegressor};
use advisor_lib::models::FeatureVector;
use advisor_lib::observability::AdvisorMetrics;
use advisor_lib::weather::{WeatherClient, WeatherConfig};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;
use tract_onnx::prelude::Tensor;

struct StubRegressor {
    delta: f64,
}

impl MoistureRegressor for StubRegressor {
    fn predict_delta(&self, _vector: &FeatureVector) -> Result<f64, ForecastError> {
        Ok(self.delta)
    }
}

struct FailingRegressor;

impl MoistureRegressor for FailingRegressor {
    fn predict_delta(&self, _vector: &FeatureVector) -> Result<f64, ForecastError> {
        Err(ForecastError::Inference("tensor shape mismatch".to_string()))
    }
}

struct StubClassifier {
    probabilities: Vec<f32>,
}

impl LeafClassifier for StubClassifier {
    fn probabilities(&self, _input: Tensor) -> Result<Vec<f32>, DiagnoseError> {
        Ok(self.probabilities.clone())
    }
}

fn test_metadata() -> ForecastMetadata {
    ForecastMetadata {
        feature_names: [
            "soilMoisture",
            "temperature",
            "humidity",
            "lightIntensity",
            "soilMoisture_lag_60",
            "temperature_lag_60",
            "soilMoisture_lag_30",
            "soilMoisture_lag_10",
            "temperature_lag_30",
            "temperature_lag_10",
            "soilMoisture_rolling_mean",
            "temperature_rolling_mean",
            "lightIntensity_rolling_mean",
            "hour",
            "dayofweek",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        model_name: Some("RandomForestRegressor".to_string()),
        r2_score: Some(0.9),
        validation_score: None,
        oob_score: None,
    }
}

fn test_diagnoser(probabilities: Vec<f32>) -> LeafDiagnoser {
    let labels = ClassLabelMap::from_json(
        r#"{"Tomato___Early_blight": 0, "Tomato___healthy": 1, "Potato___Late_blight": 2}"#,
    )
    .unwrap();
    LeafDiagnoser::new(Box::new(StubClassifier { probabilities }), labels)
}

/// No API key configured, so the rain check degrades to "no rain"
/// without touching the network
fn offline_weather() -> WeatherClient {
    WeatherClient::new(WeatherConfig {
        api_key: None,
        ..WeatherConfig::default()
    })
    .unwrap()
}

fn test_app(regressor: Box<dyn MoistureRegressor>, diagnoser: Option<LeafDiagnoser>) -> Router {
    let state = Arc::new(AppState {
        forecaster: MoistureForecaster::new(regressor, test_metadata()),
        diagnoser,
        weather: offline_weather(),
        moisture_threshold: 30.0,
        metrics: AdvisorMetrics::new(),
    });
    create_router(state)
}

fn predict_body() -> String {
    serde_json::json!({
        "current_data": {
            "temperature": 28.0,
            "humidity": 65.0,
            "lightIntensity": 1200.0
        },
        "historical_data": {
            "soilMoisture_lag_60": 40.0,
            "temperature_lag_60": 26.0,
            "soilMoisture_rolling_mean_60m": 41.5,
            "temperature_rolling_mean_60m": 26.8,
            "lightIntensity_rolling_mean_60m": 1100.0
        }
    })
    .to_string()
}

fn predict_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict/soil_moisture")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn leaf_jpeg() -> Vec<u8> {
    let img = RgbImage::from_pixel(10, 10, Rgb([40, 160, 40]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .unwrap();
    buffer
}

fn multipart_request(field_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "advisor-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; \
             name=\"{field_name}\"; filename=\"leaf.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/diagnose")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_is_healthy() {
    let app = test_app(Box::new(StubRegressor { delta: 0.0 }), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "status": "healthy" })
    );
}

#[tokio::test]
async fn test_predict_schedules_irrigation_when_dry() {
    let app = test_app(Box::new(StubRegressor { delta: -15.0 }), None);

    let response = app.oneshot(predict_request(predict_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["suggestion"]["action"], "SCHEDULE_IRRIGATION");
    assert_eq!(body["suggestion"]["confidence"], 0.9);
    assert_eq!(body["suggestion"]["details"]["predicted_delta"], -15.0);
    assert_eq!(body["suggestion"]["details"]["current_moisture"], 40.0);
    assert_eq!(body["suggestion"]["details"]["threshold"], 30.0);
    assert_eq!(body["predictions"][0]["predicted_soil_moisture"], 25.0);
    assert_eq!(body["model_info"]["model_type"], "RandomForestRegressor");
    assert_eq!(body["model_info"]["features_used"], 15);
}

#[tokio::test]
async fn test_predict_takes_no_action_at_the_threshold() {
    // 40.0 - 10.0 lands exactly on the 30.0 threshold; the comparison
    // is strict, so nothing is scheduled
    let app = test_app(Box::new(StubRegressor { delta: -10.0 }), None);

    let response = app.oneshot(predict_request(predict_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["suggestion"]["action"], "NONE");
    assert_eq!(body["predictions"][0]["predicted_soil_moisture"], 30.0);
}

#[tokio::test]
async fn test_predict_rejects_missing_fields() {
    let app = test_app(Box::new(StubRegressor { delta: 0.0 }), None);

    let body = serde_json::json!({
        "current_data": {
            "temperature": 28.0,
            "humidity": 65.0,
            "lightIntensity": 1200.0
        }
    })
    .to_string();

    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_predict_maps_inference_failure_to_500() {
    let app = test_app(Box::new(FailingRegressor), None);

    let response = app.oneshot(predict_request(predict_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("tensor shape mismatch"));
}

#[tokio::test]
async fn test_diagnose_reports_winning_class() {
    let app = test_app(
        Box::new(StubRegressor { delta: 0.0 }),
        Some(test_diagnoser(vec![0.05, 0.15, 0.8])),
    );

    let response = app
        .oneshot(multipart_request("image", &leaf_jpeg()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["disease"], "Potato - Late blight");
    assert_eq!(body["confidence"], "80.00%");
}

#[tokio::test]
async fn test_diagnose_rejects_missing_image_field() {
    let app = test_app(
        Box::new(StubRegressor { delta: 0.0 }),
        Some(test_diagnoser(vec![1.0])),
    );

    let response = app
        .oneshot(multipart_request("file", &leaf_jpeg()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("image"));
}

#[tokio::test]
async fn test_diagnose_rejects_empty_upload() {
    let app = test_app(
        Box::new(StubRegressor { delta: 0.0 }),
        Some(test_diagnoser(vec![1.0])),
    );

    let response = app.oneshot(multipart_request("image", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "image payload is empty");
}

#[tokio::test]
async fn test_diagnose_rejects_undecodable_bytes() {
    let app = test_app(
        Box::new(StubRegressor { delta: 0.0 }),
        Some(test_diagnoser(vec![1.0])),
    );

    let response = app
        .oneshot(multipart_request("image", b"definitely not a jpeg"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("decode"));
}

#[tokio::test]
async fn test_diagnose_unavailable_without_classifier() {
    let app = test_app(Box::new(StubRegressor { delta: 0.0 }), None);

    let response = app
        .oneshot(multipart_request("image", &leaf_jpeg()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("classifier"));
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let app = test_app(Box::new(StubRegressor { delta: -15.0 }), None);

    // Generate one forecast so the counters have been touched
    let _ = app
        .clone()
        .oneshot(predict_request(predict_body()))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("agro_advisor_forecast_latency_seconds"));
    assert!(metrics_text.contains("agro_advisor_forecasts_generated_total"));
    assert!(metrics_text.contains("agro_advisor_diagnose_latency_seconds"));
}
