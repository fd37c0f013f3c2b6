//! Observability infrastructure for the advisor service
//!
//! Prometheus metrics for the two inference pipelines, registered once
//! in the process-global registry and exposed by the HTTP layer at
//! `/metrics`.

use prometheus::{
    register_gauge_vec, register_histogram, register_int_gauge, GaugeVec, Histogram, IntGauge,
};
use std::sync::OnceLock;

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AdvisorMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct AdvisorMetricsInner {
    forecast_latency_seconds: Histogram,
    diagnose_latency_seconds: Histogram,
    forecasts_generated: IntGauge,
    diagnoses_generated: IntGauge,
    forecast_errors: IntGauge,
    diagnose_errors: IntGauge,
    forecast_model_info: GaugeVec,
    diagnosis_classes: IntGauge,
}

impl AdvisorMetricsInner {
    fn new() -> Self {
        Self {
            forecast_latency_seconds: register_histogram!(
                "agro_advisor_forecast_latency_seconds",
                "Time spent deriving features and running moisture inference",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register forecast_latency_seconds"),

            diagnose_latency_seconds: register_histogram!(
                "agro_advisor_diagnose_latency_seconds",
                "Time spent preprocessing and classifying a leaf image",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register diagnose_latency_seconds"),

            forecasts_generated: register_int_gauge!(
                "agro_advisor_forecasts_generated_total",
                "Total number of moisture forecasts generated"
            )
            .expect("Failed to register forecasts_generated"),

            diagnoses_generated: register_int_gauge!(
                "agro_advisor_diagnoses_generated_total",
                "Total number of leaf diagnoses generated"
            )
            .expect("Failed to register diagnoses_generated"),

            forecast_errors: register_int_gauge!(
                "agro_advisor_forecast_errors_total",
                "Total number of moisture forecast failures"
            )
            .expect("Failed to register forecast_errors"),

            diagnose_errors: register_int_gauge!(
                "agro_advisor_diagnose_errors_total",
                "Total number of leaf diagnosis failures"
            )
            .expect("Failed to register diagnose_errors"),

            forecast_model_info: register_gauge_vec!(
                "agro_advisor_forecast_model_info",
                "Information about the loaded forecast model",
                &["model"]
            )
            .expect("Failed to register forecast_model_info"),

            diagnosis_classes: register_int_gauge!(
                "agro_advisor_diagnosis_classes",
                "Number of disease classes the loaded classifier can predict"
            )
            .expect("Failed to register diagnosis_classes"),
        }
    }
}

/// Advisor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct AdvisorMetrics {
    // This is just a marker - we use the global instance
    _private: (),
}

impl Default for AdvisorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AdvisorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AdvisorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record a forecast latency observation
    pub fn observe_forecast_latency(&self, duration_secs: f64) {
        self.inner().forecast_latency_seconds.observe(duration_secs);
    }

    /// Record a diagnosis latency observation
    pub fn observe_diagnose_latency(&self, duration_secs: f64) {
        self.inner().diagnose_latency_seconds.observe(duration_secs);
    }

    /// Increment forecasts generated counter
    pub fn inc_forecasts_generated(&self) {
        self.inner().forecasts_generated.inc();
    }

    /// Increment diagnoses generated counter
    pub fn inc_diagnoses_generated(&self) {
        self.inner().diagnoses_generated.inc();
    }

    /// Increment forecast errors counter
    pub fn inc_forecast_errors(&self) {
        self.inner().forecast_errors.inc();
    }

    /// Increment diagnosis errors counter
    pub fn inc_diagnose_errors(&self) {
        self.inner().diagnose_errors.inc();
    }

    /// Record which forecast model is loaded
    pub fn set_forecast_model(&self, model: &str) {
        self.inner()
            .forecast_model_info
            .with_label_values(&[model])
            .set(1.0);
    }

    /// Record how many classes the loaded classifier predicts
    pub fn set_diagnosis_classes(&self, count: i64) {
        self.inner().diagnosis_classes.set(count);
    }
}
