//! Error taxonomy for the two inference pipelines

use thiserror::Error;

/// Failures in the moisture forecast pipeline
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The model declares a feature the derivation step does not
    /// produce. Reordering silently would corrupt inference, so this
    /// is a hard failure.
    #[error("model expects feature {0:?} which is not derived from the request")]
    FeatureOrder(String),

    #[error("regression inference failed: {0}")]
    Inference(String),
}

/// Failures in the leaf diagnosis pipeline
#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error("image payload is empty")]
    EmptyImage,

    #[error("could not decode image: {0}")]
    ImageDecode(String),

    #[error("classifier produced no probabilities")]
    EmptyOutput,

    #[error("predicted class index {0} is not in the label map")]
    UnknownClass(usize),

    #[error("classifier inference failed: {0}")]
    Inference(String),
}

impl DiagnoseError {
    /// Whether the failure was caused by the uploaded image rather
    /// than the service. Drives the 400-vs-500 split at the API layer.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DiagnoseError::EmptyImage | DiagnoseError::ImageDecode(_))
    }
}
