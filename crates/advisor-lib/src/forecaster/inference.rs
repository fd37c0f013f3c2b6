//! ONNX inference for the soil-moisture delta model
//!
//! The regression artifact is exported to ONNX and loaded via
//! tract-onnx. ONNX carries no sklearn-style `feature_names_in_`, so
//! the export writes a JSON sidecar with the declared feature order and
//! whatever scores the estimator tracked during training.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tract_onnx::prelude::*;

use super::MoistureRegressor;
use crate::error::ForecastError;
use crate::models::FeatureVector;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Sidecar metadata written next to the exported ONNX model.
/// `feature_names` is the model's declared input order and is
/// required; the scores are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMetadata {
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub r2_score: Option<f64>,
    #[serde(default)]
    pub validation_score: Option<f64>,
    #[serde(default)]
    pub oob_score: Option<f64>,
}

impl ForecastMetadata {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read forecast metadata {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let metadata: Self =
            serde_json::from_str(raw).context("Failed to parse forecast metadata")?;
        if metadata.feature_names.is_empty() {
            anyhow::bail!("forecast metadata declares no feature names");
        }
        Ok(metadata)
    }
}

/// Regression model loaded through tract
pub struct OnnxRegressor {
    model: TractModel,
    num_features: usize,
    validation_score: Option<f64>,
    oob_score: Option<f64>,
}

impl OnnxRegressor {
    pub fn from_file(path: &Path, metadata: &ForecastMetadata) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read forecast model {}", path.display()))?;
        Self::from_bytes(&bytes, metadata)
    }

    /// Load and optimize the ONNX model, pinning the input shape to
    /// one row of the declared features.
    pub fn from_bytes(model_bytes: &[u8], metadata: &ForecastMetadata) -> Result<Self> {
        let num_features = metadata.feature_names.len();
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, num_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        Ok(Self {
            model,
            num_features,
            validation_score: metadata.validation_score,
            oob_score: metadata.oob_score,
        })
    }
}

impl MoistureRegressor for OnnxRegressor {
    fn predict_delta(&self, vector: &FeatureVector) -> Result<f64, ForecastError> {
        if vector.len() != self.num_features {
            return Err(ForecastError::Inference(format!(
                "feature vector has {} values, model expects {}",
                vector.len(),
                self.num_features
            )));
        }

        let data: Vec<f32> = vector.values().iter().map(|v| *v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.num_features), data)
            .map_err(|e| ForecastError::Inference(e.to_string()))?
            .into();

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| ForecastError::Inference(e.to_string()))?;
        let output = result
            .get(0)
            .ok_or_else(|| ForecastError::Inference("model produced no output".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| ForecastError::Inference(e.to_string()))?;
        let delta = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| ForecastError::Inference("model output is empty".to_string()))?;

        Ok(f64::from(delta))
    }

    fn validation_score(&self) -> Option<f64> {
        self.validation_score
    }

    fn oob_score(&self) -> Option<f64> {
        self.oob_score
    }
}
