//! ONNX inference for the leaf disease classifier

use anyhow::{Context, Result};
use std::path::Path;
use tract_onnx::prelude::*;

use super::preprocess::{INPUT_HEIGHT, INPUT_WIDTH};
use super::LeafClassifier;
use crate::error::DiagnoseError;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Image classifier loaded through tract
pub struct OnnxClassifier {
    model: TractModel,
}

impl OnnxClassifier {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read classifier model {}", path.display()))?;
        Self::from_bytes(&bytes)
    }

    /// Load and optimize the ONNX model, pinning the input shape to a
    /// single NHWC image.
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(
                0,
                f32::fact([1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize, 3]).into(),
            )
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        Ok(Self { model })
    }
}

impl LeafClassifier for OnnxClassifier {
    fn probabilities(&self, input: Tensor) -> Result<Vec<f32>, DiagnoseError> {
        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| DiagnoseError::Inference(e.to_string()))?;
        let output = result
            .get(0)
            .ok_or_else(|| DiagnoseError::Inference("classifier produced no output".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| DiagnoseError::Inference(e.to_string()))?;

        Ok(view.iter().copied().collect())
    }
}
