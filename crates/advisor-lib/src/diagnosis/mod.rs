//! Leaf-photo disease diagnosis pipeline
//!
//! Preprocess the upload, run the classifier, take the arg-max class,
//! and map it to a readable label.

mod inference;
mod labels;
mod preprocess;

pub use inference::OnnxClassifier;
pub use labels::{format_label, ClassLabelMap};
pub use preprocess::{preprocess, INPUT_HEIGHT, INPUT_WIDTH};

use tract_onnx::prelude::Tensor;

use crate::error::DiagnoseError;

/// Seam over the classifier artifact so handlers and tests can swap
/// the ONNX model for a stub.
pub trait LeafClassifier: Send + Sync {
    fn probabilities(&self, input: Tensor) -> Result<Vec<f32>, DiagnoseError>;
}

/// One diagnosis. Confidence is the raw max probability, not
/// re-normalized; the response layer formats it as a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub label: String,
    pub confidence: f32,
}

/// The classifier plus its label map, immutable after load
pub struct LeafDiagnoser {
    classifier: Box<dyn LeafClassifier>,
    labels: ClassLabelMap,
}

impl LeafDiagnoser {
    pub fn new(classifier: Box<dyn LeafClassifier>, labels: ClassLabelMap) -> Self {
        Self { classifier, labels }
    }

    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    pub fn diagnose(&self, image_bytes: &[u8]) -> Result<Diagnosis, DiagnoseError> {
        let input = preprocess::preprocess(image_bytes)?;
        let probabilities = self.classifier.probabilities(input)?;
        let (index, confidence) = argmax(&probabilities).ok_or(DiagnoseError::EmptyOutput)?;
        let raw = self
            .labels
            .get(index)
            .ok_or(DiagnoseError::UnknownClass(index))?;

        Ok(Diagnosis {
            label: labels::format_label(raw),
            confidence,
        })
    }
}

fn argmax(probabilities: &[f32]) -> Option<(usize, f32)> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}
