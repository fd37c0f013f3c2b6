//! Confidence resolution for the moisture forecast
//!
//! A single confidence value is derived from an ordered list of
//! candidate sources; the first tier with a value wins. Keeping the
//! chain explicit lets tests assert which tier produced the value.

use serde::Serialize;

/// Confidence used when no score survived training export
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

/// The tier a confidence value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    /// R² recorded in the training metadata sidecar
    TrainingMetadata,
    /// Validation score the estimator tracked during training
    ValidationScore,
    /// Out-of-bag score, for bagged ensembles
    OutOfBagScore,
    /// Fixed fallback
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confidence {
    pub value: f64,
    pub source: ConfidenceSource,
}

/// Evaluate tiers in order; the first `Some` wins. The fixed default is
/// always appended last, so this never fails to produce a value.
pub fn resolve(tiers: &[(ConfidenceSource, Option<f64>)]) -> Confidence {
    for (source, value) in tiers {
        if let Some(v) = *value {
            return Confidence {
                value: v,
                source: *source,
            };
        }
    }
    Confidence {
        value: DEFAULT_CONFIDENCE,
        source: ConfidenceSource::Default,
    }
}
