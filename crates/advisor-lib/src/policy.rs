//! Irrigation decision policy
//!
//! Combines the weather override with the predicted moisture. The
//! ordering is deliberate: imminent rain cancels irrigation no matter
//! how far below the threshold the prediction falls.

use serde::Serialize;

use crate::weather::RainOutlook;

/// Moisture percentage below which irrigation is recommended
pub const DEFAULT_MOISTURE_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IrrigationAction {
    None,
    SkipIrrigation,
    ScheduleIrrigation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrrigationAdvice {
    pub action: IrrigationAction,
    pub message: String,
}

/// First match wins: rain override, then the strict below-threshold
/// check, then no action.
pub fn decide(predicted_moisture: f64, outlook: &RainOutlook, threshold: f64) -> IrrigationAdvice {
    if outlook.triggered {
        IrrigationAdvice {
            action: IrrigationAction::SkipIrrigation,
            message: format!(
                "Rain expected ({}mm). Skipping irrigation to save water.",
                outlook.rain_mm
            ),
        }
    } else if predicted_moisture < threshold {
        IrrigationAdvice {
            action: IrrigationAction::ScheduleIrrigation,
            message: format!(
                "Soil moisture is forecast to drop below the {}% threshold. Schedule irrigation.",
                threshold
            ),
        }
    } else {
        IrrigationAdvice {
            action: IrrigationAction::None,
            message: "No action needed.".to_string(),
        }
    }
}
