//! Feature derivation for the moisture forecast model
//!
//! Converts a (current reading, historical aggregate) pair into the
//! named features the model was trained on. Intermediate lags are
//! interpolated from the 60-minute values because the platform only
//! aggregates at that granularity.

use chrono::{DateTime, Datelike, Local, Timelike};

use crate::error::ForecastError;
use crate::models::{FeatureVector, HistoricalAggregate, SensorReading};

pub const SOIL_MOISTURE: &str = "soilMoisture";
pub const TEMPERATURE: &str = "temperature";
pub const HUMIDITY: &str = "humidity";
pub const LIGHT_INTENSITY: &str = "lightIntensity";
pub const SOIL_MOISTURE_LAG_60: &str = "soilMoisture_lag_60";
pub const TEMPERATURE_LAG_60: &str = "temperature_lag_60";
pub const SOIL_MOISTURE_LAG_30: &str = "soilMoisture_lag_30";
pub const SOIL_MOISTURE_LAG_10: &str = "soilMoisture_lag_10";
pub const TEMPERATURE_LAG_30: &str = "temperature_lag_30";
pub const TEMPERATURE_LAG_10: &str = "temperature_lag_10";
pub const SOIL_MOISTURE_ROLLING_MEAN: &str = "soilMoisture_rolling_mean";
pub const TEMPERATURE_ROLLING_MEAN: &str = "temperature_rolling_mean";
pub const LIGHT_INTENSITY_ROLLING_MEAN: &str = "lightIntensity_rolling_mean";
pub const HOUR: &str = "hour";
pub const DAY_OF_WEEK: &str = "dayofweek";

/// Named features in derivation order. The forecast model dictates the
/// final ordering via [`FeatureSet::ordered`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    features: Vec<(&'static str, f64)>,
}

impl FeatureSet {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features.iter().map(|(n, _)| *n)
    }

    /// Reorder into the model's declared feature order. Fails if the
    /// model declares a feature that was not derived.
    pub fn ordered(&self, order: &[String]) -> Result<FeatureVector, ForecastError> {
        let mut values = Vec::with_capacity(order.len());
        for name in order {
            let value = self
                .get(name)
                .ok_or_else(|| ForecastError::FeatureOrder(name.clone()))?;
            values.push(value);
        }
        Ok(FeatureVector::new(order.to_vec(), values))
    }
}

/// Derive the model's features from one request. Pure: the wall-clock
/// instant is passed in by the caller so time-dependent features stay
/// reproducible under test.
///
/// There is no live soil-moisture sensor value in the request; the
/// 60-minute lag stands in for "current" moisture both here and as the
/// base the predicted delta is applied to.
pub fn derive(
    current: &SensorReading,
    historical: &HistoricalAggregate,
    now: DateTime<Local>,
) -> FeatureSet {
    let proxy = historical.soil_moisture_lag_60;
    let lag_60 = historical.soil_moisture_lag_60;
    let t_lag_60 = historical.temperature_lag_60;

    let features = vec![
        (SOIL_MOISTURE, proxy),
        (TEMPERATURE, current.temperature),
        (HUMIDITY, current.humidity),
        (LIGHT_INTENSITY, current.light_intensity),
        (SOIL_MOISTURE_LAG_60, lag_60),
        (TEMPERATURE_LAG_60, t_lag_60),
        (SOIL_MOISTURE_LAG_30, (lag_60 + proxy) / 2.0),
        (SOIL_MOISTURE_LAG_10, (lag_60 + 2.0 * proxy) / 3.0),
        (TEMPERATURE_LAG_30, (t_lag_60 + current.temperature) / 2.0),
        (
            TEMPERATURE_LAG_10,
            (t_lag_60 + 2.0 * current.temperature) / 3.0,
        ),
        (
            SOIL_MOISTURE_ROLLING_MEAN,
            historical.soil_moisture_rolling_mean_60m,
        ),
        (
            TEMPERATURE_ROLLING_MEAN,
            historical.temperature_rolling_mean_60m,
        ),
        (
            LIGHT_INTENSITY_ROLLING_MEAN,
            historical.light_intensity_rolling_mean_60m,
        ),
        (HOUR, f64::from(now.hour())),
        (
            DAY_OF_WEEK,
            f64::from(now.weekday().num_days_from_monday()),
        ),
    ];

    FeatureSet { features }
}
