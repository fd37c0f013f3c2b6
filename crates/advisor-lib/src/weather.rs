//! Weather-based irrigation override
//!
//! Queries the OpenWeatherMap 3-hour forecast for the configured
//! location and reports whether the next two time-slices carry enough
//! rain to skip irrigation. The lookup fails soft: a missing
//! credential, timeout, or malformed response must never block an
//! irrigation decision, so every failure path degrades to "no rain".

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// 3-hour rainfall above this many millimeters triggers the override
pub const DEFAULT_RAIN_THRESHOLD_MM: f64 = 2.0;

/// Forecast lookups are bounded so a slow provider cannot stall requests
pub const DEFAULT_WEATHER_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// How many forecast slices ahead to inspect, earliest first
const FORECAST_SLICES: usize = 2;

/// Per-request rain verdict, recomputed on every forecast request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainOutlook {
    pub rain_mm: f64,
    pub triggered: bool,
}

impl RainOutlook {
    pub fn clear() -> Self {
        Self {
            rain_mm: 0.0,
            triggered: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub rain_threshold_mm: f64,
    pub timeout: Duration,
    pub forecast_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            latitude: 21.0285,
            longitude: 105.8542,
            rain_threshold_mm: DEFAULT_RAIN_THRESHOLD_MM,
            timeout: DEFAULT_WEATHER_TIMEOUT,
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
        }
    }
}

pub struct WeatherClient {
    client: Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Check whether heavy rain is expected soon. Never fails.
    pub async fn check_rain(&self) -> RainOutlook {
        let Some(api_key) = self.config.api_key.as_deref() else {
            warn!("weather API key not configured, skipping rain check");
            return RainOutlook::clear();
        };

        match self.fetch(api_key).await {
            Ok(response) => evaluate_slices(&response.list, self.config.rain_threshold_mm),
            Err(e) => {
                warn!(error = %e, "weather lookup failed, assuming no rain");
                RainOutlook::clear()
            }
        }
    }

    async fn fetch(&self, api_key: &str) -> Result<ForecastResponse> {
        let response = self
            .client
            .get(&self.config.forecast_url)
            .query(&[
                ("lat", self.config.latitude.to_string()),
                ("lon", self.config.longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .context("Failed to send forecast request")?
            .error_for_status()
            .context("Forecast provider returned an error")?;

        response
            .json()
            .await
            .context("Failed to parse forecast response")
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastSlice>,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastSlice {
    #[serde(default)]
    rain: Option<RainVolume>,
}

#[derive(Debug, Default, Deserialize)]
struct RainVolume {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

/// Inspect the next slices, earliest first; the first one whose 3-hour
/// rainfall exceeds the threshold wins.
fn evaluate_slices(slices: &[ForecastSlice], threshold_mm: f64) -> RainOutlook {
    for slice in slices.iter().take(FORECAST_SLICES) {
        if let Some(mm) = slice.rain.as_ref().and_then(|r| r.three_hour) {
            if mm > threshold_mm {
                return RainOutlook {
                    rain_mm: mm,
                    triggered: true,
                };
            }
        }
    }
    RainOutlook::clear()
}
