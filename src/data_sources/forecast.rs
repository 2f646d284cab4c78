//! Forecast upstream client.
//!
//! Queries the Open-Meteo forecast endpoint for a current-conditions block
//! plus hourly and daily series over the requested window. This is the one
//! mandatory source: aggregation fails when this client does.
//!
//! # API Reference
//!
//! See: <https://open-meteo.com/en/docs>

use serde::{Deserialize, Serialize};

use crate::data_sources::{AdapterFailure, get_json};
use crate::model::{Coordinate, TimeWindow};

/// Base URL for the forecast API.
const FORECAST_API_BASE: &str = "https://api.open-meteo.com/v1/forecast";

/// Variables requested for the current-conditions block.
const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,weathercode,cloud_cover,wind_speed_10m,wind_direction_10m,wind_gusts_10m";

/// Variables requested at hourly cadence.
const HOURLY_VARIABLES: &str = "temperature_2m,relative_humidity_2m,precipitation,\
precipitation_probability,weathercode,wind_speed_10m";

/// Variables requested at daily cadence.
const DAILY_VARIABLES: &str = "weathercode,temperature_2m_max,temperature_2m_min,\
precipitation_sum,precipitation_probability_max,wind_speed_10m_max,\
wind_direction_10m_dominant,sunrise,sunset";

/// Decimal places requested from the upstream.
const DECIMAL_PLACES: u8 = 2;

/// Client for the forecast endpoint.
#[derive(Clone)]
pub struct ForecastClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: FORECAST_API_BASE.to_string(),
        }
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch current conditions plus hourly/daily series for the window.
    pub async fn fetch(
        &self,
        coord: Coordinate,
        window: TimeWindow,
    ) -> Result<ForecastResponse, AdapterFailure> {
        let url = format!(
            "{}?latitude={}&longitude={}&current={}&hourly={}&daily={}\
             &forecast_days={}&past_days={}&timezone=auto&decimal_places={}",
            self.base_url,
            coord.latitude,
            coord.longitude,
            urlencoding::encode(CURRENT_VARIABLES),
            urlencoding::encode(HOURLY_VARIABLES),
            urlencoding::encode(DAILY_VARIABLES),
            window.forecast_days,
            window.past_days,
            DECIMAL_PLACES,
        );

        get_json(&self.client, &url).await
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Response from the forecast endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// Current-conditions block.
    #[serde(default)]
    pub current: ForecastCurrent,

    /// Hourly parallel-array series.
    #[serde(default)]
    pub hourly: ForecastHourly,

    /// Daily parallel-array series.
    #[serde(default)]
    pub daily: ForecastDaily,
}

/// Current conditions as reported by the forecast upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastCurrent {
    /// ISO-8601 timestamp of the observation.
    #[serde(default)]
    pub time: String,

    #[serde(default)]
    pub temperature_2m: f64,

    #[serde(default)]
    pub relative_humidity_2m: f64,

    #[serde(default)]
    pub apparent_temperature: f64,

    #[serde(default)]
    pub precipitation: f64,

    /// WMO weather code.
    #[serde(default)]
    pub weathercode: u8,

    #[serde(default)]
    pub cloud_cover: f64,

    #[serde(default)]
    pub wind_speed_10m: f64,

    #[serde(default)]
    pub wind_direction_10m: f64,

    #[serde(default)]
    pub wind_gusts_10m: f64,
}

/// Hourly series block. All value arrays parallel the `time` axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastHourly {
    #[serde(default)]
    pub time: Vec<String>,

    #[serde(default)]
    pub temperature_2m: Vec<f64>,

    #[serde(default)]
    pub relative_humidity_2m: Vec<f64>,

    #[serde(default)]
    pub precipitation: Vec<f64>,

    #[serde(default)]
    pub precipitation_probability: Vec<f64>,

    #[serde(default)]
    pub weathercode: Vec<u8>,

    #[serde(default)]
    pub wind_speed_10m: Vec<f64>,
}

/// Daily series block. All value arrays parallel the `time` axis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastDaily {
    #[serde(default)]
    pub time: Vec<String>,

    #[serde(default)]
    pub weathercode: Vec<u8>,

    #[serde(default)]
    pub temperature_2m_max: Vec<f64>,

    #[serde(default)]
    pub temperature_2m_min: Vec<f64>,

    #[serde(default)]
    pub precipitation_sum: Vec<f64>,

    #[serde(default)]
    pub precipitation_probability_max: Vec<f64>,

    #[serde(default)]
    pub wind_speed_10m_max: Vec<f64>,

    #[serde(default)]
    pub wind_direction_10m_dominant: Vec<f64>,

    #[serde(default)]
    pub sunrise: Vec<String>,

    #[serde(default)]
    pub sunset: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_tolerates_missing_blocks() {
        let response: ForecastResponse = serde_json::from_str("{}").unwrap();
        assert!(response.hourly.time.is_empty());
        assert!(response.daily.time.is_empty());
        assert_eq!(response.current.temperature_2m, 0.0);
    }

    #[test]
    fn test_response_decodes_parallel_arrays() {
        let body = serde_json::json!({
            "current": { "time": "2024-06-01T12:00", "temperature_2m": 22.5, "weathercode": 1 },
            "hourly": {
                "time": ["2024-06-01T00:00", "2024-06-01T01:00"],
                "temperature_2m": [18.0, 17.5],
                "weathercode": [1, 2]
            },
            "daily": {
                "time": ["2024-06-01"],
                "temperature_2m_max": [24.0],
                "temperature_2m_min": [15.0]
            }
        });

        let response: ForecastResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.current.temperature_2m, 22.5);
        assert_eq!(response.hourly.time.len(), 2);
        assert_eq!(response.hourly.temperature_2m[1], 17.5);
        assert_eq!(response.daily.temperature_2m_max[0], 24.0);
    }
}
