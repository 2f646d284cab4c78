//! Air-quality upstream client.
//!
//! Queries the air-quality endpoint for the current particulate and
//! European AQI readings plus an hourly series. Failure here degrades the
//! merged record to a zeroed air-quality block; it never fails aggregation.
//!
//! # API Reference
//!
//! See: <https://open-meteo.com/en/docs/air-quality-api>

use serde::{Deserialize, Serialize};

use crate::data_sources::{AdapterFailure, get_json};
use crate::model::Coordinate;

/// Base URL for the air-quality API.
const AIR_QUALITY_API_BASE: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

/// Variables requested for both the current block and the hourly series.
const VARIABLES: &str = "pm10,pm2_5,european_aqi";

/// Client for the air-quality endpoint.
#[derive(Clone)]
pub struct AirQualityClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for AirQualityClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AirQualityClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: AIR_QUALITY_API_BASE.to_string(),
        }
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch the current air-quality snapshot and hourly series.
    pub async fn fetch(&self, coord: Coordinate) -> Result<AirQualityResponse, AdapterFailure> {
        let url = format!(
            "{}?latitude={}&longitude={}&current={}&hourly={}&timezone=auto",
            self.base_url,
            coord.latitude,
            coord.longitude,
            urlencoding::encode(VARIABLES),
            urlencoding::encode(VARIABLES),
        );

        get_json(&self.client, &url).await
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Response from the air-quality endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirQualityResponse {
    /// Current snapshot.
    #[serde(default)]
    pub current: AirQualityCurrent,

    /// Hourly parallel-array series.
    #[serde(default)]
    pub hourly: AirQualityHourly,
}

/// Current air-quality snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirQualityCurrent {
    #[serde(default)]
    pub time: String,

    #[serde(default)]
    pub pm10: f64,

    #[serde(default)]
    pub pm2_5: f64,

    #[serde(default)]
    pub european_aqi: f64,
}

/// Hourly air-quality series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirQualityHourly {
    #[serde(default)]
    pub time: Vec<String>,

    #[serde(default)]
    pub pm10: Vec<f64>,

    #[serde(default)]
    pub pm2_5: Vec<f64>,

    #[serde(default)]
    pub european_aqi: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_decodes_current_block() {
        let body = serde_json::json!({
            "current": { "time": "2024-06-01T12:00", "pm10": 12.0, "pm2_5": 5.0, "european_aqi": 18.0 }
        });

        let response: AirQualityResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.current.pm10, 12.0);
        assert_eq!(response.current.european_aqi, 18.0);
        assert!(response.hourly.time.is_empty());
    }
}
