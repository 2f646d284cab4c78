//! Historical re-forecast upstream client.
//!
//! Queries the previous-runs endpoint for the past-days window only. The
//! variable set carries daily mean/max/min aggregates instead of point
//! samples and excludes the live probability fields, which the upstream
//! does not provide for past days. The aggregator only invokes this client
//! when the window actually requests history.
//!
//! # API Reference
//!
//! See: <https://open-meteo.com/en/docs/previous-runs-api>

use serde::{Deserialize, Serialize};

use crate::data_sources::{AdapterFailure, get_json};
use crate::model::{Coordinate, TimeWindow};

/// Base URL for the historical re-forecast API.
const HISTORICAL_API_BASE: &str = "https://previous-runs-api.open-meteo.com/v1/forecast";

/// Variables requested at hourly cadence.
const HOURLY_VARIABLES: &str = "temperature_2m,precipitation,weathercode";

/// Variables requested at daily cadence.
const DAILY_VARIABLES: &str = "weathercode,temperature_2m_max,temperature_2m_min,\
precipitation_sum,relative_humidity_2m_max,relative_humidity_2m_min,\
relative_humidity_2m_mean,wind_speed_10m_mean,wind_direction_10m_dominant";

/// Decimal places requested from the upstream.
const DECIMAL_PLACES: u8 = 2;

/// Client for the historical re-forecast endpoint.
#[derive(Clone)]
pub struct HistoricalClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for HistoricalClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoricalClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: HISTORICAL_API_BASE.to_string(),
        }
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch hourly and daily series covering the window's past days.
    ///
    /// The forecast side of the query is pinned to one day; only the
    /// past-days coverage matters here.
    pub async fn fetch(
        &self,
        coord: Coordinate,
        window: TimeWindow,
    ) -> Result<HistoricalResponse, AdapterFailure> {
        let url = format!(
            "{}?latitude={}&longitude={}&hourly={}&daily={}\
             &forecast_days=1&past_days={}&timezone=auto&decimal_places={}",
            self.base_url,
            coord.latitude,
            coord.longitude,
            urlencoding::encode(HOURLY_VARIABLES),
            urlencoding::encode(DAILY_VARIABLES),
            window.past_days,
            DECIMAL_PLACES,
        );

        get_json(&self.client, &url).await
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Response from the historical re-forecast endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalResponse {
    /// Hourly parallel-array series.
    #[serde(default)]
    pub hourly: HistoricalHourlyBlock,

    /// Daily aggregate series.
    #[serde(default)]
    pub daily: HistoricalDailyBlock,
}

/// Hourly series block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalHourlyBlock {
    #[serde(default)]
    pub time: Vec<String>,

    #[serde(default)]
    pub temperature_2m: Vec<f64>,

    #[serde(default)]
    pub precipitation: Vec<f64>,

    #[serde(default)]
    pub weathercode: Vec<u8>,
}

/// Daily aggregate series block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalDailyBlock {
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
    pub relative_humidity_2m_max: Vec<f64>,

    #[serde(default)]
    pub relative_humidity_2m_min: Vec<f64>,

    #[serde(default)]
    pub relative_humidity_2m_mean: Vec<f64>,

    #[serde(default)]
    pub wind_speed_10m_mean: Vec<f64>,

    #[serde(default)]
    pub wind_direction_10m_dominant: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_tolerates_missing_blocks() {
        let response: HistoricalResponse = serde_json::from_str("{}").unwrap();
        assert!(response.daily.time.is_empty());
        assert!(response.hourly.time.is_empty());
    }

    #[test]
    fn test_response_decodes_daily_aggregates() {
        let body = serde_json::json!({
            "daily": {
                "time": ["2024-05-30", "2024-05-31"],
                "temperature_2m_max": [19.0, 21.5],
                "relative_humidity_2m_mean": [62.0, 58.0],
                "wind_speed_10m_mean": [11.0, 9.5]
            }
        });

        let response: HistoricalResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.daily.time.len(), 2);
        assert_eq!(response.daily.relative_humidity_2m_mean[1], 58.0);
        assert!(response.daily.precipitation_sum.is_empty());
    }
}
