//! UV-index upstream client.
//!
//! The UV upstream wraps its payload in an `ok` flag that is independent of
//! HTTP success: a 200 response with `ok: false` means "no data for this
//! location", not an error. That case maps to
//! [`AdapterFailure::NotAvailable`], and the aggregator leaves the UV field
//! undefined rather than zeroing it, since zero UV is a valid observation.
//!
//! # API Reference
//!
//! See: <https://currentuvindex.com/api>

use serde::{Deserialize, Serialize};

use crate::data_sources::{AdapterFailure, get_json};
use crate::model::Coordinate;

/// Base URL for the UV-index API.
const UV_API_BASE: &str = "https://currentuvindex.com/api/v1/uvi";

/// Client for the UV-index endpoint.
#[derive(Clone)]
pub struct UvIndexClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for UvIndexClient {
    fn default() -> Self {
        Self::new()
    }
}

impl UvIndexClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: UV_API_BASE.to_string(),
        }
    }

    /// Create a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch the UV snapshot for a coordinate.
    ///
    /// Returns [`AdapterFailure::NotAvailable`] when the upstream answers
    /// successfully but flags the payload `ok: false`.
    pub async fn fetch(&self, coord: Coordinate) -> Result<UvIndexResponse, AdapterFailure> {
        let url = format!(
            "{}?latitude={}&longitude={}",
            self.base_url, coord.latitude, coord.longitude,
        );

        let response: UvIndexResponse = get_json(&self.client, &url).await?;
        if !response.ok {
            return Err(AdapterFailure::NotAvailable);
        }
        Ok(response)
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Response from the UV-index endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UvIndexResponse {
    /// Upstream-specific success flag, distinct from HTTP status.
    #[serde(default)]
    pub ok: bool,

    /// Snapshot at the current instant.
    #[serde(default)]
    pub now: UvPoint,

    /// Short-range forecast points.
    #[serde(default)]
    pub forecast: Vec<UvPoint>,

    /// Recent history points.
    #[serde(default)]
    pub history: Vec<UvPoint>,
}

/// A single UV reading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UvPoint {
    /// ISO-8601 timestamp of the reading.
    #[serde(default)]
    pub time: String,

    /// UV index value.
    #[serde(default)]
    pub uvi: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_decodes_snapshot() {
        let body = serde_json::json!({
            "ok": true,
            "now": { "time": "2024-06-01T12:00:00Z", "uvi": 6.4 },
            "forecast": [ { "time": "2024-06-01T13:00:00Z", "uvi": 6.1 } ],
            "history": []
        });

        let response: UvIndexResponse = serde_json::from_value(body).unwrap();
        assert!(response.ok);
        assert_eq!(response.now.uvi, 6.4);
        assert_eq!(response.forecast.len(), 1);
    }

    #[test]
    fn test_ok_defaults_to_false() {
        let response: UvIndexResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.ok);
    }
}
