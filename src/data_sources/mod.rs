//! Upstream clients for the weather data sources.
//!
//! Each client normalizes one public API into a typed partial record and
//! converts every failure mode into an [`AdapterFailure`] value instead of
//! propagating it, so the aggregator can proceed with partial data.
//!
//! # Data Sources
//!
//! - [`forecast`]: current conditions plus hourly/daily forecast series (mandatory)
//! - [`historical`]: re-forecast series covering the past-days window
//! - [`air_quality`]: particulate matter and European AQI
//! - [`uv_index`]: UV index snapshot and short series, gated on the payload's `ok` flag

pub mod air_quality;
pub mod forecast;
pub mod historical;
pub mod uv_index;

pub use air_quality::AirQualityClient;
pub use forecast::ForecastClient;
pub use historical::HistoricalClient;
pub use uv_index::UvIndexClient;

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Fixed per-request timeout applied to every upstream call. Expiry is
/// treated identically to a network failure.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Why an upstream could not contribute data. All three variants are
/// non-fatal to the aggregator.
#[derive(Debug, Error)]
pub enum AdapterFailure {
    /// Timeout or connection-level failure.
    #[error("network failure reaching upstream: {0}")]
    Network(String),

    /// Non-2xx status or a body that could not be decoded.
    #[error("upstream returned an unusable response: {0}")]
    Upstream(String),

    /// A valid response explicitly signaling that no data is available
    /// (e.g. the UV upstream answering 200 with `ok: false`).
    #[error("upstream reported no data available")]
    NotAvailable,
}

impl From<reqwest::Error> for AdapterFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            AdapterFailure::Network(err.to_string())
        } else {
            AdapterFailure::Upstream(err.to_string())
        }
    }
}

/// GET `url` and decode the JSON body, mapping transport errors, non-2xx
/// statuses and decode failures into the adapter failure taxonomy.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, AdapterFailure> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(UPSTREAM_TIMEOUT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AdapterFailure::Upstream(format!("status {status}")));
    }

    Ok(response.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_available_is_distinct_from_upstream() {
        let failure = AdapterFailure::NotAvailable;
        assert!(matches!(failure, AdapterFailure::NotAvailable));
        assert_eq!(failure.to_string(), "upstream reported no data available");
    }
}
