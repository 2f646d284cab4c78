//! Aggregation of the four upstream sources into one weather record.
//!
//! The aggregator fans out to every applicable upstream concurrently and
//! waits for all of them to settle before merging. Each branch resolves to
//! its own `Result`, so one source failing never aborts the others. Only
//! the forecast source is mandatory; air quality, UV and history degrade to
//! absent or defaulted fields.

use thiserror::Error;
use tracing::warn;

use crate::data_sources::{
    AdapterFailure, AirQualityClient, ForecastClient, HistoricalClient, UvIndexClient,
};
use crate::data_sources::air_quality::AirQualityResponse;
use crate::data_sources::forecast::ForecastResponse;
use crate::data_sources::historical::HistoricalResponse;
use crate::data_sources::uv_index::UvIndexResponse;
use crate::model::{
    AirQuality, Coordinate, CurrentConditions, DailySeries, HistoricalBlock, HistoricalDaily,
    HistoricalHourly, HourlySeries, TimeWindow, WeatherKind, WeatherRecord,
};

/// Aggregation fails only when the mandatory forecast source does.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("forecast unavailable: {0}")]
    ForecastUnavailable(#[source] AdapterFailure),
}

/// Orchestrates the upstream clients and owns the merge policy.
#[derive(Clone, Default)]
pub struct Aggregator {
    forecast: ForecastClient,
    historical: HistoricalClient,
    air_quality: AirQualityClient,
    uv_index: UvIndexClient,
}

impl Aggregator {
    /// Create an aggregator against the production upstreams.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator over caller-supplied clients (for testing
    /// against mock upstreams).
    pub fn with_clients(
        forecast: ForecastClient,
        historical: HistoricalClient,
        air_quality: AirQualityClient,
        uv_index: UvIndexClient,
    ) -> Self {
        Self {
            forecast,
            historical,
            air_quality,
            uv_index,
        }
    }

    /// Fetch every applicable source concurrently and merge the settled
    /// results into one [`WeatherRecord`].
    ///
    /// The historical client is only invoked when the window requests past
    /// days. All four fetches run concurrently and all are awaited before
    /// merging; there is no early merge on first-complete.
    pub async fn aggregate(
        &self,
        coord: Coordinate,
        window: TimeWindow,
    ) -> Result<WeatherRecord, AggregationError> {
        let historical = async {
            if window.past_days > 0 {
                Some(self.historical.fetch(coord, window).await)
            } else {
                None
            }
        };

        let (forecast, historical, air_quality, uv_index) = tokio::join!(
            self.forecast.fetch(coord, window),
            historical,
            self.air_quality.fetch(coord),
            self.uv_index.fetch(coord),
        );

        merge(forecast, air_quality, uv_index, historical)
    }
}

/// Merge the settled adapter results into one record.
///
/// The policy per optional source is explicit:
/// - air quality: default to a zeroed block when absent
/// - UV: leave undefined when absent (zero UV is a valid observation)
/// - historical: attach iff the fetch ran and succeeded, built purely from
///   the historical response, never spliced with forecast series
pub fn merge(
    forecast: Result<ForecastResponse, AdapterFailure>,
    air_quality: Result<AirQualityResponse, AdapterFailure>,
    uv_index: Result<UvIndexResponse, AdapterFailure>,
    historical: Option<Result<HistoricalResponse, AdapterFailure>>,
) -> Result<WeatherRecord, AggregationError> {
    let forecast = forecast.map_err(AggregationError::ForecastUnavailable)?;

    let air_quality = match air_quality {
        Ok(response) => AirQuality {
            pm10: response.current.pm10,
            pm2_5: response.current.pm2_5,
            european_aqi: response.current.european_aqi,
        },
        Err(failure) => {
            warn!(%failure, "air quality unavailable, defaulting to zeroed block");
            AirQuality::default()
        }
    };

    let uv_index = match uv_index {
        Ok(response) => Some(response.now.uvi),
        Err(AdapterFailure::NotAvailable) => {
            warn!("uv index reported no data for this location");
            None
        }
        Err(failure) => {
            warn!(%failure, "uv index unavailable");
            None
        }
    };

    let current = CurrentConditions {
        time: forecast.current.time,
        temperature_2m: forecast.current.temperature_2m,
        relative_humidity_2m: forecast.current.relative_humidity_2m,
        apparent_temperature: forecast.current.apparent_temperature,
        precipitation: forecast.current.precipitation,
        weathercode: validate_code(forecast.current.weathercode, "current"),
        cloud_cover: forecast.current.cloud_cover,
        wind_speed_10m: forecast.current.wind_speed_10m,
        wind_direction_10m: forecast.current.wind_direction_10m,
        wind_gusts_10m: forecast.current.wind_gusts_10m,
        air_quality,
        uv_index,
    };

    let hourly = HourlySeries {
        time: forecast.hourly.time,
        temperature_2m: forecast.hourly.temperature_2m,
        relative_humidity_2m: forecast.hourly.relative_humidity_2m,
        precipitation: forecast.hourly.precipitation,
        precipitation_probability: forecast.hourly.precipitation_probability,
        weathercode: validate_codes(forecast.hourly.weathercode, "hourly"),
        wind_speed_10m: forecast.hourly.wind_speed_10m,
    };

    let daily = DailySeries {
        time: forecast.daily.time,
        weathercode: validate_codes(forecast.daily.weathercode, "daily"),
        temperature_2m_max: forecast.daily.temperature_2m_max,
        temperature_2m_min: forecast.daily.temperature_2m_min,
        precipitation_sum: forecast.daily.precipitation_sum,
        precipitation_probability_max: forecast.daily.precipitation_probability_max,
        wind_speed_10m_max: forecast.daily.wind_speed_10m_max,
        wind_direction_10m_dominant: forecast.daily.wind_direction_10m_dominant,
        sunrise: forecast.daily.sunrise,
        sunset: forecast.daily.sunset,
    };

    let historical = match historical {
        Some(Ok(response)) => Some(HistoricalBlock {
            daily: HistoricalDaily {
                time: response.daily.time,
                weathercode: validate_codes(response.daily.weathercode, "historical daily"),
                temperature_2m_max: response.daily.temperature_2m_max,
                temperature_2m_min: response.daily.temperature_2m_min,
                precipitation_sum: response.daily.precipitation_sum,
                relative_humidity_2m_max: response.daily.relative_humidity_2m_max,
                relative_humidity_2m_min: response.daily.relative_humidity_2m_min,
                relative_humidity_2m_mean: response.daily.relative_humidity_2m_mean,
                wind_speed_10m_mean: response.daily.wind_speed_10m_mean,
                wind_direction_10m_dominant: response.daily.wind_direction_10m_dominant,
            },
            hourly: HistoricalHourly {
                time: response.hourly.time,
                temperature_2m: response.hourly.temperature_2m,
                precipitation: response.hourly.precipitation,
                weathercode: validate_codes(response.hourly.weathercode, "historical hourly"),
            },
        }),
        Some(Err(failure)) => {
            warn!(%failure, "historical data unavailable, omitting block");
            None
        }
        None => None,
    };

    Ok(WeatherRecord {
        current,
        hourly,
        daily,
        historical,
    })
}

/// Validate one code against the closed WMO set. Unrecognized codes are
/// kept in the record but logged; every surfacing point classifies them as
/// [`WeatherKind::Unknown`].
fn validate_code(code: u8, axis: &str) -> u8 {
    if WeatherKind::from_code(code) == WeatherKind::Unknown {
        warn!(code, axis, "unrecognized weather code");
    }
    code
}

fn validate_codes(codes: Vec<u8>, axis: &str) -> Vec<u8> {
    for &code in &codes {
        if WeatherKind::from_code(code) == WeatherKind::Unknown {
            warn!(code, axis, "unrecognized weather code");
        }
    }
    codes
}
