//! Data models for Stratus.
//!
//! The aggregate root is [`WeatherRecord`]: one unit-agnostic, per-location
//! weather record merged from the forecast, historical, air-quality and
//! UV-index upstreams. A record is constructed fresh on every aggregation
//! call and is immutable once returned; selection and derivation layers read
//! it, they never mutate it.
//!
//! All time series are parallel arrays sharing one `time` axis per cadence:
//! for every field of a series, `values.len() == time.len()`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A latitude/longitude pair supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Degrees north, in [-90, 90].
    pub latitude: f64,

    /// Degrees east, in [-180, 180].
    pub longitude: f64,
}

/// A coordinate outside the valid latitude/longitude ranges.
#[derive(Debug, Error)]
#[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validate and construct a coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }
}

/// The requested time window around "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Days of history to cover (0 = none).
    pub past_days: u32,

    /// Days of forecast to cover, always at least 1.
    pub forecast_days: u32,
}

impl TimeWindow {
    /// Build a window, clamping `forecast_days` to at least 1.
    pub fn new(past_days: u32, forecast_days: u32) -> Self {
        Self {
            past_days,
            forecast_days: forecast_days.max(1),
        }
    }

    /// Derive the window that covers a single day offset from today
    /// (negative = past, 0 = today, positive = future).
    pub fn from_day_offset(day_offset: i32) -> Self {
        let past_days = if day_offset < 0 {
            day_offset.unsigned_abs()
        } else {
            0
        };
        let forecast_days = if day_offset > 0 {
            day_offset as u32 + 1
        } else {
            1
        };
        Self {
            past_days,
            forecast_days,
        }
    }
}

/// Classified weather from the closed WMO code set (0-99).
///
/// Codes outside the recognized set fail closed to [`WeatherKind::Unknown`],
/// which carries no description: upstreams may introduce codes that are not
/// mapped yet, and that must never take the pipeline down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    SnowGrains,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormWithHail,
    Unknown,
}

impl WeatherKind {
    /// Classify a WMO weather code.
    /// See: <https://open-meteo.com/en/docs#weathervariables>
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 => Self::Snow,
            77 => Self::SnowGrains,
            80..=82 => Self::RainShowers,
            85 | 86 => Self::SnowShowers,
            95 => Self::Thunderstorm,
            96 | 99 => Self::ThunderstormWithHail,
            _ => Self::Unknown,
        }
    }

    /// Human-readable description, or `None` for unrecognized codes.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::Clear => Some("Clear sky"),
            Self::MainlyClear => Some("Mainly clear"),
            Self::PartlyCloudy => Some("Partly cloudy"),
            Self::Overcast => Some("Overcast"),
            Self::Fog => Some("Fog"),
            Self::Drizzle => Some("Drizzle"),
            Self::FreezingDrizzle => Some("Freezing drizzle"),
            Self::Rain => Some("Rain"),
            Self::FreezingRain => Some("Freezing rain"),
            Self::Snow => Some("Snow"),
            Self::SnowGrains => Some("Snow grains"),
            Self::RainShowers => Some("Rain showers"),
            Self::SnowShowers => Some("Snow showers"),
            Self::Thunderstorm => Some("Thunderstorm"),
            Self::ThunderstormWithHail => Some("Thunderstorm with hail"),
            Self::Unknown => None,
        }
    }

    /// Icon identifier for display layers; unrecognized codes share a
    /// generic default.
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear | Self::MainlyClear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Overcast | Self::Unknown => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle | Self::FreezingDrizzle | Self::Rain | Self::RainShowers => "cloud_rain",
            Self::FreezingRain | Self::Snow | Self::SnowGrains | Self::SnowShowers => "cloud_snow",
            Self::Thunderstorm | Self::ThunderstormWithHail => "cloud_lightning",
        }
    }
}

/// Air-quality snapshot overlaid onto the current conditions.
///
/// Defaults to an all-zero block when the air-quality upstream fails, so
/// downstream consumers never have to branch on its presence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AirQuality {
    /// Particulate matter up to 10 micrometers, in micrograms per cubic meter.
    #[serde(default)]
    pub pm10: f64,

    /// Fine particulate matter up to 2.5 micrometers.
    #[serde(default)]
    pub pm2_5: f64,

    /// European air quality index value.
    #[serde(default)]
    pub european_aqi: f64,
}

/// Single-instant snapshot of conditions at the queried location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// ISO-8601 timestamp of the observation.
    pub time: String,

    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub apparent_temperature: f64,
    pub precipitation: f64,

    /// WMO weather code (0-99).
    pub weathercode: u8,

    pub cloud_cover: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub wind_gusts_10m: f64,

    /// Overlaid from the air-quality upstream; zeroed when unavailable.
    #[serde(default)]
    pub air_quality: AirQuality,

    /// Overlaid from the UV upstream only when it reported data. `None`
    /// means "no data"; zero UV is a valid observation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
}

/// Hourly time series from the forecast upstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlySeries {
    /// Shared hourly time axis (ISO-8601 timestamps).
    pub time: Vec<String>,

    pub temperature_2m: Vec<f64>,
    pub relative_humidity_2m: Vec<f64>,
    pub precipitation: Vec<f64>,
    pub precipitation_probability: Vec<f64>,
    pub weathercode: Vec<u8>,
    pub wind_speed_10m: Vec<f64>,
}

impl HourlySeries {
    /// Whether every value array shares the time axis length.
    pub fn is_aligned(&self) -> bool {
        let len = self.time.len();
        self.temperature_2m.len() == len
            && self.relative_humidity_2m.len() == len
            && self.precipitation.len() == len
            && self.precipitation_probability.len() == len
            && self.weathercode.len() == len
            && self.wind_speed_10m.len() == len
    }
}

/// Daily time series from the forecast upstream, including per-day extrema
/// and sun times.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySeries {
    /// Shared daily time axis (ISO dates, `YYYY-MM-DD`).
    pub time: Vec<String>,

    pub weathercode: Vec<u8>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub precipitation_sum: Vec<f64>,
    pub precipitation_probability_max: Vec<f64>,
    pub wind_speed_10m_max: Vec<f64>,
    pub wind_direction_10m_dominant: Vec<f64>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
}

impl DailySeries {
    /// Whether every value array shares the time axis length.
    pub fn is_aligned(&self) -> bool {
        let len = self.time.len();
        self.weathercode.len() == len
            && self.temperature_2m_max.len() == len
            && self.temperature_2m_min.len() == len
            && self.precipitation_sum.len() == len
            && self.precipitation_probability_max.len() == len
            && self.wind_speed_10m_max.len() == len
            && self.wind_direction_10m_dominant.len() == len
            && self.sunrise.len() == len
            && self.sunset.len() == len
    }
}

/// Daily series from the historical re-forecast upstream.
///
/// Distinguished from [`DailySeries`] by carrying mean/max/min aggregates
/// instead of point samples, and no probability fields (the upstream does
/// not provide them for past days).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoricalDaily {
    /// Shared daily time axis (ISO dates, `YYYY-MM-DD`).
    pub time: Vec<String>,

    pub weathercode: Vec<u8>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub precipitation_sum: Vec<f64>,
    pub relative_humidity_2m_max: Vec<f64>,
    pub relative_humidity_2m_min: Vec<f64>,
    pub relative_humidity_2m_mean: Vec<f64>,
    pub wind_speed_10m_mean: Vec<f64>,
    pub wind_direction_10m_dominant: Vec<f64>,
}

/// Hourly series from the historical re-forecast upstream. Coverage for
/// some fields may be sparse, so day summaries read the daily aggregates
/// instead of scanning these.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoricalHourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub precipitation: Vec<f64>,
    pub weathercode: Vec<u8>,
}

/// Past-days data from the historical upstream, present iff the window
/// requested history and that adapter succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBlock {
    pub daily: HistoricalDaily,
    pub hourly: HistoricalHourly,
}

/// The aggregate root: one merged, unit-agnostic weather record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub daily: DailySeries,

    /// Present iff `past_days > 0` and the historical adapter succeeded.
    /// Consumers branch on its presence; its absence is never an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical: Option<HistoricalBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(40.71, -74.0).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(90.01, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_window_from_negative_offset() {
        let window = TimeWindow::from_day_offset(-3);
        assert_eq!(window.past_days, 3);
        assert_eq!(window.forecast_days, 1);
    }

    #[test]
    fn test_window_from_zero_offset() {
        let window = TimeWindow::from_day_offset(0);
        assert_eq!(window.past_days, 0);
        assert_eq!(window.forecast_days, 1);
    }

    #[test]
    fn test_window_from_positive_offset() {
        let window = TimeWindow::from_day_offset(2);
        assert_eq!(window.past_days, 0);
        assert_eq!(window.forecast_days, 3);
    }

    #[test]
    fn test_window_forecast_days_floor() {
        assert_eq!(TimeWindow::new(5, 0).forecast_days, 1);
    }

    #[test]
    fn test_weather_kind_known_codes() {
        assert_eq!(WeatherKind::from_code(0), WeatherKind::Clear);
        assert_eq!(WeatherKind::from_code(1), WeatherKind::MainlyClear);
        assert_eq!(WeatherKind::from_code(45), WeatherKind::Fog);
        assert_eq!(WeatherKind::from_code(66), WeatherKind::FreezingRain);
        assert_eq!(WeatherKind::from_code(81), WeatherKind::RainShowers);
        assert_eq!(WeatherKind::from_code(99), WeatherKind::ThunderstormWithHail);
    }

    #[test]
    fn test_weather_kind_fails_closed() {
        let unknown = WeatherKind::from_code(42);
        assert_eq!(unknown, WeatherKind::Unknown);
        assert_eq!(unknown.description(), None);
        assert_eq!(unknown.icon_name(), "cloud");
    }

    #[test]
    fn test_series_alignment() {
        let mut hourly = HourlySeries {
            time: vec!["2024-06-01T00:00".to_string()],
            temperature_2m: vec![20.0],
            relative_humidity_2m: vec![50.0],
            precipitation: vec![0.0],
            precipitation_probability: vec![10.0],
            weathercode: vec![1],
            wind_speed_10m: vec![5.0],
        };
        assert!(hourly.is_aligned());

        hourly.temperature_2m.push(21.0);
        assert!(!hourly.is_aligned());
    }
}
