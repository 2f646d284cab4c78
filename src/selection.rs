//! Day and range selection over an aggregated weather record.
//!
//! Everything here is a pure function of `(record, day_offset, today)`.
//! "Today" is an explicit input so callers at the outermost boundary decide
//! the clock and tests stay deterministic. Missing data never panics: a day
//! outside the covered window, an unmatched historical date, or a `NaN`
//! sample all resolve to "not available" fields.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::model::{HistoricalBlock, HourlySeries, WeatherKind, WeatherRecord};

/// Hourly series carry this many samples per day.
pub const HOURS_PER_DAY: usize = 24;

/// Absolute tolerance when matching a value against a day extremum.
const EXTREMUM_EPSILON: f64 = 0.01;

/// Which block of the record a summary was drawn from. A summary never
/// mixes sources: forecast serves `day_offset >= 0`, historical serves
/// `day_offset < 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Forecast,
    Historical,
}

/// Humidity over one day: extrema plus mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HumiditySummary {
    pub high: f64,
    pub low: f64,
    pub mean: f64,
}

/// One day's worth of headline values. `None` means "not available":
/// either the upstream did not cover the day or does not provide the field
/// (precipitation probability is never available for historical days).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    /// Calendar date the summary describes.
    pub date: NaiveDate,

    /// Which block served this day.
    pub origin: DataOrigin,

    /// False when the record has no data for this date.
    pub available: bool,

    pub temperature_high: Option<f64>,
    pub temperature_low: Option<f64>,
    pub precipitation_total: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub weather_code: Option<u8>,

    /// Classified weather; `Unknown` when the code is absent or unmapped.
    pub condition: WeatherKind,

    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub humidity: Option<HumiditySummary>,
}

impl DaySummary {
    fn not_available(date: NaiveDate, origin: DataOrigin) -> Self {
        Self {
            date,
            origin,
            available: false,
            temperature_high: None,
            temperature_low: None,
            precipitation_total: None,
            precipitation_probability: None,
            weather_code: None,
            condition: WeatherKind::Unknown,
            wind_speed: None,
            wind_direction: None,
            humidity: None,
        }
    }
}

/// Select one day from the record by signed offset from `today`.
///
/// Non-negative offsets index the forecast series directly; negative
/// offsets resolve `today + offset` against the historical daily time axis
/// by exact date match.
pub fn select_day(record: &WeatherRecord, day_offset: i32, today: NaiveDate) -> DaySummary {
    let date = today + Duration::days(i64::from(day_offset));

    if day_offset >= 0 {
        forecast_day(record, day_offset as usize, date)
    } else {
        historical_day(record.historical.as_ref(), date)
    }
}

/// Merge historical and forecast daily rows into one table ordered by
/// date. On dates both blocks cover (the boundary day), the forecast row
/// wins.
pub fn daily_table(record: &WeatherRecord) -> Vec<DaySummary> {
    let mut rows = std::collections::BTreeMap::new();

    if let Some(historical) = record.historical.as_ref() {
        for (index, date_str) in historical.daily.time.iter().enumerate() {
            if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                rows.insert(date, historical_day_at(historical, index, date));
            }
        }
    }

    for (index, date_str) in record.daily.time.iter().enumerate() {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            rows.insert(date, forecast_day(record, index, date));
        }
    }

    rows.into_values().collect()
}

/// Which day extremum to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    High,
    Low,
}

/// When a day extremum occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Occurrence {
    /// The current instantaneous value matches the extremum.
    Now,
    /// Timestamp of the matching hourly sample.
    At(String),
    /// No sample matches the extremum.
    Unavailable,
}

/// Locate when today's temperature extremum occurs.
///
/// If the current reading is within [`EXTREMUM_EPSILON`] of the day's
/// extremum the answer is `Now` and the hourly series is not scanned.
/// Otherwise the first hourly sample of day 0 matching the extremum wins.
pub fn extremum_occurrence(record: &WeatherRecord, extremum: Extremum) -> Occurrence {
    let target = match extremum {
        Extremum::High => record.daily.temperature_2m_max.first(),
        Extremum::Low => record.daily.temperature_2m_min.first(),
    };
    let Some(&target) = target else {
        return Occurrence::Unavailable;
    };

    if (record.current.temperature_2m - target).abs() <= EXTREMUM_EPSILON {
        return Occurrence::Now;
    }

    for (time, &value) in record
        .hourly
        .time
        .iter()
        .zip(&record.hourly.temperature_2m)
        .take(HOURS_PER_DAY)
    {
        if (value - target).abs() <= EXTREMUM_EPSILON {
            return Occurrence::At(time.clone());
        }
    }
    Occurrence::Unavailable
}

fn forecast_day(record: &WeatherRecord, index: usize, date: NaiveDate) -> DaySummary {
    let daily = &record.daily;

    let weather_code = daily.weathercode.get(index).copied();
    let temperature_high = value_at(&daily.temperature_2m_max, index);
    let temperature_low = value_at(&daily.temperature_2m_min, index);

    if weather_code.is_none() && temperature_high.is_none() {
        return DaySummary::not_available(date, DataOrigin::Forecast);
    }

    DaySummary {
        date,
        origin: DataOrigin::Forecast,
        available: true,
        temperature_high,
        temperature_low,
        precipitation_total: value_at(&daily.precipitation_sum, index),
        precipitation_probability: value_at(&daily.precipitation_probability_max, index),
        weather_code,
        condition: weather_code.map_or(WeatherKind::Unknown, WeatherKind::from_code),
        wind_speed: value_at(&daily.wind_speed_10m_max, index),
        wind_direction: value_at(&daily.wind_direction_10m_dominant, index),
        humidity: humidity_over_day(&record.hourly, index),
    }
}

fn historical_day(historical: Option<&HistoricalBlock>, date: NaiveDate) -> DaySummary {
    let Some(historical) = historical else {
        return DaySummary::not_available(date, DataOrigin::Historical);
    };

    let target = date.format("%Y-%m-%d").to_string();
    let Some(index) = historical.daily.time.iter().position(|t| *t == target) else {
        return DaySummary::not_available(date, DataOrigin::Historical);
    };

    historical_day_at(historical, index, date)
}

fn historical_day_at(historical: &HistoricalBlock, index: usize, date: NaiveDate) -> DaySummary {
    let daily = &historical.daily;

    let weather_code = daily.weathercode.get(index).copied();
    let temperature_high = value_at(&daily.temperature_2m_max, index);

    if weather_code.is_none() && temperature_high.is_none() {
        return DaySummary::not_available(date, DataOrigin::Historical);
    }

    // Historical hourly humidity coverage may be sparse, so the daily
    // aggregates are authoritative here.
    let humidity = match (
        value_at(&daily.relative_humidity_2m_max, index),
        value_at(&daily.relative_humidity_2m_min, index),
        value_at(&daily.relative_humidity_2m_mean, index),
    ) {
        (Some(high), Some(low), Some(mean)) => Some(HumiditySummary { high, low, mean }),
        _ => None,
    };

    DaySummary {
        date,
        origin: DataOrigin::Historical,
        available: true,
        temperature_high,
        temperature_low: value_at(&daily.temperature_2m_min, index),
        precipitation_total: value_at(&daily.precipitation_sum, index),
        // The historical upstream never provides probabilities.
        precipitation_probability: None,
        weather_code,
        condition: weather_code.map_or(WeatherKind::Unknown, WeatherKind::from_code),
        wind_speed: value_at(&daily.wind_speed_10m_mean, index),
        wind_direction: value_at(&daily.wind_direction_10m_dominant, index),
        humidity,
    }
}

/// Scan the 24-hour slice of a forecast day for humidity extrema and mean.
fn humidity_over_day(hourly: &HourlySeries, day_index: usize) -> Option<HumiditySummary> {
    let start = day_index.checked_mul(HOURS_PER_DAY)?;
    let end = (start + HOURS_PER_DAY).min(hourly.relative_humidity_2m.len());
    let slice = hourly.relative_humidity_2m.get(start..end)?;

    let mut high = f64::NEG_INFINITY;
    let mut low = f64::INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;
    for &value in slice {
        if value.is_nan() {
            continue;
        }
        high = high.max(value);
        low = low.min(value);
        sum += value;
        count += 1;
    }

    if count == 0 {
        return None;
    }
    Some(HumiditySummary {
        high,
        low,
        mean: sum / count as f64,
    })
}

/// Array access treating out-of-window indices and non-numeric samples as
/// "not available".
fn value_at(values: &[f64], index: usize) -> Option<f64> {
    values.get(index).copied().filter(|v| !v.is_nan())
}
