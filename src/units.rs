//! Unit conversion for the measurement families surfaced by the dashboard.
//!
//! Every family converts through one canonical base unit (Celsius, meters
//! per second, percent, millimeters): `from -> base -> to`. Converting a
//! unit to itself returns the value untouched, and conversions are
//! invertible within floating-point tolerance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by unit conversions.
#[derive(Debug, Error)]
pub enum UnitError {
    /// Non-numeric input to a conversion. Primary values must not swallow
    /// this; display layers may catch it and render "N/A".
    #[error("invalid numeric value for unit conversion: {0}")]
    InvalidValue(f64),
}

fn ensure_numeric(value: f64) -> Result<f64, UnitError> {
    if value.is_nan() {
        Err(UnitError::InvalidValue(value))
    } else {
        Ok(value)
    }
}

/// Temperature scales, converting through Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            TemperatureUnit::Kelvin => value - 273.15,
        }
    }

    fn from_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => value * 9.0 / 5.0 + 32.0,
            TemperatureUnit::Kelvin => value + 273.15,
        }
    }
}

/// Wind speed units, converting through meters per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WindSpeedUnit {
    #[serde(rename = "ms")]
    MetersPerSecond,
    #[serde(rename = "kts")]
    Knots,
    #[serde(rename = "mph")]
    MilesPerHour,
    #[default]
    #[serde(rename = "kmh")]
    KilometersPerHour,
    #[serde(rename = "fts")]
    FeetPerSecond,
}

impl WindSpeedUnit {
    /// Meters per second represented by one of this unit.
    fn meters_per_second(self) -> f64 {
        match self {
            WindSpeedUnit::MetersPerSecond => 1.0,
            WindSpeedUnit::Knots => 1852.0 / 3600.0,
            WindSpeedUnit::MilesPerHour => 0.44704,
            WindSpeedUnit::KilometersPerHour => 1.0 / 3.6,
            WindSpeedUnit::FeetPerSecond => 0.3048,
        }
    }
}

/// Humidity representations, converting through percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HumidityUnit {
    #[default]
    Percent,
    Decimal,
}

/// Precipitation depth units, converting through millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrecipitationUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
    #[serde(rename = "cm")]
    Centimeters,
}

impl PrecipitationUnit {
    fn millimeters(self) -> f64 {
        match self {
            PrecipitationUnit::Millimeters => 1.0,
            PrecipitationUnit::Inches => 25.4,
            PrecipitationUnit::Centimeters => 10.0,
        }
    }
}

/// Convert a temperature between scales.
pub fn convert_temperature(
    value: f64,
    from: TemperatureUnit,
    to: TemperatureUnit,
) -> Result<f64, UnitError> {
    let value = ensure_numeric(value)?;
    if from == to {
        return Ok(value);
    }
    Ok(to.from_celsius(from.to_celsius(value)))
}

/// Convert a wind speed between units.
pub fn convert_wind_speed(
    value: f64,
    from: WindSpeedUnit,
    to: WindSpeedUnit,
) -> Result<f64, UnitError> {
    let value = ensure_numeric(value)?;
    if from == to {
        return Ok(value);
    }
    Ok(value * from.meters_per_second() / to.meters_per_second())
}

/// Convert a relative humidity between representations.
pub fn convert_humidity(
    value: f64,
    from: HumidityUnit,
    to: HumidityUnit,
) -> Result<f64, UnitError> {
    let value = ensure_numeric(value)?;
    if from == to {
        return Ok(value);
    }
    let percent = match from {
        HumidityUnit::Percent => value,
        HumidityUnit::Decimal => value * 100.0,
    };
    Ok(match to {
        HumidityUnit::Percent => percent,
        HumidityUnit::Decimal => percent / 100.0,
    })
}

/// Convert a precipitation depth between units.
pub fn convert_precipitation(
    value: f64,
    from: PrecipitationUnit,
    to: PrecipitationUnit,
) -> Result<f64, UnitError> {
    let value = ensure_numeric(value)?;
    if from == to {
        return Ok(value);
    }
    Ok(value * from.millimeters() / to.millimeters())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPERATURE_UNITS: [TemperatureUnit; 3] = [
        TemperatureUnit::Celsius,
        TemperatureUnit::Fahrenheit,
        TemperatureUnit::Kelvin,
    ];

    const WIND_UNITS: [WindSpeedUnit; 5] = [
        WindSpeedUnit::MetersPerSecond,
        WindSpeedUnit::Knots,
        WindSpeedUnit::MilesPerHour,
        WindSpeedUnit::KilometersPerHour,
        WindSpeedUnit::FeetPerSecond,
    ];

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-9 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_temperature_known_values() {
        assert_close(
            convert_temperature(0.0, TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit)
                .unwrap(),
            32.0,
        );
        assert_close(
            convert_temperature(100.0, TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit)
                .unwrap(),
            212.0,
        );
        assert_close(
            convert_temperature(0.0, TemperatureUnit::Celsius, TemperatureUnit::Kelvin).unwrap(),
            273.15,
        );
        assert_close(
            convert_temperature(-40.0, TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit)
                .unwrap(),
            -40.0,
        );
    }

    #[test]
    fn test_wind_speed_known_values() {
        assert_close(
            convert_wind_speed(
                1.0,
                WindSpeedUnit::MetersPerSecond,
                WindSpeedUnit::KilometersPerHour,
            )
            .unwrap(),
            3.6,
        );
        assert_close(
            convert_wind_speed(1.0, WindSpeedUnit::Knots, WindSpeedUnit::MetersPerSecond)
                .unwrap(),
            1852.0 / 3600.0,
        );
        assert_close(
            convert_wind_speed(
                60.0,
                WindSpeedUnit::MilesPerHour,
                WindSpeedUnit::FeetPerSecond,
            )
            .unwrap(),
            88.0,
        );
    }

    #[test]
    fn test_humidity_conversion() {
        assert_close(
            convert_humidity(45.0, HumidityUnit::Percent, HumidityUnit::Decimal).unwrap(),
            0.45,
        );
        assert_close(
            convert_humidity(0.45, HumidityUnit::Decimal, HumidityUnit::Percent).unwrap(),
            45.0,
        );
    }

    #[test]
    fn test_precipitation_conversion() {
        assert_close(
            convert_precipitation(25.4, PrecipitationUnit::Millimeters, PrecipitationUnit::Inches)
                .unwrap(),
            1.0,
        );
        assert_close(
            convert_precipitation(2.0, PrecipitationUnit::Centimeters, PrecipitationUnit::Millimeters)
                .unwrap(),
            20.0,
        );
    }

    #[test]
    fn test_identity_is_exact() {
        for unit in TEMPERATURE_UNITS {
            assert_eq!(convert_temperature(21.37, unit, unit).unwrap(), 21.37);
        }
        for unit in WIND_UNITS {
            assert_eq!(convert_wind_speed(12.5, unit, unit).unwrap(), 12.5);
        }
    }

    #[test]
    fn test_temperature_round_trip() {
        for from in TEMPERATURE_UNITS {
            for to in TEMPERATURE_UNITS {
                let mut value = -50.0;
                while value <= 50.0 {
                    let there = convert_temperature(value, from, to).unwrap();
                    let back = convert_temperature(there, to, from).unwrap();
                    assert_close(back, value);
                    value += 7.3;
                }
            }
        }
    }

    #[test]
    fn test_wind_speed_round_trip() {
        for from in WIND_UNITS {
            for to in WIND_UNITS {
                let there = convert_wind_speed(27.8, from, to).unwrap();
                let back = convert_wind_speed(there, to, from).unwrap();
                assert_close(back, 27.8);
            }
        }
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(matches!(
            convert_temperature(f64::NAN, TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit),
            Err(UnitError::InvalidValue(_))
        ));
        assert!(matches!(
            convert_wind_speed(f64::NAN, WindSpeedUnit::Knots, WindSpeedUnit::Knots),
            Err(UnitError::InvalidValue(_))
        ));
        assert!(matches!(
            convert_humidity(f64::NAN, HumidityUnit::Percent, HumidityUnit::Decimal),
            Err(UnitError::InvalidValue(_))
        ));
        assert!(matches!(
            convert_precipitation(f64::NAN, PrecipitationUnit::Millimeters, PrecipitationUnit::Inches),
            Err(UnitError::InvalidValue(_))
        ));
    }
}
