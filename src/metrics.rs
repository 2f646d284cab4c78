//! Derived weather metrics computed from normalized observations.
//!
//! The apparent ("feels like") temperature uses the NWS empirical
//! regressions, which are defined over Fahrenheit and miles per hour; inputs
//! are converted to that basis, the applicable formula applied, and the
//! result converted back to the caller's temperature unit.

use crate::units::{
    TemperatureUnit, UnitError, WindSpeedUnit, convert_temperature, convert_wind_speed,
};

/// Heat index kicks in strictly above this Fahrenheit temperature.
const HEAT_INDEX_THRESHOLD_F: f64 = 80.0;

/// Wind chill applies at or below this Fahrenheit temperature.
const WIND_CHILL_THRESHOLD_F: f64 = 50.0;

/// Wind chill requires wind strictly above this speed in mph.
const WIND_CHILL_MIN_WIND_MPH: f64 = 3.0;

/// Compute the apparent temperature from temperature, relative humidity and
/// wind speed, in the unit the temperature was supplied in.
///
/// Exactly one of three regimes applies:
/// - above 80 °F: Rothfusz heat index over (temperature, humidity)
/// - at or below 50 °F with wind above 3 mph: NWS wind chill over
///   (temperature, wind)
/// - otherwise the actual temperature is returned unchanged
///
/// The boundary values themselves (80 °F exactly, 3 mph exactly) fall into
/// the unchanged regime.
pub fn feels_like(
    temperature: f64,
    temperature_unit: TemperatureUnit,
    humidity_percent: f64,
    wind_speed: f64,
    wind_unit: WindSpeedUnit,
) -> Result<f64, UnitError> {
    if humidity_percent.is_nan() {
        return Err(UnitError::InvalidValue(humidity_percent));
    }

    let temp_f = convert_temperature(temperature, temperature_unit, TemperatureUnit::Fahrenheit)?;
    let wind_mph = convert_wind_speed(wind_speed, wind_unit, WindSpeedUnit::MilesPerHour)?;

    let apparent_f = if temp_f > HEAT_INDEX_THRESHOLD_F {
        heat_index(temp_f, humidity_percent)
    } else if temp_f <= WIND_CHILL_THRESHOLD_F && wind_mph > WIND_CHILL_MIN_WIND_MPH {
        wind_chill(temp_f, wind_mph)
    } else {
        temp_f
    };

    convert_temperature(apparent_f, TemperatureUnit::Fahrenheit, temperature_unit)
}

/// Rothfusz heat index regression (°F, relative humidity in percent).
fn heat_index(temp_f: f64, humidity: f64) -> f64 {
    -42.379 + 2.04901523 * temp_f + 10.14333127 * humidity
        - 0.22475541 * temp_f * humidity
        - 0.00683783 * temp_f * temp_f
        - 0.05481717 * humidity * humidity
        + 0.00122874 * temp_f * temp_f * humidity
        + 0.00085282 * temp_f * humidity * humidity
        - 0.00000199 * temp_f * temp_f * humidity * humidity
}

/// NWS wind chill formula (°F, mph).
fn wind_chill(temp_f: f64, wind_mph: f64) -> f64 {
    let wind_pow = wind_mph.powf(0.16);
    35.74 + 0.6215 * temp_f - 35.75 * wind_pow + 0.4275 * temp_f * wind_pow
}

/// Coarse linear rescaling from the European AQI band scale (0-100 across
/// the defined bands) to the US AQI scale (0-500).
pub fn european_to_us_aqi(european: f64) -> f64 {
    european * 5.0
}

/// Inverse of [`european_to_us_aqi`].
pub fn us_to_european_aqi(us: f64) -> f64 {
    us / 5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_index_applies_above_eighty() {
        // 90 F at 70% humidity is a textbook heat index of ~105.9 F
        let apparent = feels_like(
            90.0,
            TemperatureUnit::Fahrenheit,
            70.0,
            0.0,
            WindSpeedUnit::MilesPerHour,
        )
        .unwrap();
        assert!((apparent - 105.9).abs() < 0.5, "got {apparent}");
    }

    #[test]
    fn test_wind_chill_applies_below_fifty() {
        // 30 F with 20 mph wind is a textbook wind chill of ~17.4 F
        let apparent = feels_like(
            30.0,
            TemperatureUnit::Fahrenheit,
            50.0,
            20.0,
            WindSpeedUnit::MilesPerHour,
        )
        .unwrap();
        assert!((apparent - 17.4).abs() < 0.5, "got {apparent}");
    }

    #[test]
    fn test_exactly_eighty_is_unchanged() {
        let apparent = feels_like(
            80.0,
            TemperatureUnit::Fahrenheit,
            90.0,
            0.0,
            WindSpeedUnit::MilesPerHour,
        )
        .unwrap();
        assert_eq!(apparent, 80.0);
    }

    #[test]
    fn test_just_above_eighty_applies_heat_index() {
        let apparent = feels_like(
            80.01,
            TemperatureUnit::Fahrenheit,
            90.0,
            0.0,
            WindSpeedUnit::MilesPerHour,
        )
        .unwrap();
        assert_ne!(apparent, 80.01);
    }

    #[test]
    fn test_wind_at_three_mph_is_unchanged() {
        let apparent = feels_like(
            50.0,
            TemperatureUnit::Fahrenheit,
            50.0,
            3.0,
            WindSpeedUnit::MilesPerHour,
        )
        .unwrap();
        assert_eq!(apparent, 50.0);
    }

    #[test]
    fn test_wind_just_above_three_mph_applies_wind_chill() {
        let apparent = feels_like(
            50.0,
            TemperatureUnit::Fahrenheit,
            50.0,
            3.01,
            WindSpeedUnit::MilesPerHour,
        )
        .unwrap();
        assert_ne!(apparent, 50.0);
    }

    #[test]
    fn test_mild_conditions_are_unchanged() {
        let apparent = feels_like(
            20.0,
            TemperatureUnit::Celsius,
            55.0,
            10.0,
            WindSpeedUnit::KilometersPerHour,
        )
        .unwrap();
        assert_eq!(apparent, 20.0);
    }

    #[test]
    fn test_result_is_in_the_input_unit() {
        // 35 C / 70% humidity: heat index territory, result still in Celsius
        let apparent = feels_like(
            35.0,
            TemperatureUnit::Celsius,
            70.0,
            5.0,
            WindSpeedUnit::KilometersPerHour,
        )
        .unwrap();
        assert!(apparent > 35.0 && apparent < 60.0, "got {apparent}");
    }

    #[test]
    fn test_nan_humidity_is_rejected() {
        assert!(matches!(
            feels_like(
                90.0,
                TemperatureUnit::Fahrenheit,
                f64::NAN,
                0.0,
                WindSpeedUnit::MilesPerHour
            ),
            Err(UnitError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_aqi_rescaling_round_trip() {
        let us = european_to_us_aqi(18.0);
        assert_eq!(us, 90.0);
        assert_eq!(us_to_european_aqi(us), 18.0);
    }
}
