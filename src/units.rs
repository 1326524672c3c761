//! Unit Conversion
//!
//! Pure numeric conversions between the canonical unit system (°C, %, m/s, mm)
//! and the presentation units a user may pick. Absence propagates: every
//! `Option` helper maps `None` to `None`.
//!
//! Rounding helpers are for presentation only. Threshold comparison always
//! runs on unrounded canonical values.

use crate::factor::Factor;
use serde::{Deserialize, Serialize};

/// Metres per second to miles per hour
pub const MPS_TO_MPH: f64 = 2.2369362920544;

/// Kilometres per hour to metres per second
pub const KMH_TO_MPS: f64 = 1.0 / 3.6;

pub const MM_PER_INCH: f64 = 25.4;

/// Default significant digits for presented values
pub const DEFAULT_SIG_DIGITS: u32 = 4;

// ============================================================================
// Scalar conversions
// ============================================================================

pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn mps_to_mph(mps: f64) -> f64 {
    mps * MPS_TO_MPH
}

pub fn mph_to_mps(mph: f64) -> f64 {
    mph / MPS_TO_MPH
}

pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh * KMH_TO_MPS
}

pub fn mm_to_in(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

pub fn in_to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

/// Round to `digits` significant digits (minimum 1)
///
/// Zero and non-finite values are returned unchanged.
pub fn round_sig(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let digits = digits.max(1) as i32;
    let magnitude = value.abs().log10().floor() as i32;
    let exponent = digits - 1 - magnitude;
    // Negative powers of ten are inexact, so scale down by division instead
    if exponent >= 0 {
        let scale = 10f64.powi(exponent);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-exponent);
        (value / scale).round() * scale
    }
}

/// Round to a fixed number of decimal places
pub fn round_decimals(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

// ============================================================================
// Presentation units
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "C" | "c" | "°C" => Some(TemperatureUnit::Celsius),
            "F" | "f" | "°F" => Some(TemperatureUnit::Fahrenheit),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindUnit {
    #[default]
    #[serde(rename = "m/s")]
    MetersPerSecond,
    #[serde(rename = "mph")]
    MilesPerHour,
}

impl WindUnit {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "m/s" | "ms" => Some(WindUnit::MetersPerSecond),
            "mph" => Some(WindUnit::MilesPerHour),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            WindUnit::MetersPerSecond => "m/s",
            WindUnit::MilesPerHour => "mph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrecipUnit {
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    #[serde(rename = "in")]
    Inches,
}

impl PrecipUnit {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "mm" => Some(PrecipUnit::Millimeters),
            "in" | "inch" => Some(PrecipUnit::Inches),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            PrecipUnit::Millimeters => "mm",
            PrecipUnit::Inches => "in",
        }
    }
}

/// Units the user reads (and writes thresholds) in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayUnits {
    #[serde(default)]
    pub temperature: TemperatureUnit,
    #[serde(default)]
    pub wind: WindUnit,
    #[serde(default)]
    pub precip_amount: PrecipUnit,
}

impl DisplayUnits {
    /// Unit label for a factor, e.g. "F" or "%"
    pub fn code(&self, factor: Factor) -> &'static str {
        match factor {
            Factor::Temperature => self.temperature.code(),
            Factor::Wind => self.wind.code(),
            Factor::PrecipAmount => self.precip_amount.code(),
            Factor::Humidity | Factor::PrecipProbability => "%",
        }
    }

    /// Canonical value → presentation value
    pub fn to_display(&self, factor: Factor, canonical: f64) -> f64 {
        match factor {
            Factor::Temperature => match self.temperature {
                TemperatureUnit::Celsius => canonical,
                TemperatureUnit::Fahrenheit => c_to_f(canonical),
            },
            Factor::Wind => match self.wind {
                WindUnit::MetersPerSecond => canonical,
                WindUnit::MilesPerHour => mps_to_mph(canonical),
            },
            Factor::PrecipAmount => match self.precip_amount {
                PrecipUnit::Millimeters => canonical,
                PrecipUnit::Inches => mm_to_in(canonical),
            },
            Factor::Humidity | Factor::PrecipProbability => canonical,
        }
    }

    /// Presentation value → canonical value
    pub fn to_canonical(&self, factor: Factor, display: f64) -> f64 {
        match factor {
            Factor::Temperature => match self.temperature {
                TemperatureUnit::Celsius => display,
                TemperatureUnit::Fahrenheit => f_to_c(display),
            },
            Factor::Wind => match self.wind {
                WindUnit::MetersPerSecond => display,
                WindUnit::MilesPerHour => mph_to_mps(display),
            },
            Factor::PrecipAmount => match self.precip_amount {
                PrecipUnit::Millimeters => display,
                PrecipUnit::Inches => in_to_mm(display),
            },
            Factor::Humidity | Factor::PrecipProbability => display,
        }
    }

    pub fn to_display_opt(&self, factor: Factor, canonical: Option<f64>) -> Option<f64> {
        canonical.map(|v| self.to_display(factor, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_temperature_round_trip_points() {
        assert_relative_eq!(c_to_f(0.0), 32.0);
        assert_relative_eq!(c_to_f(100.0), 212.0);
        assert_relative_eq!(c_to_f(-40.0), -40.0);
        assert_relative_eq!(f_to_c(212.0), 100.0);
    }

    #[test]
    fn test_wind_and_precip_factors() {
        assert_relative_eq!(mps_to_mph(10.0), 22.369362920544, epsilon = 1e-9);
        assert_relative_eq!(mph_to_mps(mps_to_mph(7.5)), 7.5, epsilon = 1e-12);
        assert_relative_eq!(kmh_to_mps(36.0), 10.0, epsilon = 1e-12);
        assert_relative_eq!(mm_to_in(25.4), 1.0);
        assert_relative_eq!(in_to_mm(0.5), 12.7);
    }

    #[test]
    fn test_round_sig() {
        assert_eq!(round_sig(123.456, 4), 123.5);
        assert_eq!(round_sig(0.00123456, 2), 0.0012);
        assert_eq!(round_sig(-98765.0, 2), -99000.0);
        assert_eq!(round_sig(0.0, 4), 0.0);
        assert!(round_sig(f64::NAN, 4).is_nan());
    }

    #[test]
    fn test_round_decimals() {
        assert_eq!(round_decimals(18.456, 2), 18.46);
        assert_eq!(round_decimals(-0.125, 1), -0.1);
    }

    #[test]
    fn test_display_units_only_touch_convertible_factors() {
        let units = DisplayUnits {
            temperature: TemperatureUnit::Fahrenheit,
            wind: WindUnit::MilesPerHour,
            precip_amount: PrecipUnit::Inches,
        };
        assert_relative_eq!(units.to_display(Factor::Temperature, 20.0), 68.0);
        assert_relative_eq!(units.to_display(Factor::Humidity, 55.0), 55.0);
        assert_relative_eq!(units.to_canonical(Factor::PrecipAmount, 1.0), 25.4);
        assert_eq!(units.code(Factor::Wind), "mph");
        assert_eq!(units.code(Factor::PrecipProbability), "%");
        assert_eq!(units.to_display_opt(Factor::Wind, None), None);
    }

    #[test]
    fn test_unit_codes() {
        assert_eq!(TemperatureUnit::from_code("F"), Some(TemperatureUnit::Fahrenheit));
        assert_eq!(WindUnit::from_code("knots"), None);
        assert_eq!(PrecipUnit::from_code("in"), Some(PrecipUnit::Inches));
    }
}
