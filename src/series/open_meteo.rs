//! Open-Meteo Payload Adapter
//!
//! Converts an already-fetched Open-Meteo `/v1/forecast` (or archive) JSON
//! payload into an [`HourlySeries`] in canonical units. Fetching is the host's
//! job; this module only reads the payload.
//!
//! Open-Meteo reports units per column in `hourly_units`. When a column has no
//! unit entry the API default is assumed (°C, km/h, mm, %).

use super::HourlySeries;
use crate::factor::Factor;
use crate::units::{f_to_c, in_to_mm, kmh_to_mps, mph_to_mps};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

const KNOTS_TO_MPS: f64 = 0.514444;

/// Hourly variables requested from Open-Meteo, by factor
pub fn variable_for(factor: Factor) -> &'static str {
    match factor {
        Factor::Temperature => "temperature_2m",
        Factor::Humidity => "relative_humidity_2m",
        Factor::Wind => "wind_speed_10m",
        Factor::PrecipProbability => "precipitation_probability",
        Factor::PrecipAmount => "precipitation",
    }
}

/// Top-level Open-Meteo response (only the fields the evaluator reads)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenMeteoResponse {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Resolved IANA zone when requested with `timezone=auto`
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub hourly_units: BTreeMap<String, String>,
    #[serde(default)]
    pub hourly: OpenMeteoHourly,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenMeteoHourly {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
}

impl OpenMeteoHourly {
    fn column(&self, factor: Factor) -> &[Option<f64>] {
        match factor {
            Factor::Temperature => &self.temperature_2m,
            Factor::Humidity => &self.relative_humidity_2m,
            Factor::Wind => &self.wind_speed_10m,
            Factor::PrecipProbability => &self.precipitation_probability,
            Factor::PrecipAmount => &self.precipitation,
        }
    }
}

/// Converter from an Open-Meteo unit label to the canonical unit
fn canonical_converter(factor: Factor, unit: Option<&str>) -> Result<fn(f64) -> f64> {
    fn identity(v: f64) -> f64 {
        v
    }
    fn knots(v: f64) -> f64 {
        v * KNOTS_TO_MPS
    }

    let converter: Option<fn(f64) -> f64> = match (factor, unit) {
        (Factor::Temperature, None | Some("°C")) => Some(identity),
        (Factor::Temperature, Some("°F")) => Some(f_to_c),
        (Factor::Wind, None | Some("km/h")) => Some(kmh_to_mps),
        (Factor::Wind, Some("m/s")) => Some(identity),
        (Factor::Wind, Some("mp/h" | "mph")) => Some(mph_to_mps),
        (Factor::Wind, Some("kn")) => Some(knots),
        (Factor::PrecipAmount, None | Some("mm")) => Some(identity),
        (Factor::PrecipAmount, Some("inch")) => Some(in_to_mm),
        (Factor::Humidity | Factor::PrecipProbability, None | Some("%")) => Some(identity),
        _ => None,
    };

    converter.with_context(|| {
        format!(
            "Unsupported Open-Meteo unit '{}' for {}",
            unit.unwrap_or(""),
            variable_for(factor)
        )
    })
}

impl OpenMeteoResponse {
    /// Parse a raw payload string
    pub fn from_json(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).context("Failed to parse Open-Meteo payload")
    }

    /// Response timezone, UTC when the payload carries none
    pub fn timezone(&self) -> &str {
        self.timezone.as_deref().unwrap_or("UTC")
    }

    /// Canonical-unit series for the evaluator
    pub fn to_series(&self) -> Result<HourlySeries> {
        let mut series = HourlySeries {
            time: self.hourly.time.clone(),
            ..Default::default()
        };

        for factor in Factor::ALL {
            let variable = variable_for(factor);
            let unit = self.hourly_units.get(variable).map(String::as_str);
            let convert = canonical_converter(factor, unit)?;
            *series.column_mut(factor) = self
                .hourly
                .column(factor)
                .iter()
                .map(|v| v.map(convert))
                .collect();
        }

        tracing::debug!(
            hours = series.len(),
            timezone = self.timezone(),
            "converted Open-Meteo payload"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PAYLOAD: &str = r#"{
        "latitude": 52.52,
        "longitude": 13.41,
        "timezone": "Europe/Berlin",
        "hourly_units": {
            "time": "iso8601",
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "wind_speed_10m": "km/h",
            "precipitation_probability": "%",
            "precipitation": "mm"
        },
        "hourly": {
            "time": ["2024-06-01T00:00", "2024-06-01T01:00"],
            "temperature_2m": [14.2, null],
            "relative_humidity_2m": [81, 84],
            "wind_speed_10m": [18.0, 7.2],
            "precipitation_probability": [10, 35],
            "precipitation": [0.0, 0.4]
        }
    }"#;

    #[test]
    fn test_payload_converts_to_canonical() {
        let response = OpenMeteoResponse::from_json(PAYLOAD).unwrap();
        assert_eq!(response.timezone(), "Europe/Berlin");

        let series = response.to_series().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.value(Factor::Temperature, 0), Some(14.2));
        assert_eq!(series.value(Factor::Temperature, 1), None);
        assert_relative_eq!(series.value(Factor::Wind, 0).unwrap(), 5.0, epsilon = 1e-9);
        assert_relative_eq!(series.value(Factor::Wind, 1).unwrap(), 2.0, epsilon = 1e-9);
        assert_eq!(series.value(Factor::Humidity, 1), Some(84.0));
        assert!(series.validate("open_meteo").is_ok());
    }

    #[test]
    fn test_missing_columns_stay_empty() {
        let response = OpenMeteoResponse::from_json(
            r#"{"hourly": {"time": ["2024-06-01T00:00Z"], "temperature_2m": [60.8]},
                "hourly_units": {"temperature_2m": "°F"}}"#,
        )
        .unwrap();
        assert_eq!(response.timezone(), "UTC");

        let series = response.to_series().unwrap();
        assert_relative_eq!(series.value(Factor::Temperature, 0).unwrap(), 16.0, epsilon = 1e-9);
        assert!(series.precip_probability.is_empty());
    }

    #[test]
    fn test_unsupported_unit_is_an_error() {
        let response = OpenMeteoResponse::from_json(
            r#"{"hourly": {"time": []}, "hourly_units": {"wind_speed_10m": "furlong/fortnight"}}"#,
        )
        .unwrap();
        let err = response.to_series().unwrap_err();
        assert!(err.to_string().contains("furlong/fortnight"));
    }

    #[test]
    fn test_malformed_payload() {
        assert!(OpenMeteoResponse::from_json("{not json").is_err());
    }
}
