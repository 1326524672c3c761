//! Hourly Weather Series
//!
//! `HourlySeries` is the raw column layout a provider delivers: one timestamp
//! column plus one value column per factor, values in canonical units.
//! `AlignedSource` borrows a series and pairs it with parsed, timezone-aware
//! timestamps so hours can be addressed by index or by instant.
//!
//! An empty factor column means the provider did not deliver that factor;
//! every hour of it reads as missing.

pub mod open_meteo;

pub use open_meteo::OpenMeteoResponse;

use crate::error::{EvalError, EvalResult};
use crate::factor::Factor;
use crate::temporal::align;
use ahash::AHashMap;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Raw hourly series from one source (canonical units)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    /// Provider timestamps, naive local or UTC/offset-marked
    pub time: Vec<String>,

    /// Air temperature (°C)
    #[serde(default)]
    pub temperature: Vec<Option<f64>>,

    /// Relative humidity (%)
    #[serde(default)]
    pub humidity: Vec<Option<f64>>,

    /// Wind speed (m/s)
    #[serde(default)]
    pub wind: Vec<Option<f64>>,

    /// Precipitation probability (%)
    #[serde(default)]
    pub precip_probability: Vec<Option<f64>>,

    /// Precipitation depth (mm)
    #[serde(default)]
    pub precip_amount: Vec<Option<f64>>,
}

impl HourlySeries {
    pub fn column(&self, factor: Factor) -> &[Option<f64>] {
        match factor {
            Factor::Temperature => &self.temperature,
            Factor::Humidity => &self.humidity,
            Factor::Wind => &self.wind,
            Factor::PrecipProbability => &self.precip_probability,
            Factor::PrecipAmount => &self.precip_amount,
        }
    }

    pub fn column_mut(&mut self, factor: Factor) -> &mut Vec<Option<f64>> {
        match factor {
            Factor::Temperature => &mut self.temperature,
            Factor::Humidity => &mut self.humidity,
            Factor::Wind => &mut self.wind,
            Factor::PrecipProbability => &mut self.precip_probability,
            Factor::PrecipAmount => &mut self.precip_amount,
        }
    }

    /// Builder-style column setter
    pub fn with_column(mut self, factor: Factor, values: Vec<Option<f64>>) -> Self {
        *self.column_mut(factor) = values;
        self
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Value at hour `i`; absent when missing or the column was not delivered
    pub fn value(&self, factor: Factor, i: usize) -> Option<f64> {
        self.column(factor).get(i).copied().flatten()
    }

    /// Every delivered column must line up with `time`
    pub fn validate(&self, source_name: &str) -> EvalResult<()> {
        for factor in Factor::ALL {
            let actual = self.column(factor).len();
            if actual != 0 && actual != self.time.len() {
                return Err(EvalError::SeriesLengthMismatch {
                    source_name: source_name.to_string(),
                    factor: factor.key(),
                    expected: self.time.len(),
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// All factor values at one hour (canonical units)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HourValues([Option<f64>; 5]);

impl HourValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, factor: Factor, value: Option<f64>) -> Self {
        self.0[factor.index()] = value;
        self
    }

    pub fn get(&self, factor: Factor) -> Option<f64> {
        self.0[factor.index()]
    }
}

/// A source series with parsed timestamps in the target zone
#[derive(Debug, Clone)]
pub struct AlignedSource<'a> {
    name: &'a str,
    series: &'a HourlySeries,
    times: Vec<DateTime<Tz>>,
}

impl<'a> AlignedSource<'a> {
    /// Validate columns, parse timestamps, and check they strictly increase
    pub fn new(name: &'a str, series: &'a HourlySeries, tz: Tz) -> EvalResult<Self> {
        series.validate(name)?;
        let times = align(&series.time, tz)?;
        if let Some(index) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(EvalError::NonIncreasingTimestamps {
                source_name: name.to_string(),
                index: index + 1,
            });
        }
        Ok(Self { name, series, times })
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn times(&self) -> &[DateTime<Tz>] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn value(&self, factor: Factor, i: usize) -> Option<f64> {
        self.series.value(factor, i)
    }

    pub fn hour(&self, i: usize) -> HourValues {
        Factor::ALL
            .into_iter()
            .fold(HourValues::new(), |acc, f| acc.with(f, self.value(f, i)))
    }

    /// For each hour of `primary`, the index of the same instant in this source
    pub fn index_onto(&self, primary: &AlignedSource<'_>) -> Vec<Option<usize>> {
        let by_instant: AHashMap<i64, usize> = self
            .times
            .iter()
            .enumerate()
            .map(|(i, t)| (t.timestamp(), i))
            .collect();

        primary
            .times
            .iter()
            .map(|t| by_instant.get(&t.timestamp()).copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::parse_timezone;

    fn series(times: &[&str], temps: Vec<Option<f64>>) -> HourlySeries {
        HourlySeries {
            time: times.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
        .with_column(Factor::Temperature, temps)
    }

    #[test]
    fn test_missing_column_reads_as_absent() {
        let s = series(&["2024-06-01T10:00"], vec![Some(20.0)]);
        assert_eq!(s.value(Factor::Temperature, 0), Some(20.0));
        assert_eq!(s.value(Factor::Wind, 0), None);
        assert_eq!(s.value(Factor::Temperature, 5), None);
        assert!(s.validate("forecast").is_ok());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let s = series(&["2024-06-01T10:00", "2024-06-01T11:00"], vec![Some(20.0)]);
        assert_eq!(
            s.validate("forecast"),
            Err(EvalError::SeriesLengthMismatch {
                source_name: "forecast".to_string(),
                factor: "temperature",
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_non_increasing_rejected() {
        let tz = parse_timezone("UTC").unwrap();
        let s = series(&["2024-06-01T11:00", "2024-06-01T10:00"], vec![]);
        let err = AlignedSource::new("forecast", &s, tz).unwrap_err();
        assert_eq!(
            err,
            EvalError::NonIncreasingTimestamps { source_name: "forecast".to_string(), index: 1 }
        );
    }

    #[test]
    fn test_naive_series_through_spring_gap_rejected() {
        // Berlin has no 02:00 on 2024-03-31; it lands on the same instant as 03:00
        let tz = parse_timezone("Europe/Berlin").unwrap();
        let s = series(
            &["2024-03-31T01:00", "2024-03-31T02:00", "2024-03-31T03:00"],
            vec![Some(5.0), Some(5.0), Some(6.0)],
        );
        let err = AlignedSource::new("forecast", &s, tz).unwrap_err();
        assert_eq!(
            err,
            EvalError::NonIncreasingTimestamps { source_name: "forecast".to_string(), index: 2 }
        );

        // skipping the missing hour is accepted
        let s = series(&["2024-03-31T01:00", "2024-03-31T03:00"], vec![Some(5.0), Some(6.0)]);
        assert!(AlignedSource::new("forecast", &s, tz).is_ok());
    }

    #[test]
    fn test_index_onto_matches_instants_across_representations() {
        let tz = parse_timezone("Europe/Berlin").unwrap();
        let primary = series(
            &["2024-06-01T10:00", "2024-06-01T11:00", "2024-06-01T12:00"],
            vec![Some(1.0), Some(2.0), Some(3.0)],
        );
        // Same hours in UTC, first hour missing
        let secondary = series(&["2024-06-01T09:00Z", "2024-06-01T10:00Z"], vec![Some(2.5), Some(3.5)]);

        let p = AlignedSource::new("forecast", &primary, tz).unwrap();
        let s = AlignedSource::new("reanalysis", &secondary, tz).unwrap();
        assert_eq!(s.index_onto(&p), vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn test_hour_values() {
        let tz = parse_timezone("UTC").unwrap();
        let s = series(&["2024-06-01T10:00"], vec![Some(21.5)])
            .with_column(Factor::Humidity, vec![None]);
        let aligned = AlignedSource::new("forecast", &s, tz).unwrap();
        let hour = aligned.hour(0);
        assert_eq!(hour.get(Factor::Temperature), Some(21.5));
        assert_eq!(hour.get(Factor::Humidity), None);
    }
}
