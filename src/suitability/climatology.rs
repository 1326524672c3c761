//! Climatology Comparator
//!
//! Compares a window's observed mean against the long-run normal for the same
//! months and hours. Both means must be in the same presentation unit.
//!
//! Percent-of-normal is a ratio, so it is only meaningful for quantities with
//! a true zero. Temperatures near or below zero give large or negative
//! percentages; the label is still derived from the same cutoffs.

use crate::factor::Factor;
use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observed mean relative to the normal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalFit {
    BelowNormal,
    NearNormal,
    AboveNormal,
    /// Missing observation or normal, or a zero normal
    Undetermined,
}

impl NormalFit {
    pub fn display_text(&self) -> &'static str {
        match self {
            NormalFit::BelowNormal => "Below normal",
            NormalFit::NearNormal => "Near normal",
            NormalFit::AboveNormal => "Above normal",
            NormalFit::Undetermined => "Undetermined",
        }
    }
}

/// Percent-of-normal cutoffs: `<= below_pct` is below, `>= above_pct` is above
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateCutoffs {
    pub below_pct: f64,
    pub above_pct: f64,
}

impl Default for ClimateCutoffs {
    fn default() -> Self {
        Self {
            below_pct: 90.0,
            above_pct: 110.0,
        }
    }
}

/// Words for a below/above-normal reading, e.g. "cooler"/"warmer"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptors<'a> {
    pub below: &'a str,
    pub above: &'a str,
}

impl Descriptors<'static> {
    pub fn for_factor(factor: Factor) -> Self {
        let (below, above) = match factor {
            Factor::Temperature => ("cooler", "warmer"),
            Factor::Humidity => ("drier", "more humid"),
            Factor::Wind => ("calmer", "windier"),
            Factor::PrecipProbability => ("less rain-prone", "more rain-prone"),
            Factor::PrecipAmount => ("drier", "wetter"),
        };
        Self { below, above }
    }
}

/// Result of one observed-vs-normal comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateComparison {
    pub fit: NormalFit,
    pub pct_of_normal: Option<f64>,
    /// "warmer than normal", "near normal" or "undetermined"
    pub label: String,
}

/// Compare an observed mean against its normal
pub fn compare_to_normal(
    observed: Option<f64>,
    normal: Option<f64>,
    descriptors: Descriptors<'_>,
    cutoffs: &ClimateCutoffs,
) -> ClimateComparison {
    let pct = match (observed, normal) {
        (Some(obs), Some(norm)) if norm != 0.0 => Some(obs / norm * 100.0),
        _ => None,
    };

    let (fit, label) = match pct {
        None => (NormalFit::Undetermined, "undetermined".to_string()),
        Some(p) if p <= cutoffs.below_pct => {
            (NormalFit::BelowNormal, format!("{} than normal", descriptors.below))
        }
        Some(p) if p >= cutoffs.above_pct => {
            (NormalFit::AboveNormal, format!("{} than normal", descriptors.above))
        }
        Some(_) => (NormalFit::NearNormal, "near normal".to_string()),
    };

    ClimateComparison {
        fit,
        pct_of_normal: pct,
        label,
    }
}

// ============================================================================
// Normals table
// ============================================================================

/// Month × hour normals for one factor: 12 rows (Jan..Dec) of 24 local hours
pub type MonthHourTable = Vec<Vec<Option<f64>>>;

/// Long-run normals per factor, canonical units
///
/// ```json
/// {"temperature": [[3.1, 2.8, ...24 values], ...12 months]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClimateNormals {
    tables: BTreeMap<Factor, MonthHourTable>,
}

impl ClimateNormals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, factor: Factor, table: MonthHourTable) -> Self {
        self.tables.insert(factor, table);
        self
    }

    /// Same normal for every hour of every month
    pub fn with_constant(self, factor: Factor, value: f64) -> Self {
        self.with(factor, vec![vec![Some(value); 24]; 12])
    }

    pub fn has(&self, factor: Factor) -> bool {
        self.tables.contains_key(&factor)
    }

    /// Normal at one local hour
    pub fn at(&self, factor: Factor, t: DateTime<Tz>) -> Option<f64> {
        self.tables
            .get(&factor)?
            .get(t.month0() as usize)?
            .get(t.hour() as usize)
            .copied()
            .flatten()
    }

    /// Mean of the normals at each of `times`, skipping missing cells
    pub fn window_normal(&self, factor: Factor, times: &[DateTime<Tz>]) -> Option<f64> {
        let values: Vec<f64> = times.iter().filter_map(|t| self.at(factor, *t)).collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
