//! Threshold Preferences
//!
//! Typed per-factor preferences. Users state bounds in their display units;
//! `Preferences::thresholds()` normalizes them to canonical units (°C, %, m/s,
//! mm) once, before any hour is evaluated.
//!
//! The trip-planner payload shape (`consider` / `units` / `thresholds` maps
//! keyed by strings such as `temp_min`) is accepted through [`RawPreferences`]
//! and converted at the boundary, so nothing past this module dispatches on
//! factor-name strings.

use crate::factor::Factor;
use crate::units::{DisplayUnits, PrecipUnit, TemperatureUnit, WindUnit};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which bound a value broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSide {
    BelowMin,
    AboveMax,
}

/// Optional lower/upper bound pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn max_only(max: f64) -> Self {
        Self { min: None, max: Some(max) }
    }

    /// Strict comparison: a value equal to a bound passes
    pub fn check(&self, value: f64) -> Option<BoundSide> {
        if self.min.is_some_and(|min| value < min) {
            Some(BoundSide::BelowMin)
        } else if self.max.is_some_and(|max| value > max) {
            Some(BoundSide::AboveMax)
        } else {
            None
        }
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            min: self.min.map(&f),
            max: self.max.map(&f),
        }
    }
}

/// User preference for one factor, bounds in display units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FactorPreference {
    pub enabled: bool,
    pub bounds: Bounds,
}

/// Canonical-unit thresholds for the enabled factors
///
/// A factor is enabled iff it has an entry; an enabled factor with no bounds
/// can never fail.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thresholds {
    bounds: [Option<Bounds>; 5],
}

impl Thresholds {
    /// Nothing enabled: every hour passes
    pub fn none() -> Self {
        Self::default()
    }

    /// Enable `factor` with canonical-unit bounds
    ///
    /// A minimum on a max-only factor is dropped.
    pub fn with(mut self, factor: Factor, bounds: Bounds) -> Self {
        let bounds = if factor.is_max_only() && bounds.min.is_some() {
            tracing::warn!(factor = factor.key(), "ignoring minimum on max-only factor");
            Bounds { min: None, ..bounds }
        } else {
            bounds
        };
        self.bounds[factor.index()] = Some(bounds);
        self
    }

    pub fn get(&self, factor: Factor) -> Option<&Bounds> {
        self.bounds[factor.index()].as_ref()
    }

    pub fn is_enabled(&self, factor: Factor) -> bool {
        self.bounds[factor.index()].is_some()
    }

    /// Enabled factors with their bounds, in reporting order
    pub fn enabled(&self) -> impl Iterator<Item = (Factor, &Bounds)> + '_ {
        Factor::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|b| (f, b)))
    }
}

/// Typed preferences for all five factors
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawPreferences", into = "RawPreferences")]
pub struct Preferences {
    factors: [FactorPreference; 5],
    pub units: DisplayUnits,
}

impl Preferences {
    pub fn new(units: DisplayUnits) -> Self {
        Self {
            factors: [FactorPreference::default(); 5],
            units,
        }
    }

    /// Enable `factor` with display-unit bounds
    pub fn with(mut self, factor: Factor, min: Option<f64>, max: Option<f64>) -> Self {
        self.factors[factor.index()] = FactorPreference {
            enabled: true,
            bounds: Bounds::new(min, max),
        };
        self
    }

    pub fn get(&self, factor: Factor) -> &FactorPreference {
        &self.factors[factor.index()]
    }

    pub fn set(&mut self, factor: Factor, preference: FactorPreference) {
        self.factors[factor.index()] = preference;
    }

    pub fn enabled_factors(&self) -> impl Iterator<Item = Factor> + '_ {
        Factor::ALL
            .into_iter()
            .filter(|f| self.get(*f).enabled)
    }

    /// Normalize enabled bounds to canonical units
    pub fn thresholds(&self) -> Thresholds {
        self.enabled_factors().fold(Thresholds::none(), |acc, factor| {
            let bounds = self
                .get(factor)
                .bounds
                .map(|v| self.units.to_canonical(factor, v));
            acc.with(factor, bounds)
        })
    }
}

// ============================================================================
// Trip-planner payload shape
// ============================================================================

/// Preferences as posted by the trip planner UI
///
/// ```json
/// {
///   "consider":   {"temp": true, "precip_prob": true},
///   "units":      {"temp": "F"},
///   "thresholds": {"temp_min": 50, "temp_max": 80, "precip_prob_max": 40}
/// }
/// ```
///
/// Keys may use either the short (`temp`) or long (`temperature`) factor name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPreferences {
    #[serde(default)]
    pub consider: BTreeMap<String, bool>,
    #[serde(default)]
    pub units: BTreeMap<String, String>,
    #[serde(default)]
    pub thresholds: BTreeMap<String, Option<f64>>,
}

fn lookup<'a, V>(map: &'a BTreeMap<String, V>, factor: Factor, suffix: &str) -> Option<&'a V> {
    map.get(&format!("{}{}", factor.short_key(), suffix))
        .or_else(|| map.get(&format!("{}{}", factor.key(), suffix)))
}

fn parse_unit<U: Default>(
    raw: &RawPreferences,
    factor: Factor,
    parse: impl Fn(&str) -> Option<U>,
) -> U {
    match lookup(&raw.units, factor, "") {
        Some(code) => parse(code).unwrap_or_else(|| {
            tracing::warn!(factor = factor.key(), unit = %code, "unknown unit, using canonical");
            U::default()
        }),
        None => U::default(),
    }
}

impl From<RawPreferences> for Preferences {
    fn from(raw: RawPreferences) -> Self {
        for key in raw.consider.keys() {
            if Factor::from_key(key).is_none() {
                tracing::warn!(key = %key, "ignoring unknown factor in preferences");
            }
        }

        let units = DisplayUnits {
            temperature: parse_unit(&raw, Factor::Temperature, TemperatureUnit::from_code),
            wind: parse_unit(&raw, Factor::Wind, WindUnit::from_code),
            precip_amount: parse_unit(&raw, Factor::PrecipAmount, PrecipUnit::from_code),
        };

        let mut prefs = Preferences::new(units);
        for factor in Factor::ALL {
            let enabled = lookup(&raw.consider, factor, "").copied().unwrap_or(false);
            let bound = |suffix: &str| lookup(&raw.thresholds, factor, suffix).copied().flatten();
            prefs.set(
                factor,
                FactorPreference {
                    enabled,
                    bounds: Bounds::new(bound("_min"), bound("_max")),
                },
            );
        }
        prefs
    }
}

impl From<Preferences> for RawPreferences {
    fn from(prefs: Preferences) -> Self {
        let mut raw = RawPreferences::default();
        raw.units.insert("temp".to_string(), prefs.units.temperature.code().to_string());
        raw.units.insert("wind".to_string(), prefs.units.wind.code().to_string());
        raw.units.insert("precip_amt".to_string(), prefs.units.precip_amount.code().to_string());

        for factor in Factor::ALL {
            let pref = prefs.get(factor);
            let key = factor.short_key();
            raw.consider.insert(key.to_string(), pref.enabled);
            if let Some(min) = pref.bounds.min {
                raw.thresholds.insert(format!("{}_min", key), Some(min));
            }
            if let Some(max) = pref.bounds.max {
                raw.thresholds.insert(format!("{}_max", key), Some(max));
            }
        }
        raw
    }
}
