//! Disagreement Estimator
//!
//! Estimates, per factor and hour, how likely two independent sources are to
//! disagree on pass/fail. When a bound is configured the difference between
//! the sources is measured against the margin to the nearest bound: if the
//! sources differ by more than that margin, a pass could plausibly be a fail.
//! Without bounds there is nothing to flip against, so a per-factor scale turns
//! the raw difference into a softer proxy.

use crate::factor::Factor;
use crate::preferences::Bounds;
use serde::{Deserialize, Serialize};

/// Keeps the ratio finite when a value sits exactly on a bound
pub const FLIP_EPSILON: f64 = 1e-6;

/// Probability in [0, 1] that the two readings straddle a decision boundary
///
/// `None` iff either reading is absent. Symmetric in `a` and `b`.
pub fn flip_probability(
    a: Option<f64>,
    b: Option<f64>,
    lower: Option<f64>,
    upper: Option<f64>,
    no_threshold_scale: f64,
) -> Option<f64> {
    let (a, b) = (a?, b?);
    let diff = (a - b).abs();

    let distance = lower
        .into_iter()
        .chain(upper)
        .flat_map(|bound| [(a - bound).abs(), (b - bound).abs()])
        .reduce(f64::min);

    let p = match distance {
        Some(distance) => diff / (distance + FLIP_EPSILON),
        None => diff * no_threshold_scale,
    };
    Some(p.clamp(0.0, 1.0))
}

/// Same as [`flip_probability`] with a factor's bounds
pub fn flip_probability_for(
    a: Option<f64>,
    b: Option<f64>,
    bounds: &Bounds,
    no_threshold_scale: f64,
) -> Option<f64> {
    flip_probability(a, b, bounds.min, bounds.max, no_threshold_scale)
}

/// Mean over the defined per-hour probabilities, with the number of hours used
pub fn mean_flip(probabilities: impl IntoIterator<Item = Option<f64>>) -> Option<(f64, usize)> {
    let (sum, count) = probabilities
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), p| (sum + p, count + 1));
    (count > 0).then(|| (sum / count as f64, count))
}

/// Qualitative disagreement tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipLevel {
    Low,
    Medium,
    High,
}

impl FlipLevel {
    pub fn display_text(&self) -> &'static str {
        match self {
            FlipLevel::Low => "Low",
            FlipLevel::Medium => "Medium",
            FlipLevel::High => "High",
        }
    }
}

/// Probability cutoffs: `< low` is Low, `< medium` is Medium, else High
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipCutoffs {
    pub low: f64,
    pub medium: f64,
}

impl Default for FlipCutoffs {
    fn default() -> Self {
        Self { low: 0.3, medium: 0.7 }
    }
}

impl FlipCutoffs {
    pub fn classify(&self, probability: f64) -> FlipLevel {
        if probability < self.low {
            FlipLevel::Low
        } else if probability < self.medium {
            FlipLevel::Medium
        } else {
            FlipLevel::High
        }
    }
}

/// Scales applied to raw differences when a factor has no bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoThresholdScales {
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
    pub precip_probability: f64,
    pub precip_amount: f64,
}

impl Default for NoThresholdScales {
    fn default() -> Self {
        Self {
            temperature: 0.25,
            humidity: 0.02,
            wind: 0.25,
            precip_probability: 0.02,
            precip_amount: 0.5,
        }
    }
}

impl NoThresholdScales {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Temperature => self.temperature,
            Factor::Humidity => self.humidity,
            Factor::Wind => self.wind,
            Factor::PrecipProbability => self.precip_probability,
            Factor::PrecipAmount => self.precip_amount,
        }
    }
}

/// Window-level disagreement for one factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorDisagreement {
    pub mean_probability: f64,
    pub level: FlipLevel,
    /// Hours where both sources had a value
    pub hours_compared: usize,
}

impl FactorDisagreement {
    pub fn from_hours(
        probabilities: impl IntoIterator<Item = Option<f64>>,
        cutoffs: &FlipCutoffs,
    ) -> Option<Self> {
        mean_flip(probabilities).map(|(mean, hours)| Self {
            mean_probability: mean,
            level: cutoffs.classify(mean),
            hours_compared: hours,
        })
    }
}
