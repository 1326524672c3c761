//! Weather Factors
//!
//! Closed enumeration of the monitored weather quantities. Declaration order
//! is the reporting order: failing-factor lists, condition summaries and
//! per-factor span maps all follow it.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Ordered set of factors, at most one entry per factor
pub type FactorList = SmallVec<[Factor; 5]>;

/// One monitored weather quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Probability of precipitation (%), max-only
    #[serde(alias = "precip_prob")]
    PrecipProbability,

    /// Precipitation depth (canonical mm), max-only
    #[serde(alias = "precip_amt")]
    PrecipAmount,

    /// Air temperature at 2 m (canonical °C)
    #[serde(alias = "temp")]
    Temperature,

    /// Relative humidity at 2 m (%)
    Humidity,

    /// Wind speed at 10 m (canonical m/s)
    Wind,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::PrecipProbability,
        Factor::PrecipAmount,
        Factor::Temperature,
        Factor::Humidity,
        Factor::Wind,
    ];

    /// Position in `Factor::ALL`
    pub fn index(self) -> usize {
        match self {
            Factor::PrecipProbability => 0,
            Factor::PrecipAmount => 1,
            Factor::Temperature => 2,
            Factor::Humidity => 3,
            Factor::Wind => 4,
        }
    }

    /// Stable snake_case key (matches the serde name)
    pub fn key(self) -> &'static str {
        match self {
            Factor::PrecipProbability => "precip_probability",
            Factor::PrecipAmount => "precip_amount",
            Factor::Temperature => "temperature",
            Factor::Humidity => "humidity",
            Factor::Wind => "wind",
        }
    }

    /// Short key used by trip-planner preference payloads
    pub fn short_key(self) -> &'static str {
        match self {
            Factor::PrecipProbability => "precip_prob",
            Factor::PrecipAmount => "precip_amt",
            Factor::Temperature => "temp",
            Factor::Humidity => "humidity",
            Factor::Wind => "wind",
        }
    }

    /// Accepts either the snake_case key or the short key
    pub fn from_key(key: &str) -> Option<Self> {
        Factor::ALL
            .into_iter()
            .find(|f| f.key() == key || f.short_key() == key)
    }

    pub fn display_text(self) -> &'static str {
        match self {
            Factor::PrecipProbability => "Precip. Probability",
            Factor::PrecipAmount => "Precip. Amount",
            Factor::Temperature => "Temperature",
            Factor::Humidity => "Humidity",
            Factor::Wind => "Wind Speed",
        }
    }

    /// A minimum bound is meaningless for precipitation
    pub fn is_max_only(self) -> bool {
        matches!(self, Factor::PrecipProbability | Factor::PrecipAmount)
    }
}
