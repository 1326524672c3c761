//! Threshold Evaluator
//!
//! Checks one hour's values against the enabled, canonical-unit thresholds.
//! A value strictly below `min` or strictly above `max` fails its factor; a
//! missing value never fails ("unknown, not penalized").
//!
//! [`evaluate_range`] is the only range loop. The planner calls it once for
//! the selected window and once for the extended range, so the two passes
//! cannot drift apart.

use crate::factor::{Factor, FactorList};
use crate::preferences::{BoundSide, Thresholds};
use crate::series::{AlignedSource, HourValues};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Why an hour failed, one code per broken bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    PrecipProb,
    PrecipAmt,
    TempLow,
    TempHigh,
    HumidityLow,
    HumidityHigh,
    WindLow,
    WindHigh,
}

impl Reason {
    pub fn new(factor: Factor, side: BoundSide) -> Self {
        match (factor, side) {
            (Factor::PrecipProbability, _) => Reason::PrecipProb,
            (Factor::PrecipAmount, _) => Reason::PrecipAmt,
            (Factor::Temperature, BoundSide::BelowMin) => Reason::TempLow,
            (Factor::Temperature, BoundSide::AboveMax) => Reason::TempHigh,
            (Factor::Humidity, BoundSide::BelowMin) => Reason::HumidityLow,
            (Factor::Humidity, BoundSide::AboveMax) => Reason::HumidityHigh,
            (Factor::Wind, BoundSide::BelowMin) => Reason::WindLow,
            (Factor::Wind, BoundSide::AboveMax) => Reason::WindHigh,
        }
    }

    pub fn factor(self) -> Factor {
        match self {
            Reason::PrecipProb => Factor::PrecipProbability,
            Reason::PrecipAmt => Factor::PrecipAmount,
            Reason::TempLow | Reason::TempHigh => Factor::Temperature,
            Reason::HumidityLow | Reason::HumidityHigh => Factor::Humidity,
            Reason::WindLow | Reason::WindHigh => Factor::Wind,
        }
    }
}

/// Outcome for a single hour
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourVerdict {
    /// Failing factors in reporting order
    pub failing: FactorList,
    /// One reason per failing factor, same order
    pub reasons: SmallVec<[Reason; 5]>,
}

impl HourVerdict {
    pub fn pass(&self) -> bool {
        self.failing.is_empty()
    }

    pub fn fails(&self, factor: Factor) -> bool {
        self.failing.contains(&factor)
    }
}

/// Evaluate one hour against the enabled thresholds
pub fn evaluate_hour(values: &HourValues, thresholds: &Thresholds) -> HourVerdict {
    let mut verdict = HourVerdict::default();
    for (factor, bounds) in thresholds.enabled() {
        let Some(value) = values.get(factor) else {
            continue;
        };
        if let Some(side) = bounds.check(value) {
            verdict.failing.push(factor);
            verdict.reasons.push(Reason::new(factor, side));
        }
    }
    verdict
}

/// Evaluated hour with its local timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourEvaluation {
    pub timestamp: DateTime<Tz>,
    pub pass: bool,
    pub failing_factors: FactorList,
    pub reasons: SmallVec<[Reason; 5]>,
}

impl HourEvaluation {
    pub fn fails(&self, factor: Factor) -> bool {
        self.failing_factors.contains(&factor)
    }
}

/// Evaluate the hours of `source` at `indices`, in order
pub fn evaluate_range(
    source: &AlignedSource<'_>,
    indices: &[usize],
    thresholds: &Thresholds,
) -> Vec<HourEvaluation> {
    indices
        .iter()
        .map(|&i| {
            let verdict = evaluate_hour(&source.hour(i), thresholds);
            HourEvaluation {
                timestamp: source.times()[i],
                pass: verdict.pass(),
                failing_factors: verdict.failing,
                reasons: verdict.reasons,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Bounds;
    use crate::series::HourlySeries;
    use crate::temporal::parse_timezone;

    #[test]
    fn test_no_thresholds_passes_vacuously() {
        let values = HourValues::new().with(Factor::Temperature, Some(55.0));
        assert!(evaluate_hour(&values, &Thresholds::none()).pass());
    }

    #[test]
    fn test_missing_value_passes() {
        let th = Thresholds::none().with(Factor::Wind, Bounds::new(Some(1.0), Some(5.0)));
        let verdict = evaluate_hour(&HourValues::new(), &th);
        assert!(verdict.pass());
    }

    #[test]
    fn test_failures_follow_reporting_order() {
        let th = Thresholds::none()
            .with(Factor::Wind, Bounds::max_only(5.0))
            .with(Factor::Temperature, Bounds::new(Some(10.0), None))
            .with(Factor::PrecipProbability, Bounds::max_only(30.0));
        let values = HourValues::new()
            .with(Factor::Wind, Some(9.0))
            .with(Factor::Temperature, Some(4.0))
            .with(Factor::PrecipProbability, Some(60.0));

        let verdict = evaluate_hour(&values, &th);
        assert!(!verdict.pass());
        assert_eq!(
            verdict.failing.as_slice(),
            &[Factor::PrecipProbability, Factor::Temperature, Factor::Wind]
        );
        assert_eq!(
            verdict.reasons.as_slice(),
            &[Reason::PrecipProb, Reason::TempLow, Reason::WindHigh]
        );
        assert!(verdict.fails(Factor::Temperature));
        assert!(!verdict.fails(Factor::Humidity));
    }

    #[test]
    fn test_disabled_factor_ignored() {
        let th = Thresholds::none().with(Factor::Humidity, Bounds::max_only(60.0));
        let values = HourValues::new()
            .with(Factor::Humidity, Some(50.0))
            .with(Factor::Temperature, Some(45.0));
        assert!(evaluate_hour(&values, &th).pass());
    }

    #[test]
    fn test_reason_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Reason::HumidityHigh).unwrap(), "\"humidity_high\"");
        assert_eq!(Reason::PrecipAmt.factor(), Factor::PrecipAmount);
    }

    #[test]
    fn test_evaluate_range_uses_indices() {
        let tz = parse_timezone("UTC").unwrap();
        let series = HourlySeries {
            time: (0..4).map(|h| format!("2024-06-01T{:02}:00", h)).collect(),
            ..Default::default()
        }
        .with_column(Factor::Temperature, vec![Some(18.0), Some(22.0), Some(26.0), Some(30.0)]);
        let source = AlignedSource::new("forecast", &series, tz).unwrap();
        let th = Thresholds::none().with(Factor::Temperature, Bounds::max_only(24.0));

        let hours = evaluate_range(&source, &[1, 2], &th);
        assert_eq!(hours.len(), 2);
        assert!(hours[0].pass);
        assert!(!hours[1].pass);
        assert_eq!(hours[1].timestamp, source.times()[2]);
        assert!(hours[1].fails(Factor::Temperature));
    }
}
