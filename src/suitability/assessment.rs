//! Window Assessment Types
//!
//! Output structures for one window evaluation. Everything here is derived,
//! read-only data built fresh per request.

use super::alternatives::AltWindow;
use super::climatology::NormalFit;
use super::disagreement::FlipLevel;
use super::evaluator::HourEvaluation;
use super::spans::Span;
use crate::factor::Factor;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MESSAGE_MEETS: &str = "All selected hours meet your conditions.";
pub const MESSAGE_VIOLATES: &str = "Some hours violate your conditions.";
pub const MESSAGE_NO_DATA: &str = "No hourly forecast available for that time range (too far out).";

/// Observed window mean against its climatological normal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimatologySummary {
    /// Observed window mean (presentation unit)
    pub mean: Option<f64>,

    /// Presentation unit label, e.g. "F" or "%"
    pub unit: &'static str,

    /// Normal mean over the same months and hours (presentation unit)
    pub normal_mean: Option<f64>,

    pub pct_of_normal: Option<f64>,

    pub fit: NormalFit,

    /// E.g. "warmer than normal"
    pub label: String,
}

/// Per-factor summary of the selected window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionSummary {
    pub key: Factor,

    /// Display label, e.g. "Precip. Probability"
    pub label: &'static str,

    /// No hour in the window failed this factor
    pub ok: bool,

    /// Observed extremes (presentation unit, 2 decimals)
    pub min: Option<f64>,
    pub max: Option<f64>,

    pub unit: &'static str,

    /// Mean flip probability against the secondary source, if there is one
    pub flip_probability: Option<f64>,
    pub flip_level: Option<FlipLevel>,

    pub climatology: Option<ClimatologySummary>,
}

/// Evaluation of a window that has data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowReport {
    /// Every hour passed
    pub meets: bool,

    /// One entry per hour of the selected window
    pub hourly: Vec<HourEvaluation>,

    /// Runs of failing hours (any factor) inside the window
    pub violations: Vec<Span>,

    /// Runs of failing hours per enabled factor over the extended range
    pub unideal_spans: BTreeMap<Factor, Vec<Span>>,

    /// Nearest all-pass windows of the same length, before then after
    pub alt_windows: Vec<AltWindow>,

    /// Enabled factors in reporting order
    pub conditions: Vec<ConditionSummary>,

    /// Factors with a normal to compare against
    pub climatology: BTreeMap<Factor, ClimatologySummary>,
}

impl WindowReport {
    pub fn condition(&self, factor: Factor) -> Option<&ConditionSummary> {
        self.conditions.iter().find(|c| c.key == factor)
    }
}

/// Result of one evaluation request
///
/// When `no_data_for_window` is set, the window selected no hours and
/// `report` is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub no_data_for_window: bool,

    /// IANA zone all timestamps are expressed in
    pub timezone: String,

    /// One-line summary for display
    pub message: &'static str,

    #[serde(flatten)]
    pub report: Option<WindowReport>,
}

impl EvaluationResult {
    pub fn no_data(timezone: impl Into<String>) -> Self {
        Self {
            no_data_for_window: true,
            timezone: timezone.into(),
            message: MESSAGE_NO_DATA,
            report: None,
        }
    }

    pub fn from_report(timezone: impl Into<String>, report: WindowReport) -> Self {
        let message = if report.meets { MESSAGE_MEETS } else { MESSAGE_VIOLATES };
        Self {
            no_data_for_window: false,
            timezone: timezone.into(),
            message,
            report: Some(report),
        }
    }

    /// Window meets every enabled threshold; `None` without data
    pub fn meets(&self) -> Option<bool> {
        self.report.as_ref().map(|r| r.meets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_report(meets: bool) -> WindowReport {
        WindowReport {
            meets,
            hourly: Vec::new(),
            violations: Vec::new(),
            unideal_spans: BTreeMap::new(),
            alt_windows: Vec::new(),
            conditions: Vec::new(),
            climatology: BTreeMap::new(),
        }
    }

    #[test]
    fn test_no_data_serializes_without_report_fields() {
        let value = serde_json::to_value(EvaluationResult::no_data("Europe/Berlin")).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(value["no_data_for_window"], true);
        assert_eq!(value["message"], MESSAGE_NO_DATA);
        assert!(obj.get("meets").is_none());
    }

    #[test]
    fn test_report_fields_are_flattened() {
        let result = EvaluationResult::from_report("UTC", empty_report(false));
        assert_eq!(result.meets(), Some(false));
        assert_eq!(result.message, MESSAGE_VIOLATES);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["meets"], false);
        assert!(value["violations"].as_array().unwrap().is_empty());
        assert!(value["unideal_spans"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_meeting_message() {
        assert_eq!(EvaluationResult::from_report("UTC", empty_report(true)).message, MESSAGE_MEETS);
    }
}
