//! Window Planner - Main coordinator for evaluating a trip window
//!
//! Wires the suitability engine together for one request:
//! 1. Resolve the zone, window and pad (rejecting inverted windows and
//!    out-of-range pads before any series work)
//! 2. Align every source onto local time, pick the primary and secondary source
//! 3. Select the window's hours; an empty selection short-circuits to "no data"
//! 4. Evaluate the window and the padded extended range with the same evaluator
//! 5. Group violations and per-factor unideal spans, search alternatives
//! 6. Annotate enabled factors with observed extremes, source disagreement
//!    and climatology
//!
//! Planning is pure: no I/O and no shared state, so one planner can serve
//! any number of threads.

use crate::config::EvaluatorConfig;
use crate::error::{EvalError, EvalResult};
use crate::factor::Factor;
use crate::preferences::{Preferences, Thresholds};
use crate::series::{AlignedSource, HourlySeries};
use crate::suitability::assessment::{ClimatologySummary, ConditionSummary, EvaluationResult, WindowReport};
use crate::suitability::climatology::{compare_to_normal, ClimateNormals, Descriptors};
use crate::suitability::disagreement::{flip_probability_for, FactorDisagreement};
use crate::suitability::{evaluate_range, find_alternatives, group_by, HourEvaluation, SearchBoundary, Span};
use crate::temporal::{parse_timezone, select, TimeWindow};
use crate::units::{round_decimals, round_sig, DisplayUnits};
use anyhow::Context;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Requested window as local wall-clock strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub start_local: String,
    pub end_local: String,
}

/// One evaluation request with all data already fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub window: WindowSpec,

    /// IANA zone id the window is expressed in
    pub timezone: String,

    /// Hourly series by source name
    pub sources: BTreeMap<String, HourlySeries>,

    /// Source to evaluate; defaults to the first by name
    #[serde(default)]
    pub primary_source: Option<String>,

    #[serde(default)]
    pub preferences: Preferences,

    /// Overrides the configured extension pad
    #[serde(default)]
    pub extension_pad_hours: Option<i64>,

    #[serde(default)]
    pub climatology: Option<ClimateNormals>,
}

impl EvaluationRequest {
    pub fn new(start_local: &str, end_local: &str, timezone: &str) -> Self {
        Self {
            window: WindowSpec {
                start_local: start_local.to_string(),
                end_local: end_local.to_string(),
            },
            timezone: timezone.to_string(),
            sources: BTreeMap::new(),
            primary_source: None,
            preferences: Preferences::default(),
            extension_pad_hours: None,
            climatology: None,
        }
    }

    pub fn with_source(mut self, name: &str, series: HourlySeries) -> Self {
        self.sources.insert(name.to_string(), series);
        self
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Load request from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read evaluation request: {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| "Failed to parse evaluation request JSON")
    }
}

/// Main window planner
#[derive(Debug, Clone, Default)]
pub struct WindowPlanner {
    config: EvaluatorConfig,
}

/// Primary source plus the optional comparison source, mapped onto it
struct Sources<'a> {
    primary: AlignedSource<'a>,
    secondary: Option<(AlignedSource<'a>, Vec<Option<usize>>)>,
}

impl<'a> Sources<'a> {
    fn resolve(request: &'a EvaluationRequest, tz: Tz) -> EvalResult<Self> {
        let primary_name = match &request.primary_source {
            Some(name) if request.sources.contains_key(name) => name.as_str(),
            Some(name) => return Err(EvalError::UnknownSource(name.clone())),
            None => request
                .sources
                .keys()
                .next()
                .map(String::as_str)
                .ok_or(EvalError::NoSources)?,
        };

        let mut primary = None;
        let mut others = Vec::new();
        for (name, series) in &request.sources {
            let aligned = AlignedSource::new(name, series, tz)?;
            if name == primary_name {
                primary = Some(aligned);
            } else {
                others.push(aligned);
            }
        }
        let primary = primary.ok_or_else(|| EvalError::UnknownSource(primary_name.to_string()))?;

        if others.len() > 1 {
            tracing::debug!(
                ignored = others.len() - 1,
                "only the first secondary source is compared"
            );
        }
        let secondary = others.into_iter().next().map(|s| {
            let mapping = s.index_onto(&primary);
            (s, mapping)
        });

        Ok(Self { primary, secondary })
    }

    /// Secondary value at the primary's hour `i`
    fn secondary_value(&self, factor: Factor, i: usize) -> Option<f64> {
        let (source, mapping) = self.secondary.as_ref()?;
        mapping.get(i).copied().flatten().and_then(|j| source.value(factor, j))
    }
}

impl WindowPlanner {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate one request
    pub fn evaluate(&self, request: &EvaluationRequest) -> EvalResult<EvaluationResult> {
        let tz = parse_timezone(&request.timezone)?;
        let window = TimeWindow::parse(&request.window.start_local, &request.window.end_local, tz)?;
        let pad = request
            .extension_pad_hours
            .unwrap_or(self.config.extension_pad_hours);
        let extended_window = window.extended(pad)?;
        let sources = Sources::resolve(request, tz)?;
        let primary = &sources.primary;

        let selected = select(primary.times(), &window);
        tracing::debug!(
            source = primary.name(),
            hours = selected.len(),
            available = primary.len(),
            "selected window hours"
        );
        if selected.is_empty() {
            return Ok(EvaluationResult::no_data(tz.name()));
        }

        let thresholds = request.preferences.thresholds();
        let units = request.preferences.units;

        // Selected window
        let hourly = evaluate_range(primary, &selected, &thresholds);
        let window_times = timestamps(&hourly);
        let violations = group_by(&window_times, &hourly, |h| !h.pass);
        let meets = hourly.iter().all(|h| h.pass);

        // Extended range
        let extended_idx = select(primary.times(), &extended_window);
        let extended = evaluate_range(primary, &extended_idx, &thresholds);
        let extended_times = timestamps(&extended);

        let unideal_spans: BTreeMap<Factor, Vec<Span>> = thresholds
            .enabled()
            .map(|(factor, _)| {
                (factor, group_by(&extended_times, &extended, |h| h.fails(factor)))
            })
            .collect();

        let pass_mask: Vec<bool> = extended.iter().map(|h| h.pass).collect();
        let alt_windows = find_alternatives(
            &extended_times,
            &pass_mask,
            window.duration_hours(),
            SearchBoundary::around(&extended_times, &window),
        );

        if let Some((secondary, mapping)) = &sources.secondary {
            if selected.iter().all(|&i| mapping[i].is_none()) {
                tracing::warn!(
                    source = secondary.name(),
                    "secondary source has no hours in the window"
                );
            }
        }

        let climatology = self.climatology(request.climatology.as_ref(), primary, &selected, &window_times, &units);
        let conditions = thresholds
            .enabled()
            .map(|(factor, _)| {
                self.condition(factor, &sources, &selected, &hourly, &thresholds, &units, climatology.get(&factor))
            })
            .collect();

        let report = WindowReport {
            meets,
            hourly,
            violations,
            unideal_spans,
            alt_windows,
            conditions,
            climatology,
        };
        Ok(EvaluationResult::from_report(tz.name(), report))
    }

    #[allow(clippy::too_many_arguments)]
    fn condition(
        &self,
        factor: Factor,
        sources: &Sources<'_>,
        selected: &[usize],
        hourly: &[HourEvaluation],
        thresholds: &Thresholds,
        units: &DisplayUnits,
        climatology: Option<&ClimatologySummary>,
    ) -> ConditionSummary {
        let primary = &sources.primary;
        let observed: Vec<f64> = selected.iter().filter_map(|&i| primary.value(factor, i)).collect();
        let present = |v: f64| round_decimals(units.to_display(factor, v), 2);
        let min = observed.iter().copied().reduce(f64::min).map(present);
        let max = observed.iter().copied().reduce(f64::max).map(present);

        let disagreement = match (&sources.secondary, thresholds.get(factor)) {
            (Some(_), Some(bounds)) => {
                let scale = self.config.no_threshold_scales.get(factor);
                FactorDisagreement::from_hours(
                    selected.iter().map(|&i| {
                        flip_probability_for(primary.value(factor, i), sources.secondary_value(factor, i), bounds, scale)
                    }),
                    &self.config.flip_cutoffs,
                )
            }
            _ => None,
        };

        ConditionSummary {
            key: factor,
            label: factor.display_text(),
            ok: !hourly.iter().any(|h| h.fails(factor)),
            min,
            max,
            unit: units.code(factor),
            flip_probability: disagreement.map(|d| round_sig(d.mean_probability, self.config.significant_digits)),
            flip_level: disagreement.map(|d| d.level),
            climatology: climatology.cloned(),
        }
    }

    /// Observed-vs-normal for every factor the normals cover
    fn climatology(
        &self,
        normals: Option<&ClimateNormals>,
        primary: &AlignedSource<'_>,
        selected: &[usize],
        window_times: &[DateTime<Tz>],
        units: &DisplayUnits,
    ) -> BTreeMap<Factor, ClimatologySummary> {
        let Some(normals) = normals else {
            return BTreeMap::new();
        };
        let digits = self.config.significant_digits;

        Factor::ALL
            .into_iter()
            .filter(|f| normals.has(*f))
            .map(|factor| {
                let observed: Vec<f64> = selected.iter().filter_map(|&i| primary.value(factor, i)).collect();
                let mean = (!observed.is_empty())
                    .then(|| observed.iter().sum::<f64>() / observed.len() as f64)
                    .map(|m| units.to_display(factor, m));
                let normal = units.to_display_opt(factor, normals.window_normal(factor, window_times));

                let comparison = compare_to_normal(
                    mean,
                    normal,
                    Descriptors::for_factor(factor),
                    &self.config.climate_cutoffs,
                );
                let summary = ClimatologySummary {
                    mean: mean.map(|v| round_sig(v, digits)),
                    unit: units.code(factor),
                    normal_mean: normal.map(|v| round_sig(v, digits)),
                    pct_of_normal: comparison.pct_of_normal.map(|v| round_sig(v, digits)),
                    fit: comparison.fit,
                    label: comparison.label,
                };
                (factor, summary)
            })
            .collect()
    }
}

fn timestamps(hours: &[HourEvaluation]) -> Vec<DateTime<Tz>> {
    hours.iter().map(|h| h.timestamp).collect()
}
