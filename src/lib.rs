//! Trip Window Suitability Engine
//!
//! Decides whether hourly weather over a trip window meets a traveller's
//! thresholds, using already-fetched series from one or more sources.
//!
//! Layout, leaf to root:
//! - `units`: canonical/presentation unit conversion and rounding
//! - `factor`: the closed set of weather factors
//! - `temporal`: timestamp parsing, zone alignment, half-open windows
//! - `series`: per-source hourly series and the Open-Meteo adapter
//! - `preferences`: typed per-factor thresholds
//! - `suitability/`: evaluation, spans, alternatives, disagreement, climatology
//! - `planner`: the per-request coordinator
//!
//! Everything under the planner is pure: no I/O, no global state.

pub mod config;
pub mod error;
pub mod factor;
pub mod location;
pub mod planner;
pub mod preferences;
pub mod series;
pub mod suitability;
pub mod temporal;
pub mod units;

// Re-export commonly used types
pub use config::EvaluatorConfig;
pub use error::{EvalError, EvalResult};
pub use factor::{Factor, FactorList};
pub use location::{normalize_coords, place_name, Coordinates};
pub use planner::{EvaluationRequest, WindowPlanner, WindowSpec};
pub use preferences::{Bounds, FactorPreference, Preferences, RawPreferences, Thresholds};
pub use series::{AlignedSource, HourValues, HourlySeries, OpenMeteoResponse};
pub use suitability::{
    AltWindow,
    ClimateNormals,
    ConditionSummary,
    Direction,
    EvaluationResult,
    FlipLevel,
    HourEvaluation,
    Span,
    WindowReport,
};
pub use temporal::TimeWindow;
pub use units::DisplayUnits;
