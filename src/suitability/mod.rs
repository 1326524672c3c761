//! Window Suitability Engine
//!
//! Decides whether every hour of a trip window satisfies the user's weather
//! thresholds and annotates the answer with context: where the bad hours are,
//! what nearby windows would work, how much two sources disagree, and how the
//! window compares with climatological normals.
//!
//! ## Architecture
//! - `evaluator.rs` - Per-hour threshold checks + the single range evaluator
//! - `spans.rs` - Contiguous-run grouping of per-hour predicates
//! - `alternatives.rs` - Nearest equal-length all-pass windows
//! - `disagreement.rs` - Two-source flip probability
//! - `climatology.rs` - Observed mean vs month/hour normals
//! - `assessment.rs` - Output structs

pub mod evaluator;
pub mod spans;
pub mod alternatives;
pub mod disagreement;
pub mod climatology;
pub mod assessment;

// Re-export public API
pub use evaluator::{evaluate_hour, evaluate_range, HourEvaluation, HourVerdict, Reason};
pub use spans::{group, group_by, Span};
pub use alternatives::{find_alternatives, AltWindow, Direction, SearchBoundary};
pub use disagreement::{
    flip_probability,
    FactorDisagreement,
    FlipCutoffs,
    FlipLevel,
    NoThresholdScales,
};
pub use climatology::{compare_to_normal, ClimateComparison, ClimateCutoffs, ClimateNormals, Descriptors, NormalFit};
pub use assessment::{ClimatologySummary, ConditionSummary, EvaluationResult, WindowReport};
