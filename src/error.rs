//! Error types for window evaluation
//!
//! Every error here is a local, pure-computation failure: nothing is transient
//! and nothing is retried. An empty window selection is deliberately *not* an
//! error; it is reported through `EvaluationResult::no_data_for_window`.

use thiserror::Error;

/// Result type for core evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Timestamp matches neither the naive-local nor the UTC-marked pattern.
    /// Indicates upstream data corruption, so it is propagated as-is.
    #[error("malformed timestamp '{raw}' (expected YYYY-MM-DDTHH:MM[:SS] with optional Z or ±HH:MM suffix)")]
    MalformedTimestamp { raw: String },

    /// Window start is not strictly before its end
    #[error("invalid window: start {start} is not before end {end}")]
    InvalidWindow { start: String, end: String },

    /// Extension pad outside `0..=MAX_PAD_HOURS`
    #[error("invalid extension pad of {0} hours (expected 0 to 8784)")]
    InvalidPad(i64),

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    /// A factor column does not line up with the source's timestamps
    #[error("source '{source_name}': {factor} has {actual} values for {expected} timestamps")]
    SeriesLengthMismatch {
        source_name: String,
        factor: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("source '{source_name}': timestamp at index {index} is not after its predecessor")]
    NonIncreasingTimestamps { source_name: String, index: usize },

    #[error("unknown source '{0}'")]
    UnknownSource(String),

    #[error("no weather sources supplied")]
    NoSources,
}
