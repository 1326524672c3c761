//! Evaluator Configuration
//!
//! Tunables for the window planner. Every field has a default, so a config
//! file only needs the values it overrides.

use crate::suitability::{ClimateCutoffs, FlipCutoffs, NoThresholdScales};
use crate::temporal::{DEFAULT_PAD_HOURS, MAX_PAD_HOURS};
use crate::units::DEFAULT_SIG_DIGITS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable naming an optional config file
pub const CONFIG_ENV_VAR: &str = "EVALUATOR_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Hours added either side of the window for spans and alternatives
    pub extension_pad_hours: i64,

    /// Difference scales for factors without bounds
    pub no_threshold_scales: NoThresholdScales,

    pub flip_cutoffs: FlipCutoffs,

    pub climate_cutoffs: ClimateCutoffs,

    /// Significant digits for presented means
    pub significant_digits: u32,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            extension_pad_hours: DEFAULT_PAD_HOURS,
            no_threshold_scales: NoThresholdScales::default(),
            flip_cutoffs: FlipCutoffs::default(),
            climate_cutoffs: ClimateCutoffs::default(),
            significant_digits: DEFAULT_SIG_DIGITS,
        }
    }
}

impl EvaluatorConfig {
    /// Load config from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read evaluator config: {:?}", path))?;

        let config: EvaluatorConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse evaluator config JSON")?;

        if !(0..=MAX_PAD_HOURS).contains(&config.extension_pad_hours) {
            anyhow::bail!(
                "extension_pad_hours must be within 0..={} (got {})",
                MAX_PAD_HOURS,
                config.extension_pad_hours
            );
        }
        if config.flip_cutoffs.low > config.flip_cutoffs.medium {
            anyhow::bail!("flip_cutoffs.low must not exceed flip_cutoffs.medium");
        }

        Ok(config)
    }

    /// Config from `EVALUATOR_CONFIG`, defaults when unset
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("trip_window_{}_{}.json", name, std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = EvaluatorConfig::default();
        assert_eq!(config.extension_pad_hours, 6);
        assert_eq!(config.significant_digits, 4);
        assert_eq!(config.no_threshold_scales.temperature, 0.25);
        assert_eq!(config.flip_cutoffs.medium, 0.7);
        assert_eq!(config.climate_cutoffs.above_pct, 110.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = write_temp("partial", r#"{"extension_pad_hours": 12, "no_threshold_scales": {"humidity": 0.05}}"#);
        let config = EvaluatorConfig::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.extension_pad_hours, 12);
        assert_eq!(config.no_threshold_scales.humidity, 0.05);
        assert_eq!(config.no_threshold_scales.wind, 0.25);
        assert_eq!(config.flip_cutoffs, FlipCutoffs::default());
    }

    #[test]
    fn test_rejects_negative_pad() {
        let path = write_temp("negative", r#"{"extension_pad_hours": -1}"#);
        let err = EvaluatorConfig::load(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(err.to_string().contains("extension_pad_hours"));
    }

    #[test]
    fn test_rejects_oversized_pad() {
        let path = write_temp("oversized", r#"{"extension_pad_hours": 10000000000}"#);
        let err = EvaluatorConfig::load(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(err.to_string().contains("extension_pad_hours"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = EvaluatorConfig::load(Path::new("/nonexistent/evaluator.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read evaluator config"));
    }
}
