//! Grading thresholds

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::ConfigError;

/// Default similarity a word pair needs to count as a fuzzy match.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;
/// Default share of expected keywords a short answer must hit.
pub const DEFAULT_MIN_MATCH_RATIO: f64 = 0.5;
/// Default share of correct answers for a section quiz to count as mastered.
pub const DEFAULT_PASS_RATIO: f64 = 0.7;

/// Thresholds used by the short-answer validator and quiz scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub similarity_threshold: f64,
    pub min_match_ratio: f64,
    pub pass_ratio: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_match_ratio: DEFAULT_MIN_MATCH_RATIO,
            pass_ratio: DEFAULT_PASS_RATIO,
        }
    }
}

impl MatchConfig {
    /// Build a config from the defaults, overridden by `PANDORA_SIMILARITY_THRESHOLD`,
    /// `PANDORA_MIN_MATCH_RATIO` and `PANDORA_PASS_RATIO` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            similarity_threshold: ratio_var(
                "PANDORA_SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            )?,
            min_match_ratio: ratio_var("PANDORA_MIN_MATCH_RATIO", defaults.min_match_ratio)?,
            pass_ratio: ratio_var("PANDORA_PASS_RATIO", defaults.pass_ratio)?,
        })
    }
}

fn ratio_var(var: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(var) {
        Ok(raw) => parse_ratio(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_ratio(var: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange { var, value });
    }
    Ok(value)
}

// ============= Python Binding =============

/// Config for the Python entry points, read from the environment on first use.
#[cfg(feature = "python")]
pub(crate) fn py_match_config() -> pyo3::PyResult<MatchConfig> {
    static CONFIG: std::sync::LazyLock<Result<MatchConfig, ConfigError>> =
        std::sync::LazyLock::new(MatchConfig::from_env);
    CONFIG
        .clone()
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = MatchConfig::default();
        assert_eq!(config.similarity_threshold, 0.75);
        assert_eq!(config.min_match_ratio, 0.5);
        assert_eq!(config.pass_ratio, 0.7);
    }

    #[test]
    fn parse_ratio_accepts_values_in_range() {
        assert_eq!(parse_ratio("X", " 0.6 "), Ok(0.6));
        assert_eq!(parse_ratio("X", "1"), Ok(1.0));
    }

    #[test]
    fn parse_ratio_rejects_garbage_and_out_of_range() {
        assert_eq!(
            parse_ratio("X", "abc"),
            Err(ConfigError::InvalidValue {
                var: "X",
                value: "abc".to_string()
            })
        );
        assert_eq!(
            parse_ratio("X", "1.5"),
            Err(ConfigError::OutOfRange { var: "X", value: 1.5 })
        );
    }

    // Sole test touching PANDORA_* variables
    #[test]
    fn from_env_overrides_and_validates() {
        env::remove_var("PANDORA_SIMILARITY_THRESHOLD");
        env::set_var("PANDORA_MIN_MATCH_RATIO", "0.8");
        env::set_var("PANDORA_PASS_RATIO", " 0.9 ");

        let config = MatchConfig::from_env().unwrap();
        assert_eq!(config.min_match_ratio, 0.8);
        assert_eq!(config.pass_ratio, 0.9);
        assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);

        env::set_var("PANDORA_PASS_RATIO", "1.5");
        assert_eq!(
            MatchConfig::from_env(),
            Err(ConfigError::OutOfRange {
                var: "PANDORA_PASS_RATIO",
                value: 1.5
            })
        );

        env::remove_var("PANDORA_MIN_MATCH_RATIO");
        env::remove_var("PANDORA_PASS_RATIO");
        assert_eq!(MatchConfig::from_env(), Ok(MatchConfig::default()));
    }

    #[test]
    fn partial_json_config_keeps_other_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{"min_match_ratio": 0.8}"#).unwrap();
        assert_eq!(config.min_match_ratio, 0.8);
        assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD);
    }
}
