use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid matcher config: {0}")]
    Invalid(String),
}

/// Immutable settings handed to the matcher at construction.
///
/// Every field has a documented default, so a TOML file only needs to name the
/// values it changes:
///
/// ```toml
/// ngram_weight = 0.6
/// prefix_weight = 0.2
/// edit_weight = 0.2
/// top_n = 5
/// ```
///
/// The weights are expected to sum to 1.0 but this is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub ngram_weight: f64,
    pub prefix_weight: f64,
    pub edit_weight: f64,
    pub ngram_size: usize,
    pub top_n: usize,
    pub threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            ngram_weight: 0.5,
            prefix_weight: 0.3,
            edit_weight: 0.2,
            ngram_size: 2,
            top_n: 3,
            threshold: 0.0,
        }
    }
}

impl MatcherConfig {
    pub fn with_weights(ngram_weight: f64, prefix_weight: f64, edit_weight: f64) -> Self {
        Self {
            ngram_weight,
            prefix_weight,
            edit_weight,
            ..Self::default()
        }
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: MatcherConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that cannot produce a meaningful ranking.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ngram_size == 0 {
            return Err(ConfigError::Invalid("ngram_size must be at least 1".into()));
        }
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be at least 1".into()));
        }
        let numbers = [
            ("ngram_weight", self.ngram_weight),
            ("prefix_weight", self.prefix_weight),
            ("edit_weight", self.edit_weight),
            ("threshold", self.threshold),
        ];
        if let Some((field, _)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{field} must be a finite number")));
        }
        Ok(())
    }

    pub fn weight_sum(&self) -> f64 {
        self.ngram_weight + self.prefix_weight + self.edit_weight
    }
}
