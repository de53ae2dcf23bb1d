//! Planner tuning knobs
//!
//! ```toml
//! leaf_cutoff = 64
//! bucket_size = 32
//! heuristic_inflation = 1.00000095367431640625
//! ```

use std::path::Path;

use butterfly_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Build and search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlannerConfig {
    /// Corner count below which a BSP node becomes an all-pairs leaf
    #[serde(default = "default_leaf_cutoff")]
    pub leaf_cutoff: usize,
    /// Minimum events per bucket before the current row is closed
    #[serde(default = "default_bucket_size")]
    pub bucket_size: usize,
    /// Multiplier on the A* heuristic (1.0 = exact A*)
    #[serde(default = "default_heuristic_inflation")]
    pub heuristic_inflation: f64,
}

fn default_leaf_cutoff() -> usize {
    64
}

fn default_bucket_size() -> usize {
    32
}

fn default_heuristic_inflation() -> f64 {
    1.0 + 1.0 / (1u64 << 20) as f64
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            leaf_cutoff: default_leaf_cutoff(),
            bucket_size: default_bucket_size(),
            heuristic_inflation: default_heuristic_inflation(),
        }
    }
}

impl PlannerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket_size == 0 {
            return Err(Error::InvalidConfig(
                "bucket_size must be at least 1".to_string(),
            ));
        }
        if !self.heuristic_inflation.is_finite() || self.heuristic_inflation < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "heuristic_inflation must be finite and >= 1, got {}",
                self.heuristic_inflation
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.leaf_cutoff, 64);
        assert_eq!(config.bucket_size, 32);
        assert_eq!(config.heuristic_inflation, 1.0000009536743164);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PlannerConfig::from_toml_str("leaf_cutoff = 8\n").unwrap();
        assert_eq!(config.leaf_cutoff, 8);
        assert_eq!(config.bucket_size, 32);

        let empty = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(empty, PlannerConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = PlannerConfig::from_toml_str("bucket_size = 0").unwrap_err();
        assert!(err.to_string().contains("bucket_size"), "got: {err}");

        let err = PlannerConfig::from_toml_str("heuristic_inflation = 0.5").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let config = PlannerConfig {
            heuristic_inflation: f64::NAN,
            ..PlannerConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(PlannerConfig::from_toml_str("leaf_cutof = 3").is_err());
        assert!(PlannerConfig::from_toml_str("leaf_cutoff = \"many\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PlannerConfig {
            leaf_cutoff: 4,
            bucket_size: 2,
            heuristic_inflation: 1.0,
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(PlannerConfig::from_toml_str(&text).unwrap(), config);
    }
}
