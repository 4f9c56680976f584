//! Engine configuration.
//!
//! Every section has working defaults, so a config file only needs to name
//! what it changes:
//!
//! ```json
//! {
//!   "assembler": { "anchor_count": 5, "per_anchor": 10 },
//!   "similarity": { "actor_weight": 3.0 }
//! }
//! ```

use anyhow::{Context, Result};
use scoring::{ConfigError, QueryProfileConfig, SimilarityConfig, TasteConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Knobs for the anchor-based pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblerConfig {
    /// Number of groups wanted (K)
    pub anchor_count: usize,
    /// Candidates kept per anchor (M)
    pub per_anchor: usize,
    /// A candidate may appear under at most one anchor
    pub single_appearance: bool,
    /// Candidates must score strictly above this to be kept
    pub relevance_floor: f64,
    /// Overrides the default attempt bound of `2 * |watched|`
    pub max_attempts: Option<usize>,
    /// Wall-clock budget for the whole pass
    pub time_budget_ms: Option<u64>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            anchor_count: 10,
            per_anchor: 7,
            single_appearance: true,
            relevance_floor: 15.0,
            max_attempts: None,
            time_budget_ms: None,
        }
    }
}

impl AssemblerConfig {
    pub fn with_counts(mut self, anchor_count: usize, per_anchor: usize) -> Self {
        self.anchor_count = anchor_count;
        self.per_anchor = per_anchor;
        self
    }

    pub fn with_single_appearance(mut self, enabled: bool) -> Self {
        self.single_appearance = enabled;
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn with_time_budget_ms(mut self, budget: u64) -> Self {
        self.time_budget_ms = Some(budget);
        self
    }

    pub fn validate(&self) -> scoring::Result<()> {
        if self.anchor_count == 0 {
            return Err(out_of_range("anchor_count", "must be at least 1"));
        }
        if self.per_anchor == 0 {
            return Err(out_of_range("per_anchor", "must be at least 1"));
        }
        if !self.relevance_floor.is_finite() || !(0.0..100.0).contains(&self.relevance_floor) {
            return Err(out_of_range(
                "relevance_floor",
                &format!("must be in [0, 100) (got {})", self.relevance_floor),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(out_of_range("max_attempts", "must be at least 1 when set"));
        }
        if self.time_budget_ms == Some(0) {
            return Err(out_of_range("time_budget_ms", "must be at least 1 when set"));
        }
        Ok(())
    }
}

/// Knobs for the taste-based mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TasteModeConfig {
    /// Number of items returned
    pub limit: usize,
    /// Narrow through the query evaluator before ranking
    pub strict: bool,
}

impl Default for TasteModeConfig {
    fn default() -> Self {
        Self {
            limit: 6,
            strict: false,
        }
    }
}

impl TasteModeConfig {
    pub fn validate(&self) -> scoring::Result<()> {
        if self.limit == 0 {
            return Err(out_of_range("limit", "must be at least 1"));
        }
        Ok(())
    }
}

/// All engine settings, as read from a JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub similarity: SimilarityConfig,
    pub assembler: AssemblerConfig,
    pub taste: TasteConfig,
    pub taste_mode: TasteModeConfig,
    pub query_profile: QueryProfileConfig,
}

impl EngineConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> scoring::Result<()> {
        self.similarity.validate()?;
        self.assembler.validate()?;
        self.taste.validate()?;
        self.taste_mode.validate()?;
        self.query_profile.validate()
    }
}

fn out_of_range(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        name,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.assembler.anchor_count, 10);
        assert_eq!(config.assembler.per_anchor, 7);
        assert!(config.assembler.single_appearance);
        assert_eq!(config.assembler.relevance_floor, 15.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let json = r#"{ "assembler": { "per_anchor": 3 }, "taste_mode": { "strict": true } }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.assembler.per_anchor, 3);
        assert_eq!(config.assembler.anchor_count, 10);
        assert!(config.taste_mode.strict);
        assert_eq!(config.similarity, SimilarityConfig::default());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{ "assembler": { "anchors": 3 } }"#;
        assert!(serde_json::from_str::<EngineConfig>(json).is_err());
    }

    #[test]
    fn test_invalid_assembler_config() {
        assert!(AssemblerConfig::default().with_counts(0, 7).validate().is_err());
        assert!(AssemblerConfig::default().with_max_attempts(0).validate().is_err());
        let config = AssemblerConfig {
            relevance_floor: 100.0,
            ..AssemblerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("engine-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "assembler": { "anchor_count": 4 } }"#).unwrap();
        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.assembler.anchor_count, 4);

        fs::write(&path, r#"{ "assembler": { "anchor_count": 0 } }"#).unwrap();
        assert!(EngineConfig::from_file(&path).is_err());
        fs::remove_file(&path).unwrap();

        assert!(EngineConfig::from_file(&path).is_err());
    }
}
