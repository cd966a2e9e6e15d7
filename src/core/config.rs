//! Progression configuration with documented constants
//!
//! Every tunable the engine consumes is collected here. Values are read from
//! a TOML file and handed to the services that need them; nothing reads a
//! global.

use crate::core::error::{ProgressionError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration for the progression engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Directory holding one `<school>.json` perk tree per school
    pub catalog_dir: PathBuf,

    /// Directory the JSON file store writes actor ledgers into
    pub save_dir: PathBuf,

    /// Cost gate for respecs
    pub respec: RespecCosts,

    /// How spell casts turn into school progress
    pub gain: GainConfig,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("data/perk_trees"),
            save_dir: PathBuf::from("saves/progression"),
            respec: RespecCosts::default(),
            gain: GainConfig::default(),
        }
    }
}

/// Cost (in host currency, e.g. experience levels) of a respec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RespecCosts {
    /// Resetting one school
    pub per_school: u32,

    /// Resetting every school at once
    ///
    /// Cheaper than eight single-school respecs so a full reset is never
    /// the worse deal.
    pub all_schools: u32,
}

impl Default for RespecCosts {
    fn default() -> Self {
        Self {
            per_school: 5,
            all_schools: 20,
        }
    }
}

/// Parameters of the mana-to-progress gain curve
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GainConfig {
    /// Percentage progress granted per point of mana spent, before scaling
    pub multiplier: f32,

    /// How fast gain falls off as a school's own progress grows
    pub school_decay_strength: f32,

    /// Floor for the per-school scaling factor
    pub school_minimum_factor: f32,

    /// How fast gain falls off as total points across all schools grow
    pub global_decay_strength: f32,

    /// Floor for the global scaling factor
    pub global_minimum_factor: f32,
}

impl Default for GainConfig {
    fn default() -> Self {
        Self {
            multiplier: 0.001,
            school_decay_strength: 3.0,
            school_minimum_factor: 0.1,
            global_decay_strength: 2.0,
            global_minimum_factor: 0.2,
        }
    }
}

impl ProgressionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ProgressionConfig = toml::from_str(content)?;
        config.validate().map_err(ProgressionError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.respec.all_schools > self.respec.per_school.saturating_mul(8) {
            return Err(format!(
                "respec.all_schools ({}) should not exceed 8 x respec.per_school ({})",
                self.respec.all_schools,
                self.respec.per_school.saturating_mul(8)
            ));
        }

        if self.gain.multiplier < 0.0 {
            return Err("gain.multiplier must not be negative".into());
        }

        for (name, factor) in [
            ("gain.school_minimum_factor", self.gain.school_minimum_factor),
            ("gain.global_minimum_factor", self.gain.global_minimum_factor),
        ] {
            if !(0.0..=1.0).contains(&factor) {
                return Err(format!("{} ({}) must lie in [0, 1]", name, factor));
            }
        }

        if self.gain.school_decay_strength <= 0.0 || self.gain.global_decay_strength <= 0.0 {
            return Err("Decay strengths must be positive".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ProgressionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ProgressionConfig::from_toml_str(
            r#"
            catalog_dir = "trees"

            [respec]
            per_school = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog_dir, PathBuf::from("trees"));
        assert_eq!(config.respec.per_school, 3);
        assert_eq!(config.respec.all_schools, 20);
        assert_eq!(config.gain, GainConfig::default());
    }

    #[test]
    fn test_expensive_full_respec_rejected() {
        let err = ProgressionConfig::from_toml_str(
            r#"
            [respec]
            per_school = 1
            all_schools = 50
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ProgressionError::InvalidConfig(_)));
    }

    #[test]
    fn test_minimum_factor_out_of_range() {
        let mut config = ProgressionConfig::default();
        config.gain.global_minimum_factor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = ProgressionConfig::from_toml_str("respec = [").unwrap_err();
        assert!(matches!(err, ProgressionError::TomlError(_)));
    }
}
