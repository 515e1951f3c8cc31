//! Inspection configuration
//!
//! Values come from defaults, then an optional TOML file, then environment
//! variables named `<PREFIX>_<GROUP>_<KEY>` (e.g. `PATCHECK_PATTERNS_PATH`).

use crate::Result;
use anyhow::{anyhow, Context};
use patcheck_core::result::MIN_SLOTS_FOR_DECISION;
use patcheck_core::BoxFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_ENV_PREFIX: &str = "PATCHECK";

/// Main inspection configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    pub patterns: PatternsConfig,
    pub matching: MatchingConfig,
    pub logging: LoggingConfig,
}

/// Where pattern libraries live and which one is used by default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Pattern file or directory of pattern files
    pub path: Option<PathBuf>,
    /// Library key used when a request names none
    pub default_key: Option<String>,
}

/// Matching behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub box_format: BoxFormat,
    pub min_slots_for_decision: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            box_format: BoxFormat::Auto,
            min_slots_for_decision: MIN_SLOTS_FOR_DECISION,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl InspectionConfig {
    /// Defaults, overlaid with `path` if given and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(DEFAULT_ENV_PREFIX, std::env::vars())?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }

    /// Override fields from `<prefix>_*` variables. Unknown names are ignored.
    pub fn apply_env<I, K, V>(&mut self, prefix: &str, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let prefix = format!("{}_", prefix.to_ascii_uppercase());

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(&prefix) else {
                continue;
            };
            let value = value.as_ref().trim();

            match name {
                "PATTERNS_PATH" => self.patterns.path = non_empty(value).map(PathBuf::from),
                "PATTERNS_DEFAULT_KEY" => {
                    self.patterns.default_key = non_empty(value).map(str::to_string)
                }
                "MATCHING_BOX_FORMAT" => {
                    self.matching.box_format = value
                        .parse()
                        .map_err(|e: String| anyhow!(e))
                        .with_context(|| format!("Invalid {}", key.as_ref()))?
                }
                "MATCHING_MIN_SLOTS_FOR_DECISION" => {
                    self.matching.min_slots_for_decision = value
                        .parse()
                        .with_context(|| format!("Invalid {}: '{}'", key.as_ref(), value))?
                }
                "LOGGING_LEVEL" => self.logging.level = value.to_string(),
                _ => debug!("Ignoring unknown setting {}", key.as_ref()),
            }
        }

        Ok(())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InspectionConfig::default();
        assert_eq!(config.matching.box_format, BoxFormat::Auto);
        assert_eq!(config.matching.min_slots_for_decision, 2);
        assert_eq!(config.logging.level, "info");
        assert!(config.patterns.path.is_none());
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("patcheck.toml");
        std::fs::write(
            &path,
            r#"
[patterns]
path = "patterns"
default_key = "rotor"

[matching]
box_format = "xyxy"
"#,
        )?;

        let config = InspectionConfig::from_file(&path)?;
        assert_eq!(config.patterns.path, Some(PathBuf::from("patterns")));
        assert_eq!(config.patterns.default_key.as_deref(), Some("rotor"));
        assert_eq!(config.matching.box_format, BoxFormat::Xyxy);
        assert_eq!(config.matching.min_slots_for_decision, 2);
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut config = InspectionConfig::default();
        config.apply_env(
            "patcheck",
            vec![
                ("PATCHECK_PATTERNS_PATH", "/srv/patterns"),
                ("PATCHECK_PATTERNS_DEFAULT_KEY", "stator"),
                ("PATCHECK_MATCHING_BOX_FORMAT", "XYWH"),
                ("PATCHECK_MATCHING_MIN_SLOTS_FOR_DECISION", "3"),
                ("PATCHECK_LOGGING_LEVEL", "debug"),
                ("OTHER_PATTERNS_PATH", "/ignored"),
            ],
        )?;

        assert_eq!(config.patterns.path, Some(PathBuf::from("/srv/patterns")));
        assert_eq!(config.patterns.default_key.as_deref(), Some("stator"));
        assert_eq!(config.matching.box_format, BoxFormat::Xywh);
        assert_eq!(config.matching.min_slots_for_decision, 3);
        assert_eq!(config.logging.level, "debug");
        Ok(())
    }

    #[test]
    fn test_empty_env_value_clears_default_key() -> Result<()> {
        let mut config = InspectionConfig::default();
        config.patterns.default_key = Some("rotor".to_string());
        config.apply_env("PATCHECK", [("PATCHECK_PATTERNS_DEFAULT_KEY", "")])?;
        assert!(config.patterns.default_key.is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = InspectionConfig::default();
        let err = config
            .apply_env("PATCHECK", [("PATCHECK_MATCHING_BOX_FORMAT", "corners")])
            .unwrap_err();
        assert!(format!("{err:#}").contains("PATCHECK_MATCHING_BOX_FORMAT"));
    }
}
