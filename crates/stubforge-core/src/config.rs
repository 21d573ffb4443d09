//! Engine configuration, loadable from YAML or JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::synthesizer::DEFAULT_PLACEHOLDER_EMAIL;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Settings for a `GenerationEngine`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the engine's random source. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Address produced for `format: email` strings
    pub placeholder_email: String,

    /// Options substituted into eval items that have fewer than two
    pub fallback_options: [String; 2],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            placeholder_email: DEFAULT_PLACEHOLDER_EMAIL.to_string(),
            fallback_options: ["Option A".to_string(), "Option B".to_string()],
        }
    }
}

impl EngineConfig {
    /// A default config with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Parse a config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, treating `.json` files as JSON and anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let email = &self.placeholder_email;
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(ConfigError::ValidationError(format!(
                "placeholder_email is not an address: {:?}",
                email
            )));
        }

        if self.fallback_options.iter().any(|o| o.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "fallback_options must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = EngineConfig::from_yaml("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.fallback_options[0], "Option A");
    }

    #[test]
    fn test_parse_yaml() {
        let config = EngineConfig::from_yaml(
            r#"
seed: 42
placeholder_email: "qa@school.test"
fallback_options: ["True", "False"]
"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.placeholder_email, "qa@school.test");
        assert_eq!(config.fallback_options[1], "False");
    }

    #[test]
    fn test_parse_json() {
        let config = EngineConfig::from_json(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config, EngineConfig::seeded(7));
    }

    #[test]
    fn test_bad_email_rejected() {
        let result = EngineConfig::from_yaml("placeholder_email: nobody");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_blank_fallback_rejected() {
        let result = EngineConfig::from_json(r#"{"fallback_options": ["A", " "]}"#);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = EngineConfig::from_file("/nonexistent/stubforge.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
