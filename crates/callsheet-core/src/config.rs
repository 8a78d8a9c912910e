//! Engine configuration.
//!
//! Defaults reproduce the classic behavior: a floor of five agents named
//! "Agent 1".."Agent 5", and each upload replacing the stored contact set.
//!
//! Environment overrides:
//! - `CALLSHEET_MIN_AGENTS` (positive integer)
//! - `CALLSHEET_AGENT_PREFIX` (non-blank text)
//! - `CALLSHEET_UPLOAD_MODE` (`replace` | `append`)

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agent_pool::{DEFAULT_MIN_AGENTS, DEFAULT_PLACEHOLDER_PREFIX};

/// Errors in configuration values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: expected a positive integer, got {value:?}")]
    InvalidMinAgents { var: String, value: String },

    #[error("{var}: placeholder prefix must not be blank")]
    BlankPrefix { var: String },

    #[error("{var}: expected \"replace\" or \"append\", got {value:?}")]
    InvalidUploadMode { var: String, value: String },
}

/// What an upload does with contacts already in storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    /// The new batch becomes the entire contact set.
    #[default]
    Replace,
    /// The new batch is added after existing contacts.
    Append,
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(UploadMode::Replace),
            "append" => Ok(UploadMode::Append),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadMode::Replace => f.write_str("replace"),
            UploadMode::Append => f.write_str("append"),
        }
    }
}

/// Tunables for [`crate::DistributionService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pool floor enforced at upload time (at least 1)
    pub min_agents: usize,
    /// Display-name prefix for synthetic agents
    pub placeholder_prefix: String,
    pub upload_mode: UploadMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_agents: DEFAULT_MIN_AGENTS,
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
            upload_mode: UploadMode::Replace,
        }
    }
}

impl EngineConfig {
    pub fn with_min_agents(mut self, min_agents: usize) -> Self {
        self.min_agents = min_agents;
        self
    }

    pub fn with_placeholder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.placeholder_prefix = prefix.into();
        self
    }

    pub fn with_upload_mode(mut self, mode: UploadMode) -> Self {
        self.upload_mode = mode;
        self
    }

    /// Defaults overlaid with any `CALLSHEET_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`EngineConfig::from_env`] but reading from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("CALLSHEET_MIN_AGENTS") {
            config.min_agents = parse_min_agents("CALLSHEET_MIN_AGENTS", &value)?;
        }
        if let Some(value) = lookup("CALLSHEET_AGENT_PREFIX") {
            config.placeholder_prefix = parse_prefix("CALLSHEET_AGENT_PREFIX", &value)?;
        }
        if let Some(value) = lookup("CALLSHEET_UPLOAD_MODE") {
            config.upload_mode = value.parse().map_err(|value| ConfigError::InvalidUploadMode {
                var: "CALLSHEET_UPLOAD_MODE".to_string(),
                value,
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject a zero floor or a blank prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_agents == 0 {
            return Err(ConfigError::InvalidMinAgents {
                var: "min_agents".to_string(),
                value: "0".to_string(),
            });
        }
        if self.placeholder_prefix.trim().is_empty() {
            return Err(ConfigError::BlankPrefix {
                var: "placeholder_prefix".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_min_agents(var: &str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidMinAgents {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_prefix(var: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::BlankPrefix {
            var: var.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.min_agents, 5);
        assert_eq!(config.placeholder_prefix, "Agent");
        assert_eq!(config.upload_mode, UploadMode::Replace);
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("CALLSHEET_MIN_AGENTS", "3"),
            ("CALLSHEET_AGENT_PREFIX", " Rep "),
            ("CALLSHEET_UPLOAD_MODE", "Append"),
        ]))
        .unwrap();
        assert_eq!(config.min_agents, 3);
        assert_eq!(config.placeholder_prefix, "Rep");
        assert_eq!(config.upload_mode, UploadMode::Append);
    }

    #[test]
    fn test_zero_or_garbage_floor_rejected() {
        for bad in ["0", "-2", "five"] {
            let err =
                EngineConfig::from_lookup(lookup(&[("CALLSHEET_MIN_AGENTS", bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidMinAgents { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_bad_upload_mode_rejected() {
        let err =
            EngineConfig::from_lookup(lookup(&[("CALLSHEET_UPLOAD_MODE", "merge")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidUploadMode {
                var: "CALLSHEET_UPLOAD_MODE".to_string(),
                value: "merge".to_string()
            }
        );
    }

    #[test]
    fn test_validate_catches_builder_misuse() {
        assert!(EngineConfig::default().with_min_agents(0).validate().is_err());
        assert!(EngineConfig::default()
            .with_placeholder_prefix("  ")
            .validate()
            .is_err());
    }
}
