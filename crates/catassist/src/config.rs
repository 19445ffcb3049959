/// Application configuration loaded from JSON with environment overrides
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::chat::AssistantConfig;
use crate::planner::PlanPolicy;

pub const ENV_BIND: &str = "CATASSIST_BIND";
pub const ENV_DATABASE: &str = "CATASSIST_DATABASE";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_path: PathBuf,
    /// Credit target used when a plan request does not name one
    pub default_target_credits: i32,
    pub log_format: LogFormat,
    pub session_ttl_secs: u64,
    /// Load the demo fixture on startup when the database has no students
    pub seed_if_empty: bool,
    pub planner: PlanPolicy,
    pub assistant: AssistantConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            database_path: PathBuf::from("catassist.db"),
            default_target_credits: 15,
            log_format: LogFormat::Compact,
            session_ttl_secs: 60 * 60,
            seed_if_empty: true,
            planner: PlanPolicy::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads a config file; fields missing from it keep their defaults.
    ///
    /// # Arguments
    /// * `path` - Path to a JSON config file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config file if given, applies the process environment and validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from an environment lookup; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = lookup(ENV_BIND) {
            self.bind_address = bind;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database_path = PathBuf::from(database);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.assistant.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "bind_address",
                message: "must not be empty".to_string(),
            });
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "database_path",
                message: "must not be empty".to_string(),
            });
        }
        if self.default_target_credits <= 0 {
            return Err(ConfigError::Invalid {
                field: "default_target_credits",
                message: format!("must be positive, got {}", self.default_target_credits),
            });
        }
        if !(0.0..=2.0).contains(&self.assistant.temperature) {
            return Err(ConfigError::Invalid {
                field: "assistant.temperature",
                message: format!("must be within 0..=2, got {}", self.assistant.temperature),
            });
        }
        Ok(())
    }
}
