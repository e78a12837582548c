//! Client configuration.
//!
//! Loaded from a TOML file, from the environment, or both (environment
//! values override the file).

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Settings for talking to the backend order service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend API, e.g. `https://api.example.com/api/v1`.
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Path of an endpoint serving the backend transition table. When unset
    /// the builtin table is used.
    #[serde(default)]
    pub transitions_path: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_token: None,
            transitions_path: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load from a TOML file, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = content.parse()?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load entirely from `ORDER_API_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("ORDER_API_BASE_URL").ok_or(ConfigError::Missing("ORDER_API_BASE_URL"))?;
        let mut config = Self::new(base_url);
        config.apply_env_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `ORDER_API_*` variables found by `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(base_url) = lookup("ORDER_API_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(timeout) = lookup("ORDER_API_TIMEOUT_SECS") {
            self.timeout_secs = timeout.trim().parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "ORDER_API_TIMEOUT_SECS must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
        }
        if let Some(token) = lookup("ORDER_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(path) = lookup("ORDER_API_TRANSITIONS_PATH") {
            self.transitions_path = Some(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            ConfigError::Validation(format!("base_url '{}' is not a valid URL: {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        if let Some(path) = &self.transitions_path {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "transitions_path must start with '/', got '{path}'"
                )));
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for ClientConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}
