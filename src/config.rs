//! Configuration types for the fanout host.
//!
//! [`HostConfig`] is loaded from an optional TOML file named by
//! `FANOUT_CONFIG`, then provider credentials are overlaid from the
//! environment. Missing fields fall back to defaults, so an empty file and
//! no file at all are both valid.

use std::path::{Path, PathBuf};

use fanout_search::SearchConfig;
use fanout_search::config::{BingCredentials, GoogleCredentials};
use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};
use crate::tools::DEFAULT_MAX_BYTES;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "FANOUT_CONFIG";
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_SEARCH_API_KEY";
pub const GOOGLE_ENGINE_ID_ENV: &str = "GOOGLE_SEARCH_ENGINE_ID";
pub const BING_API_KEY_ENV: &str = "BING_SEARCH_API_KEY";

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Providers, fallback order, rate limits and timeouts.
    pub search: SearchConfig,
    /// Tool output and deadline settings.
    pub tools: ToolSettings,
}

/// Tool-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Tool output is truncated beyond this many bytes.
    pub max_output_bytes: usize,
    /// Overall time budget for one `research_topic` call.
    pub research_deadline_seconds: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            max_output_bytes: DEFAULT_MAX_BYTES,
            research_deadline_seconds: 60,
        }
    }
}

impl HostConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| HostError::Config(e.to_string()))
    }

    /// Load from `FANOUT_CONFIG` (if set) and overlay credentials from the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the named file cannot be read or parsed, or the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config file");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay provider credentials from `lookup`.
    ///
    /// Blank values count as absent. Google needs both the key and the engine
    /// id; a lone half leaves the file's credentials untouched.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        match (get(GOOGLE_API_KEY_ENV), get(GOOGLE_ENGINE_ID_ENV)) {
            (Some(api_key), Some(engine_id)) => {
                self.search.google.credentials = Some(GoogleCredentials { api_key, engine_id });
            }
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!(
                    "only one of {GOOGLE_API_KEY_ENV} and {GOOGLE_ENGINE_ID_ENV} is set; ignoring"
                );
            }
            (None, None) => {}
        }

        if let Some(api_key) = get(BING_API_KEY_ENV) {
            self.search.bing.credentials = Some(BingCredentials { api_key });
        }
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Config`] for an invalid search section, a zero
    /// output bound or a zero research deadline.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.tools.max_output_bytes == 0 {
            return Err(HostError::Config(
                "tools.max_output_bytes must be greater than 0".into(),
            ));
        }
        if self.tools.research_deadline_seconds == 0 {
            return Err(HostError::Config(
                "tools.research_deadline_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
