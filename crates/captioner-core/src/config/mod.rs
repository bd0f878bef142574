//! Configuration management for Captioner.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every field, so an absent or partial file is fine.

mod types;
pub mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Captioner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Captioning model settings
    pub model: ModelConfig,

    /// URL fetch settings
    pub fetch: FetchConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Image display settings
    pub display: DisplayConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Backend connection settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.captioner.captioner/config.toml
    /// - Linux: ~/.config/captioner/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\captioner\config\config.toml
    ///
    /// Falls back to ~/.captioner/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "captioner", "captioner")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = shellexpand::tilde("~").into_owned();
                PathBuf::from(home).join(".captioner").join("config.toml")
            })
    }

    /// Resolved model name: the `[model]` override, else the backend's own default.
    pub fn model_name(&self) -> String {
        if let Some(ref model) = self.model.model {
            return model.clone();
        }
        match self.model.backend.as_str() {
            "anthropic" => self.llm.anthropic.clone().unwrap_or_default().model,
            "openai" => self.llm.openai.clone().unwrap_or_default().model,
            "hyperbolic" => self.llm.hyperbolic.clone().unwrap_or_default().model,
            _ => self.llm.ollama.clone().unwrap_or_default().model,
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
