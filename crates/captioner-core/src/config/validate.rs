//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

/// Backends the factory knows how to build.
pub const KNOWN_BACKENDS: &[&str] = &["ollama", "anthropic", "openai", "hyperbolic"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !KNOWN_BACKENDS.contains(&self.model.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "model.backend must be one of {}, got '{}'",
                KNOWN_BACKENDS.join(", "),
                self.model.backend
            )));
        }
        if self.model.max_edge == 0 {
            return Err(ConfigError::ValidationError(
                "model.max_edge must be > 0".into(),
            ));
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "model.max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.fetch.max_download_mb == 0 {
            return Err(ConfigError::ValidationError(
                "fetch.max_download_mb must be > 0".into(),
            ));
        }
        if self.fetch.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "fetch.timeout_ms must be > 0 when set".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.display.thumbnail_size == 0 {
            return Err(ConfigError::ValidationError(
                "display.thumbnail_size must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_backend() {
        let mut config = Config::default();
        config.model.backend = "gemini".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model.backend"));
    }

    #[test]
    fn test_validate_rejects_zero_max_edge() {
        let mut config = Config::default();
        config.model.max_edge = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_edge"));
    }

    #[test]
    fn test_validate_rejects_zero_fetch_timeout() {
        let mut config = Config::default();
        config.fetch.timeout_ms = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fetch.timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_zero_decode_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.model.temperature = 3.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));

        config.model.temperature = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }
}
