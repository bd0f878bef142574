//! Captioning backend trait and request/response types.
//!
//! Defines the interface every captioning backend implements, plus the
//! factory that builds the configured backend.

use super::anthropic::Anthropic;
use super::http::HttpBackend;
use super::ollama::Ollama;
use super::openai::ChatCompletions;
use crate::config::{LlmConfig, ModelConfig};
use crate::error::PipelineError;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to a backend API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A request to caption one image.
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    /// The image to caption
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl CaptionRequest {
    /// Build a caption request using the prompt and sampling settings from config.
    pub fn new(image: ImageInput, config: &ModelConfig) -> Self {
        Self {
            image,
            prompt: config.prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// The response from a backend call.
#[derive(Debug, Clone)]
pub struct CaptionResponse {
    /// Generated caption text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all captioning backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn CaptionBackend>` for dynamic dispatch).
#[async_trait]
pub trait CaptionBackend: Send + Sync {
    /// Backend name for logging (e.g., "anthropic", "ollama").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Check whether the backend is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Generate a caption for the given request.
    ///
    /// The returned text is already cleaned up and never empty.
    async fn generate(&self, request: &CaptionRequest) -> Result<CaptionResponse, PipelineError>;

    /// Per-request timeout for this backend.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the configured backend.
pub struct BackendFactory;

impl BackendFactory {
    /// Create a captioning backend by name.
    ///
    /// # Arguments
    /// * `backend` - Backend identifier ("ollama", "anthropic", "openai", "hyperbolic")
    /// * `config` - The backend connection settings
    /// * `model_override` - Optional model name that overrides the backend default
    pub fn create(
        backend: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
    ) -> Result<Box<dyn CaptionBackend>, PipelineError> {
        let missing_key = |env_var: &str| PipelineError::ModelConstruction {
            backend: backend.to_string(),
            message: format!("API key not set. Set {env_var} env var."),
        };

        match backend {
            "ollama" => {
                let cfg = config.ollama.clone().unwrap_or_default();
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(HttpBackend::new(Ollama::new(&cfg.endpoint), &model)))
            }
            "anthropic" => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key =
                    resolve_env_var(&cfg.api_key).ok_or_else(|| missing_key("ANTHROPIC_API_KEY"))?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(HttpBackend::new(Anthropic::new(&api_key), &model)))
            }
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key =
                    resolve_env_var(&cfg.api_key).ok_or_else(|| missing_key("OPENAI_API_KEY"))?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(HttpBackend::new(
                    ChatCompletions::openai(&api_key),
                    &model,
                )))
            }
            "hyperbolic" => {
                let cfg = config.hyperbolic.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key)
                    .ok_or_else(|| missing_key("HYPERBOLIC_API_KEY"))?;
                let model = model_override.map(String::from).unwrap_or(cfg.model);
                Ok(Box::new(HttpBackend::new(
                    ChatCompletions::hyperbolic(&cfg.endpoint, &api_key),
                    &model,
                )))
            }
            other => Err(PipelineError::ModelConstruction {
                backend: other.to_string(),
                message: "unknown captioning backend".to_string(),
            }),
        }
    }
}
