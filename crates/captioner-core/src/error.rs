//! Error types for Captioner.
//!
//! Errors are organized by stage so that every failure the user sees names
//! the URL or backend involved and what went wrong there.

use thiserror::Error;

/// Top-level error type for Captioner operations.
#[derive(Error, Debug)]
pub enum CaptionerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fetch, decode, model or inference errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-request errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input could not be parsed as an http(s) URL
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The GET request failed (DNS, connect, reset, non-2xx)
    #[error("Fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        status_code: Option<u16>,
    },

    /// Response body exceeds the download limit
    #[error("Response too large: {url} ({size_mb}MB > {max_mb}MB)")]
    ResponseTooLarge {
        url: String,
        size_mb: u64,
        max_mb: u64,
    },

    /// Bytes could not be decoded as an image
    #[error("Decode error for {url}: {message}")]
    Decode { url: String, message: String },

    /// Content is not an image format we can read
    #[error("Unsupported format for {url}: {format}")]
    UnsupportedFormat { url: String, format: String },

    /// Image dimensions exceed limit
    #[error("Image too large: {url} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        url: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {url} after {timeout_ms}ms")]
    Timeout {
        url: String,
        stage: String,
        timeout_ms: u64,
    },

    /// The captioning backend could not be constructed
    #[error("{backend}: {message}")]
    ModelConstruction { backend: String, message: String },

    /// The image array could not be turned into a model payload
    #[error("Preprocessing failed: {0}")]
    Preprocess(String),

    /// The backend call failed or returned nothing usable
    #[error("{message}")]
    Inference {
        message: String,
        status_code: Option<u16>,
    },
}

/// Coarse classification of a [`PipelineError`], matching how the
/// orchestrator reports it to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Anything between the URL and a decoded image
    FetchOrDecode,
    /// Backend construction at first model use
    ModelConstruction,
    /// Preprocessing or the backend call itself
    Inference,
}

impl ErrorKind {
    /// Lead-in shown before the error text for this class.
    pub fn user_prefix(self) -> &'static str {
        match self {
            ErrorKind::FetchOrDecode => "Error processing image URL",
            ErrorKind::ModelConstruction => "Error loading model",
            ErrorKind::Inference => "Error generating caption",
        }
    }
}

impl PipelineError {
    /// Which user-facing error class this belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidUrl { .. }
            | PipelineError::Fetch { .. }
            | PipelineError::ResponseTooLarge { .. }
            | PipelineError::Decode { .. }
            | PipelineError::UnsupportedFormat { .. }
            | PipelineError::ImageTooLarge { .. }
            | PipelineError::Timeout { .. } => ErrorKind::FetchOrDecode,
            PipelineError::ModelConstruction { .. } => ErrorKind::ModelConstruction,
            PipelineError::Preprocess(_) | PipelineError::Inference { .. } => {
                ErrorKind::Inference
            }
        }
    }

    /// The text rendered in the error zone: class prefix plus detail.
    pub fn user_message(&self) -> String {
        format!("{}: {self}", self.kind().user_prefix())
    }
}

/// Convenience type alias for Captioner results.
pub type Result<T> = std::result::Result<T, CaptionerError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
