//! Captioning model access.
//!
//! A backend abstraction over vision-capable APIs, one shared HTTP client
//! with a small wire dialect per API (Ollama, Anthropic, and Chat Completions
//! for OpenAI and Hyperbolic), and the process-wide provider that constructs
//! the configured backend once and caches the result.

pub(crate) mod anthropic;
pub mod backend;
pub(crate) mod http;
pub(crate) mod ollama;
pub(crate) mod openai;
pub mod provider;
pub(crate) mod tidy;

pub use backend::{BackendFactory, CaptionBackend, CaptionRequest, CaptionResponse, ImageInput};
pub use provider::{ModelAvailability, ModelHandle, ModelProvider, ModelSlot};
