//! Captioner Core - fetch an image URL, show it, caption it.
//!
//! # Architecture
//!
//! One linear flow per submitted URL:
//!
//! ```text
//! URL → Fetch → Decode → Display → Array → Caption (model) → Display
//! ```
//!
//! The captioning model is constructed once per process by a
//! [`ModelProvider`]; a failed construction is cached and the flow degrades
//! to a fixed fallback caption instead of erroring.
//!
//! # Usage
//!
//! ```rust,ignore
//! use captioner_core::{Config, Orchestrator, RecordingRenderer};
//!
//! #[tokio::main]
//! async fn main() -> captioner_core::Result<()> {
//!     let config = Config::load()?;
//!     let mut orchestrator = Orchestrator::new(&config)?;
//!     let mut renderer = RecordingRenderer::default();
//!
//!     let state = orchestrator
//!         .handle("https://example.com/cat.jpg", &mut renderer)
//!         .await;
//!     println!("Caption: {:?}", state.caption_text());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod caption;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod pipeline;
pub mod render;

// Re-exports for convenient access
pub use caption::{Caption, CaptionService};
pub use config::Config;
pub use error::{CaptionerError, ConfigError, ErrorKind, PipelineError, PipelineResult, Result};
pub use model::{CaptionBackend, ModelAvailability, ModelHandle, ModelProvider};
pub use orchestrator::Orchestrator;
pub use pipeline::ImageArray;
pub use render::{
    CaptionZone, Phase, RecordingRenderer, RenderState, RenderedImage, Renderer,
    MODEL_UNAVAILABLE_TEXT,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
