//! Command implementations.

pub mod caption;
pub mod config;
pub mod display;
pub mod interactive;
pub mod page;

use captioner_core::config::validate::KNOWN_BACKENDS;
use captioner_core::Config;
use clap::Args;

/// Per-invocation overrides for the `[model]` section.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Captioning backend: ollama, anthropic, openai, hyperbolic
    #[arg(long, env = "CAPTIONER_BACKEND")]
    pub backend: Option<String>,

    /// Model name, overriding the backend's configured model
    #[arg(long, env = "CAPTIONER_MODEL")]
    pub model: Option<String>,
}

impl ModelArgs {
    /// Apply the overrides to a loaded config.
    pub fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(ref backend) = self.backend {
            let backend = backend.to_lowercase();
            if !KNOWN_BACKENDS.contains(&backend.as_str()) {
                anyhow::bail!(
                    "Unknown backend '{backend}'. Expected one of: {}",
                    KNOWN_BACKENDS.join(", ")
                );
            }
            config.model.backend = backend;
        }
        if let Some(ref model) = self.model {
            config.model.model = Some(model.clone());
        }
        Ok(())
    }
}
