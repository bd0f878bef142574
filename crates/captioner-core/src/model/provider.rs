//! Process-lifetime captioning model, constructed once on first use.
//!
//! The outcome of the first construction attempt, success or failure, is
//! stored in a `tokio::sync::OnceCell` and handed out unchanged for the rest
//! of the process. A failed construction is never retried. Concurrent first
//! callers wait on the same construction rather than starting their own.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::OnceCell;

use super::backend::{BackendFactory, CaptionBackend};
use crate::config::Config;
use crate::error::{ErrorKind, PipelineError};

/// Shared, read-only reference to the constructed backend.
#[derive(Clone)]
pub struct ModelHandle(Arc<dyn CaptionBackend>);

impl ModelHandle {
    pub fn new(backend: Box<dyn CaptionBackend>) -> Self {
        Self(Arc::from(backend))
    }

    pub fn backend(&self) -> &dyn CaptionBackend {
        self.0.as_ref()
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn model(&self) -> &str {
        self.0.model()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("backend", &self.name())
            .field("model", &self.model())
            .finish()
    }
}

/// Cached outcome of the one construction attempt.
#[derive(Debug, Clone)]
pub enum ModelSlot {
    Ready(ModelHandle),
    Failed(String),
}

/// What [`ModelProvider::acquire`] hands back.
#[derive(Debug, Clone)]
pub enum ModelAvailability {
    /// The model was constructed and can be used for inference
    Ready(ModelHandle),
    /// Construction failed; `diagnostic` is the user-facing message
    Unavailable { diagnostic: String },
}

impl ModelAvailability {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelAvailability::Ready(_))
    }
}

type Constructor =
    Box<dyn Fn() -> BoxFuture<'static, Result<Box<dyn CaptionBackend>, PipelineError>> + Send + Sync>;

/// Lazily constructs and caches the captioning model.
pub struct ModelProvider {
    constructor: Constructor,
    slot: OnceCell<ModelSlot>,
}

impl ModelProvider {
    /// Build a provider around an arbitrary async constructor.
    ///
    /// The constructor runs at most once per provider.
    pub fn with_constructor<F, Fut>(constructor: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Box<dyn CaptionBackend>, PipelineError>>
            + Send
            + 'static,
    {
        Self {
            constructor: Box::new(move || Box::pin(constructor())),
            slot: OnceCell::new(),
        }
    }

    /// Build a provider for the backend named in `[model]`.
    ///
    /// With `model.check_on_load`, a backend that is not reachable counts
    /// as a failed construction.
    pub fn from_config(config: &Config) -> Self {
        let backend = config.model.backend.clone();
        let model_override = config.model.model.clone();
        let llm = config.llm.clone();
        let check_reachable = config.model.check_on_load;

        Self::with_constructor(move || {
            let backend = backend.clone();
            let model_override = model_override.clone();
            let llm = llm.clone();
            async move {
                let built = BackendFactory::create(&backend, &llm, model_override.as_deref())?;
                if check_reachable && !built.is_available().await {
                    return Err(PipelineError::ModelConstruction {
                        backend,
                        message: format!("backend not reachable (model '{}')", built.model()),
                    });
                }
                Ok(built)
            }
        })
    }

    /// Return the cached model, constructing it on the first call.
    pub async fn acquire(&self) -> ModelAvailability {
        let slot = self
            .slot
            .get_or_init(|| async {
                match (self.constructor)().await {
                    Ok(backend) => {
                        let handle = ModelHandle::new(backend);
                        tracing::info!(
                            backend = handle.name(),
                            model = handle.model(),
                            "Caption model loaded"
                        );
                        ModelSlot::Ready(handle)
                    }
                    Err(e) => {
                        let diagnostic = format!(
                            "{}: {e}",
                            ErrorKind::ModelConstruction.user_prefix()
                        );
                        tracing::error!("{diagnostic}");
                        ModelSlot::Failed(diagnostic)
                    }
                }
            })
            .await;

        match slot {
            ModelSlot::Ready(handle) => ModelAvailability::Ready(handle.clone()),
            ModelSlot::Failed(diagnostic) => ModelAvailability::Unavailable {
                diagnostic: diagnostic.clone(),
            },
        }
    }

    /// The cached outcome, if construction has happened.
    pub fn cached(&self) -> Option<&ModelSlot> {
        self.slot.get()
    }
}
