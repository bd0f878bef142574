//! URL in, image and caption out.
//!
//! One request at a time: fetch, decode, show the image, caption it, show
//! the caption. Every failure becomes text in the rendered state; nothing
//! here returns an error to the caller.

use std::sync::Arc;

use crate::caption::CaptionService;
use crate::config::Config;
use crate::error::{CaptionerError, PipelineError};
use crate::model::{ModelAvailability, ModelProvider};
use crate::pipeline::{
    format_to_string, DecodedImage, ImageArray, ImageDecoder, ImageFetcher, ThumbnailGenerator,
};
use crate::render::{CaptionZone, Phase, RenderState, RenderedImage, Renderer};

/// Drives a request from URL to rendered caption.
pub struct Orchestrator {
    fetcher: ImageFetcher,
    decoder: ImageDecoder,
    thumbnails: ThumbnailGenerator,
    captioner: CaptionService,
    models: Arc<ModelProvider>,
    state: RenderState,
    requests: u64,
}

impl Orchestrator {
    /// Build an orchestrator whose model comes from `[model]` / `[llm]`.
    pub fn new(config: &Config) -> Result<Self, CaptionerError> {
        let models = Arc::new(ModelProvider::from_config(config));
        Self::with_provider(config, models)
    }

    /// Build an orchestrator around an existing model provider.
    pub fn with_provider(
        config: &Config,
        models: Arc<ModelProvider>,
    ) -> Result<Self, CaptionerError> {
        Ok(Self {
            fetcher: ImageFetcher::new(&config.fetch)?,
            decoder: ImageDecoder::new(config.limits.clone()),
            thumbnails: ThumbnailGenerator::new(config.display.clone()),
            captioner: CaptionService::new(config.model.clone()),
            models,
            state: RenderState::idle(),
            requests: 0,
        })
    }

    /// What is currently displayed.
    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Load (or look up) the model without submitting a URL.
    pub async fn model_status(&self) -> ModelAvailability {
        self.models.acquire().await
    }

    /// Process one submitted URL.
    ///
    /// Blank input leaves the current state and the renderer untouched.
    pub async fn handle<R>(&mut self, input: &str, renderer: &mut R) -> &RenderState
    where
        R: Renderer + ?Sized,
    {
        let url = input.trim();
        if url.is_empty() {
            return &self.state;
        }

        self.requests += 1;
        let base = RenderState {
            request_id: self.requests,
            url: Some(url.to_string()),
            ..RenderState::default()
        };

        // Fetch + decode
        renderer.progress(Phase::Fetching, url);
        let (decoded, source_url, bytes) = match self.load(url).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(url, error = %e, "Image URL could not be processed");
                let failed = RenderState {
                    phase: Phase::FetchError,
                    error: Some(e.user_message()),
                    ..base
                };
                return self.replace(failed, renderer);
            }
        };

        // Show the image before captioning starts
        let image = RenderedImage {
            source_url,
            width: decoded.width,
            height: decoded.height,
            format: format_to_string(decoded.format),
            byte_len: decoded.byte_len,
            thumbnail: self.thumbnails.generate(&decoded.image),
            bytes,
        };
        tracing::info!(
            url,
            width = image.width,
            height = image.height,
            format = %image.format,
            "Image displayed"
        );
        let displaying = RenderState {
            phase: Phase::Displaying,
            image: Some(image),
            ..base
        };
        self.replace(displaying.clone(), renderer);

        // Caption
        let array = match ImageArray::from_image(&decoded.image) {
            Ok(array) => array,
            Err(e) => return self.caption_failed(displaying, e, renderer),
        };
        drop(decoded);

        let model = match self.models.acquire().await {
            ModelAvailability::Ready(model) => model,
            ModelAvailability::Unavailable { diagnostic } => {
                let degraded = RenderState {
                    phase: Phase::ModelUnavailable,
                    caption: Some(CaptionZone::fallback()),
                    notice: Some(diagnostic),
                    ..displaying
                };
                return self.replace(degraded, renderer);
            }
        };

        renderer.progress(Phase::Captioning, url);
        match self.captioner.caption(&array, &model).await {
            Ok(caption) => {
                let done = RenderState {
                    phase: Phase::Captioned,
                    caption: Some(CaptionZone::Generated(caption)),
                    ..displaying
                };
                self.replace(done, renderer)
            }
            Err(e) => self.caption_failed(displaying, e, renderer),
        }
    }

    async fn load(
        &self,
        url: &str,
    ) -> Result<(DecodedImage, String, Arc<[u8]>), PipelineError> {
        let fetched = self.fetcher.fetch(url).await?;
        let bytes: Arc<[u8]> = Arc::from(fetched.bytes);
        let decoded = self
            .decoder
            .decode_from_bytes(bytes.to_vec(), &fetched.url)
            .await?;
        Ok((decoded, fetched.url, bytes))
    }

    fn caption_failed<R>(
        &mut self,
        displaying: RenderState,
        e: PipelineError,
        renderer: &mut R,
    ) -> &RenderState
    where
        R: Renderer + ?Sized,
    {
        tracing::error!(error = %e, "Caption generation failed");
        let failed = RenderState {
            phase: Phase::CaptionError,
            error: Some(e.user_message()),
            ..displaying
        };
        self.replace(failed, renderer)
    }

    fn replace<R>(&mut self, next: RenderState, renderer: &mut R) -> &RenderState
    where
        R: Renderer + ?Sized,
    {
        self.state = next;
        renderer.render(&self.state);
        &self.state
    }
}
