//! Caption generation for a single decoded image.
//!
//! Takes the numeric image array, does whatever the backend needs done to it
//! (downscale, flatten to RGB, JPEG + base64), and makes exactly one backend
//! call.

use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::io::Cursor;

use crate::config::ModelConfig;
use crate::error::PipelineError;
use crate::model::{CaptionRequest, ImageInput, ModelHandle};
use crate::pipeline::ImageArray;

/// A generated caption and where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct Caption {
    /// Caption text, exactly as the backend returned it
    pub text: String,
    /// Backend that produced it ("ollama", "openai", ...)
    pub backend: String,
    /// Model identifier reported by the backend
    pub model: String,
    /// Tokens used (input + output), if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Request/response adapter between an [`ImageArray`] and a [`ModelHandle`].
pub struct CaptionService {
    config: ModelConfig,
}

impl CaptionService {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Caption an image with the given model.
    ///
    /// The caller must already have checked that the model is available.
    pub async fn caption(
        &self,
        image: &ImageArray,
        model: &ModelHandle,
    ) -> Result<Caption, PipelineError> {
        let input = self.prepare(image)?;
        let request = CaptionRequest::new(input, &self.config);

        tracing::debug!(
            backend = model.name(),
            model = model.model(),
            width = image.width(),
            height = image.height(),
            "Requesting caption"
        );

        let response = model.backend().generate(&request).await?;

        tracing::info!(
            backend = model.name(),
            latency_ms = response.latency_ms,
            tokens = ?response.tokens_used,
            "Caption generated"
        );

        Ok(Caption {
            text: response.text,
            backend: model.name().to_string(),
            model: response.model,
            tokens_used: response.tokens_used,
            latency_ms: response.latency_ms,
        })
    }

    /// Turn the array into the payload backends accept.
    ///
    /// Downscales (never upscales) so the longest edge is at most
    /// `max_edge`, drops alpha, and JPEG-encodes.
    pub fn prepare(&self, image: &ImageArray) -> Result<ImageInput, PipelineError> {
        let raster = image.to_image()?;
        let max_edge = self.config.max_edge;
        let raster = if raster.width() > max_edge || raster.height() > max_edge {
            raster.thumbnail(max_edge, max_edge)
        } else {
            raster
        };

        let rgb = DynamicImage::ImageRgb8(raster.to_rgb8());
        let mut buffer = Cursor::new(Vec::new());
        rgb.write_to(&mut buffer, ImageFormat::Jpeg)
            .map_err(|e| PipelineError::Preprocess(format!("JPEG encoding failed: {e}")))?;

        Ok(ImageInput::from_bytes(&buffer.into_inner(), "jpeg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CaptionBackend, CaptionResponse};
    use async_trait::async_trait;
    use base64::Engine;
    use image::{GenericImageView, RgbaImage};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records the last request it saw and answers with a fixed caption.
    struct RecordingBackend {
        last: Mutex<Option<CaptionRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl CaptionBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "rec-1"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            request: &CaptionRequest,
        ) -> Result<CaptionResponse, PipelineError> {
            *self.last.lock().unwrap() = Some(request.clone());
            if self.fail {
                return Err(PipelineError::Inference {
                    message: "backend exploded".to_string(),
                    status_code: Some(500),
                });
            }
            Ok(CaptionResponse {
                text: "a gray square on a gray background".to_string(),
                model: "rec-1".to_string(),
                tokens_used: Some(17),
                latency_ms: 3,
            })
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    fn decode_payload(input: &ImageInput) -> DynamicImage {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&input.data)
            .unwrap();
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn test_prepare_downscales_large_images() {
        let service = CaptionService::new(ModelConfig {
            max_edge: 200,
            ..ModelConfig::default()
        });
        let array = ImageArray::from_image(&DynamicImage::new_rgb8(800, 400)).unwrap();
        let input = service.prepare(&array).unwrap();
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(decode_payload(&input).dimensions(), (200, 100));
    }

    #[test]
    fn test_prepare_never_upscales() {
        let service = CaptionService::new(ModelConfig::default());
        let array = ImageArray::from_image(&DynamicImage::new_rgb8(40, 30)).unwrap();
        let input = service.prepare(&array).unwrap();
        assert_eq!(decode_payload(&input).dimensions(), (40, 30));
    }

    #[test]
    fn test_prepare_flattens_alpha() {
        let service = CaptionService::new(ModelConfig::default());
        let array = ImageArray::from_image(&DynamicImage::ImageRgba8(RgbaImage::new(8, 8))).unwrap();
        assert!(service.prepare(&array).is_ok());
    }

    #[tokio::test]
    async fn test_caption_returns_backend_text_verbatim() {
        let backend = RecordingBackend {
            last: Mutex::new(None),
            fail: false,
        };
        let handle = ModelHandle::new(Box::new(backend));
        let service = CaptionService::new(ModelConfig::default());
        let array = ImageArray::from_image(&DynamicImage::new_rgb8(64, 48)).unwrap();
        let before = array.clone();

        let caption = service.caption(&array, &handle).await.unwrap();
        assert_eq!(caption.text, "a gray square on a gray background");
        assert_eq!(caption.backend, "recording");
        assert_eq!(caption.tokens_used, Some(17));
        assert_eq!(array, before);
    }

    #[tokio::test]
    async fn test_caption_sends_configured_prompt() {
        let backend = std::sync::Arc::new(RecordingBackend {
            last: Mutex::new(None),
            fail: false,
        });

        struct Shared(std::sync::Arc<RecordingBackend>);

        #[async_trait]
        impl CaptionBackend for Shared {
            fn name(&self) -> &str {
                self.0.name()
            }
            fn model(&self) -> &str {
                self.0.model()
            }
            async fn is_available(&self) -> bool {
                true
            }
            async fn generate(
                &self,
                request: &CaptionRequest,
            ) -> Result<CaptionResponse, PipelineError> {
                self.0.generate(request).await
            }
            fn timeout(&self) -> Duration {
                self.0.timeout()
            }
        }

        let handle = ModelHandle::new(Box::new(Shared(backend.clone())));
        let service = CaptionService::new(ModelConfig {
            prompt: "Caption in five words.".to_string(),
            max_tokens: 16,
            ..ModelConfig::default()
        });
        let array = ImageArray::from_image(&DynamicImage::new_rgb8(10, 10)).unwrap();
        service.caption(&array, &handle).await.unwrap();

        let seen = backend.last.lock().unwrap().clone().unwrap();
        assert_eq!(seen.prompt, "Caption in five words.");
        assert_eq!(seen.max_tokens, 16);
        assert_eq!(seen.image.media_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_caption_propagates_inference_error() {
        let handle = ModelHandle::new(Box::new(RecordingBackend {
            last: Mutex::new(None),
            fail: true,
        }));
        let service = CaptionService::new(ModelConfig::default());
        let array = ImageArray::from_image(&DynamicImage::new_rgb8(10, 10)).unwrap();

        let err = service.caption(&array, &handle).await.unwrap_err();
        assert!(matches!(err, PipelineError::Inference { status_code: Some(500), .. }));
    }
}
