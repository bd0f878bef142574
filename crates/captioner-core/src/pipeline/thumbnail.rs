//! WebP preview of the fetched image, attached to the rendered image zone.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::config::DisplayConfig;

/// Generates preview thumbnails.
pub struct ThumbnailGenerator {
    config: DisplayConfig,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    /// Generate a thumbnail and return it as a base64-encoded WebP string.
    ///
    /// Returns `None` if thumbnails are disabled or encoding fails.
    pub fn generate(&self, image: &DynamicImage) -> Option<String> {
        self.generate_bytes(image).map(|bytes| BASE64.encode(bytes))
    }

    /// Generate a thumbnail and return the raw WebP bytes.
    pub fn generate_bytes(&self, image: &DynamicImage) -> Option<Vec<u8>> {
        if !self.config.thumbnail {
            return None;
        }

        // Resize maintaining aspect ratio (longest edge = thumbnail_size)
        let size = self.config.thumbnail_size;
        let thumbnail = image.thumbnail(size, size);

        // The WebP encoder only takes 8-bit RGB(A)
        let thumbnail = if thumbnail.color().has_alpha() {
            DynamicImage::ImageRgba8(thumbnail.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(thumbnail.to_rgb8())
        };

        let mut buffer = Cursor::new(Vec::new());
        if let Err(e) = thumbnail.write_to(&mut buffer, ImageFormat::WebP) {
            tracing::warn!("Thumbnail encoding failed: {e}");
            return None;
        }

        Some(buffer.into_inner())
    }
}
