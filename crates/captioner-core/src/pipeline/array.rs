//! Numeric `height × width × channels` form of a decoded image.
//!
//! Channel layout follows the decoded image: 1 (gray), 2 (gray + alpha),
//! 3 (RGB) or 4 (RGBA). Wider sample types are narrowed to 8 bits.

use image::{DynamicImage, GenericImageView, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use ndarray::Array3;

use crate::error::PipelineError;

/// An image as a `u8` array of shape `(height, width, channels)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArray {
    data: Array3<u8>,
}

impl ImageArray {
    /// Build the array form of a decoded image.
    pub fn from_image(image: &DynamicImage) -> Result<Self, PipelineError> {
        let (width, height) = image.dimensions();
        let (channels, raw) = match image {
            DynamicImage::ImageLuma8(buf) => (1, buf.as_raw().clone()),
            DynamicImage::ImageLumaA8(buf) => (2, buf.as_raw().clone()),
            DynamicImage::ImageRgb8(buf) => (3, buf.as_raw().clone()),
            DynamicImage::ImageRgba8(buf) => (4, buf.as_raw().clone()),
            DynamicImage::ImageLuma16(_) => (1, image.to_luma8().into_raw()),
            DynamicImage::ImageLumaA16(_) => (2, image.to_luma_alpha8().into_raw()),
            other if other.color().has_alpha() => (4, other.to_rgba8().into_raw()),
            other => (3, other.to_rgb8().into_raw()),
        };

        Self::from_shape_vec(height as usize, width as usize, channels, raw)
    }

    /// Wrap a raw interleaved buffer.
    pub fn from_shape_vec(
        height: usize,
        width: usize,
        channels: usize,
        raw: Vec<u8>,
    ) -> Result<Self, PipelineError> {
        let data = Array3::from_shape_vec((height, width, channels), raw)
            .map_err(|e| PipelineError::Preprocess(format!("bad image array shape: {e}")))?;
        Ok(Self { data })
    }

    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn channels(&self) -> usize {
        self.data.shape()[2]
    }

    /// Rebuild a raster image from the array.
    pub fn to_image(&self) -> Result<DynamicImage, PipelineError> {
        let (height, width, channels) = (self.height(), self.width(), self.channels());
        if height == 0 || width == 0 {
            return Err(PipelineError::Preprocess(format!(
                "image array is empty ({width}x{height})"
            )));
        }

        let (w, h) = (width as u32, height as u32);
        let raw: Vec<u8> = self.data.iter().copied().collect();
        let image = match channels {
            1 => GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
            2 => GrayAlphaImage::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
            3 => RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
            n => {
                return Err(PipelineError::Preprocess(format!(
                    "unsupported channel count: {n}"
                )))
            }
        };

        image.ok_or_else(|| PipelineError::Preprocess("image array buffer too small".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, LumaA, Rgb, Rgba};

    #[test]
    fn test_rgb_shape_is_height_width_channels() {
        let img = DynamicImage::new_rgb8(400, 300);
        let array = ImageArray::from_image(&img).unwrap();
        assert_eq!(array.data.shape(), &[300, 400, 3]);
    }

    #[test]
    fn test_channel_layout_follows_image() {
        let gray = DynamicImage::ImageLuma8(GrayImage::new(5, 2));
        assert_eq!(ImageArray::from_image(&gray).unwrap().channels(), 1);

        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(5, 2));
        assert_eq!(ImageArray::from_image(&rgba).unwrap().channels(), 4);

        let wide: ImageBuffer<Rgb<u16>, Vec<u16>> = ImageBuffer::new(5, 2);
        let wide = DynamicImage::ImageRgb16(wide);
        assert_eq!(ImageArray::from_image(&wide).unwrap().channels(), 3);
    }

    #[test]
    fn test_sixteen_bit_gray_stays_gray() {
        let gray: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(4, 4, Luma([65535]));
        let array = ImageArray::from_image(&DynamicImage::ImageLuma16(gray)).unwrap();
        assert_eq!(array.channels(), 1);
        assert_eq!(array.data[[3, 3, 0]], 255);

        let gray_alpha: ImageBuffer<LumaA<u16>, Vec<u16>> = ImageBuffer::new(4, 4);
        let array = ImageArray::from_image(&DynamicImage::ImageLumaA16(gray_alpha)).unwrap();
        assert_eq!(array.channels(), 2);
        assert!(matches!(array.to_image().unwrap(), DynamicImage::ImageLumaA8(_)));
    }

    #[test]
    fn test_pixel_values_land_at_row_col() {
        let mut buf = RgbImage::new(3, 2);
        buf.put_pixel(2, 1, Rgb([10, 20, 30]));
        let array = ImageArray::from_image(&DynamicImage::ImageRgb8(buf)).unwrap();
        assert_eq!(array.data[[1, 2, 0]], 10);
        assert_eq!(array.data[[1, 2, 2]], 30);
        assert_eq!(array.data[[0, 0, 0]], 0);
    }

    #[test]
    fn test_to_image_preserves_pixels() {
        let mut buf = RgbaImage::new(2, 2);
        buf.put_pixel(1, 0, Rgba([1, 2, 3, 4]));
        let original = DynamicImage::ImageRgba8(buf);
        let rebuilt = ImageArray::from_image(&original).unwrap().to_image().unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_gray_to_image() {
        let buf = GrayImage::from_pixel(3, 3, Luma([200]));
        let array = ImageArray::from_image(&DynamicImage::ImageLuma8(buf)).unwrap();
        let rebuilt = array.to_image().unwrap();
        assert!(matches!(rebuilt, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_bad_shape_is_rejected() {
        let err = ImageArray::from_shape_vec(2, 2, 3, vec![0; 5]).unwrap_err();
        assert!(err.to_string().contains("bad image array shape"));
    }

    #[test]
    fn test_unsupported_channel_count() {
        let array = ImageArray::from_shape_vec(1, 1, 5, vec![0; 5]).unwrap();
        let err = array.to_image().unwrap_err();
        assert!(err.to_string().contains("channel count: 5"));
    }

    #[test]
    fn test_empty_array_is_rejected() {
        let array = ImageArray::from_shape_vec(0, 4, 3, Vec::new()).unwrap();
        assert!(array.to_image().is_err());
    }
}
