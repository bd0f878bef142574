//! Stages between a URL and a captionable image.
//!
//! - **fetch**: Streaming GET with a body size limit
//! - **decode**: Content-sniffed decode with timeout and dimension limits
//! - **array**: Numeric `(height, width, channels)` form handed to the caption service
//! - **thumbnail**: WebP preview for the rendered image zone

pub mod array;
pub mod decode;
pub mod fetch;
pub mod thumbnail;

// Re-exports for convenient access
pub use array::ImageArray;
pub use decode::{format_to_string, DecodedImage, ImageDecoder};
pub use fetch::{parse_url, FetchedBytes, ImageFetcher};
pub use thumbnail::ThumbnailGenerator;
