//! Decode, resize and encode primitives
//!
//! `ImageCodec` is the seam between the preview stages and the actual
//! pixel work. `RasterCodec` implements it with the `image` crate; tests
//! swap in counting or failing codecs.

pub mod encode;
pub mod geometry;

pub use encode::{encode_with_fallback, jpeg_quality, to_data_url, EncodedPreview, OutputFormat};
pub use geometry::fit_within;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

use crate::error::{PreviewError, Result};

/// Pixel operations used by the preview stages.
pub trait ImageCodec: Send + Sync {
    /// Decode an encoded image (JPEG, PNG, ...) into pixels.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    /// Resize to exactly `width` x `height`.
    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;

    /// Encode pixels. `quality` is in (0, 1] and ignored by lossless formats.
    fn encode(&self, image: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>>;

    /// Whether an off-thread drawing surface exists. The background worker
    /// refuses jobs when this is false.
    fn offscreen_available(&self) -> bool {
        true
    }
}

/// `image`-crate backed codec.
#[derive(Debug, Clone)]
pub struct RasterCodec {
    filter: FilterType,
}

impl RasterCodec {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }

    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec for RasterCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory(bytes)?)
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        if image.width() == width && image.height() == height {
            return image.clone();
        }
        image.resize_exact(width, height, self.filter)
    }

    fn encode(&self, image: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
        let (width, height) = (image.width(), image.height());
        let mut out = Vec::new();
        let written = match format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality)).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            OutputFormat::Png => {
                let rgba = image.to_rgba8();
                PngEncoder::new(&mut out).write_image(
                    rgba.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )
            }
        };

        written.map_err(|e| PreviewError::Encode {
            mime: format.mime().to_string(),
            message: e.to_string(),
        })?;
        Ok(out)
    }
}

/// Decode, fit within `max_dimension`, optionally blur, and encode.
///
/// Shared by the tiny generator and both downscalers so every path
/// produces identical geometry.
pub fn render(
    codec: &dyn ImageCodec,
    bytes: &[u8],
    max_dimension: u32,
    quality: f32,
    mime: &str,
    blur_sigma: f32,
) -> Result<EncodedPreview> {
    let decoded = codec.decode(bytes)?;
    let (width, height) = fit_within(decoded.width(), decoded.height(), max_dimension);
    let mut resized = codec.resize(&decoded, width, height);
    drop(decoded);

    if blur_sigma > 0.0 {
        resized = resized.blur(blur_sigma);
    }

    let (encoded, produced) = encode_with_fallback(codec, &resized, mime, quality)?;
    Ok(EncodedPreview::new(&encoded, produced, width, height))
}
