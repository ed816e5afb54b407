//! Output formats, encoder fallback and data URL conversion.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use image::DynamicImage;
use serde::Serialize;

use super::ImageCodec;
use crate::error::{PreviewError, Result};

/// Encodings the preview pipeline can produce. WebP is left out: the
/// `image` encoder is lossless only and would ignore `quality`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Parse a mime type. Returns `None` for encodings we cannot produce.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

/// Map a 0..1 quality factor to the encoder's 1..=100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 80;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Render bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, B64.encode(bytes))
}

/// A finished, embeddable preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedPreview {
    pub data_url: String,
    /// Mime type actually produced (may differ from the requested one)
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    /// Size of the encoded image before base64
    pub encoded_len: usize,
}

impl EncodedPreview {
    pub fn new(bytes: &[u8], mime: &str, width: u32, height: u32) -> Self {
        Self {
            data_url: to_data_url(mime, bytes),
            mime_type: mime.to_string(),
            width,
            height,
            encoded_len: bytes.len(),
        }
    }
}

/// Encode to the requested mime type, retrying once as JPEG if the
/// encoder rejects it.
///
/// Returns the encoded bytes and the mime type they were produced in.
pub fn encode_with_fallback(
    codec: &dyn ImageCodec,
    image: &DynamicImage,
    mime: &str,
    quality: f32,
) -> Result<(Vec<u8>, &'static str)> {
    let first = match OutputFormat::from_mime(mime) {
        Some(format) => codec
            .encode(image, format, quality)
            .map(|bytes| (bytes, format.mime())),
        None => Err(PreviewError::UnsupportedEncoding(mime.to_string())),
    };

    match first {
        Ok(encoded) => Ok(encoded),
        Err(err) if OutputFormat::from_mime(mime) == Some(OutputFormat::Jpeg) => Err(err),
        Err(err) => {
            tracing::debug!(%mime, error = %err, "encoder rejected mime type, retrying as jpeg");
            codec
                .encode(image, OutputFormat::Jpeg, quality)
                .map(|bytes| (bytes, OutputFormat::Jpeg.mime()))
        }
    }
}
