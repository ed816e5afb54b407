//! Full-size preview downscaling
//!
//! Both downscalers run the same routine: decode, fit within
//! `max_dimension`, re-encode, wrap as a data URL.
//!
//! - `worker`: a background thread reached by correlated messages
//! - `inline`: the same work on the calling thread, used as the fallback

pub mod inline;
pub mod worker;

pub use inline::InlineDownscaler;
pub use worker::{RequestId, WorkerDownscaler, WorkerError, WorkerOutcome, WorkerRequest, WorkerResponse};

pub use crate::raster::EncodedPreview;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blob::{BlobStore, ImageKey};
use crate::cache::PreviewCaches;
use crate::error::Result;
use crate::raster::{self, ImageCodec};
use crate::types::Preview;

/// Full preview parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownscaleSettings {
    /// Longer edge of the preview in pixels
    #[serde(default = "default_full_max_dimension")]
    pub max_dimension: u32,
    /// Encoder quality in (0, 1]
    #[serde(default = "default_full_quality")]
    pub quality: f32,
    /// Requested output encoding; JPEG is used if the encoder rejects it
    #[serde(default = "default_full_mime_type")]
    pub mime_type: String,
}

pub fn default_full_max_dimension() -> u32 {
    800
}

pub fn default_full_quality() -> f32 {
    0.8
}

pub fn default_full_mime_type() -> String {
    "image/jpeg".to_string()
}

impl Default for DownscaleSettings {
    fn default() -> Self {
        Self {
            max_dimension: default_full_max_dimension(),
            quality: default_full_quality(),
            mime_type: default_full_mime_type(),
        }
    }
}

/// One unit of downscale work.
///
/// Carries its own copy of the source bytes, so it stays valid even if
/// the local image is released while the job waits in the queue.
#[derive(Debug, Clone)]
pub struct DownscaleJob {
    pub key: ImageKey,
    pub bytes: Arc<[u8]>,
    pub settings: DownscaleSettings,
}

/// Decode, resize and re-encode `bytes` according to `settings`.
pub fn downscale_bytes(
    codec: &dyn ImageCodec,
    bytes: &[u8],
    settings: &DownscaleSettings,
) -> Result<EncodedPreview> {
    raster::render(
        codec,
        bytes,
        settings.max_dimension,
        settings.quality,
        &settings.mime_type,
        0.0,
    )
}

/// Record a finished preview: cache it, then free the local image.
///
/// Returns the cached value, which wins if another job got there first.
pub fn commit(
    caches: &PreviewCaches,
    blobs: &BlobStore,
    key: ImageKey,
    encoded: EncodedPreview,
) -> Preview {
    caches.full.set(key, Preview::Encoded(encoded.data_url));
    blobs.release(key);
    caches
        .full
        .peek(key)
        .unwrap_or(Preview::Source(key))
}
