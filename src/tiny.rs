//! Tiny blurred placeholder generation
//!
//! Produces a ~24px, low-quality JPEG that masks the latency of the full
//! downscale. It is cheap, so it bypasses the task queue and runs on the
//! rayon global pool as soon as a file is selected.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blob::ImageKey;
use crate::cache::PreviewCache;
use crate::raster::{self, ImageCodec};
use crate::types::Preview;

/// Placeholders are always JPEG.
pub const TINY_MIME: &str = "image/jpeg";

/// Tiny placeholder parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TinySettings {
    /// Longer edge of the placeholder in pixels
    #[serde(default = "default_tiny_max_dimension")]
    pub max_dimension: u32,
    /// Encoder quality in (0, 1]
    #[serde(default = "default_tiny_quality")]
    pub quality: f32,
    /// Gaussian blur applied after resizing (0 disables)
    #[serde(default = "default_tiny_blur_sigma")]
    pub blur_sigma: f32,
}

pub fn default_tiny_max_dimension() -> u32 {
    24
}

pub fn default_tiny_quality() -> f32 {
    0.5
}

pub fn default_tiny_blur_sigma() -> f32 {
    1.5
}

impl Default for TinySettings {
    fn default() -> Self {
        Self {
            max_dimension: default_tiny_max_dimension(),
            quality: default_tiny_quality(),
            blur_sigma: default_tiny_blur_sigma(),
        }
    }
}

/// Build the placeholder for `key` and store it in `cache`.
///
/// Never fails: any decode or encode problem resolves to
/// `Preview::Source(key)`, which is not cached.
pub fn generate_tiny(
    codec: &dyn ImageCodec,
    cache: &PreviewCache,
    key: ImageKey,
    bytes: &[u8],
    settings: &TinySettings,
) -> Preview {
    if let Some(hit) = cache.peek(key) {
        return hit;
    }

    match raster::render(
        codec,
        bytes,
        settings.max_dimension,
        settings.quality,
        TINY_MIME,
        settings.blur_sigma,
    ) {
        Ok(encoded) => {
            let preview = Preview::Encoded(encoded.data_url);
            cache.set(key, preview.clone());
            preview
        }
        Err(err) => {
            tracing::debug!(%key, error = %err, "tiny preview failed, keeping source");
            Preview::Source(key)
        }
    }
}

/// Run `generate_tiny` on the rayon pool and hand the result to `on_done`.
pub fn spawn_tiny<F>(
    codec: Arc<dyn ImageCodec>,
    cache: Arc<crate::cache::PreviewCaches>,
    key: ImageKey,
    bytes: Arc<[u8]>,
    settings: TinySettings,
    on_done: F,
) where
    F: FnOnce(Preview) + Send + 'static,
{
    rayon::spawn(move || {
        // A panicking rayon job would abort the process
        let preview = catch_unwind(AssertUnwindSafe(|| {
            generate_tiny(codec.as_ref(), &cache.tiny, key, &bytes, &settings)
        }))
        .unwrap_or(Preview::Source(key));
        on_done(preview);
    });
}
