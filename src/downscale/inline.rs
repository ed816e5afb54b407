//! Fallback downscaler that runs on the calling thread.
//!
//! This is the last stage: if it cannot decode the image, the caller keeps
//! showing the unprocessed local image.

use std::sync::Arc;

use super::{commit, downscale_bytes, DownscaleJob};
use crate::blob::BlobStore;
use crate::cache::PreviewCaches;
use crate::raster::ImageCodec;
use crate::types::Preview;

/// Downscales in place, then caches the result and frees the source.
pub struct InlineDownscaler {
    codec: Arc<dyn ImageCodec>,
    caches: Arc<PreviewCaches>,
    blobs: Arc<BlobStore>,
}

impl InlineDownscaler {
    pub fn new(codec: Arc<dyn ImageCodec>, caches: Arc<PreviewCaches>, blobs: Arc<BlobStore>) -> Self {
        Self {
            codec,
            caches,
            blobs,
        }
    }

    /// Produce the full preview for `job`.
    ///
    /// On success the preview is cached and the local image released. On
    /// failure the local image stays live and `Preview::Source` is returned.
    pub fn run(&self, job: &DownscaleJob) -> Preview {
        match downscale_bytes(self.codec.as_ref(), &job.bytes, &job.settings) {
            Ok(encoded) => commit(&self.caches, &self.blobs, job.key, encoded),
            Err(err) => {
                tracing::warn!(key = %job.key, error = %err, "downscale failed, showing original");
                Preview::Source(job.key)
            }
        }
    }
}
