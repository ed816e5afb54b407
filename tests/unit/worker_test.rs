//! Unit tests for worker fallback inside the pipeline

use std::sync::Arc;

use image::DynamicImage;
use studio_preview::error::Result;
use studio_preview::raster::OutputFormat;
use studio_preview::{Config, ImageCodec, PreviewPipeline, RasterCodec};

use crate::helpers::png_bytes;

/// Real codec without an offscreen surface, so the worker refuses every job
struct NoSurface(RasterCodec);

impl ImageCodec for NoSurface {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        self.0.decode(bytes)
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        self.0.resize(image, width, height)
    }

    fn encode(&self, image: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
        self.0.encode(image, format, quality)
    }

    fn offscreen_available(&self) -> bool {
        false
    }
}

#[test]
fn pipeline_starts_worker_by_default() {
    let pipeline = PreviewPipeline::new(Config::default());
    assert!(pipeline.has_worker());
}

#[test]
fn worker_refusal_falls_back_to_inline() {
    let pipeline = PreviewPipeline::with_codec(Config::default(), Arc::new(NoSurface(RasterCodec::new())));
    let key = pipeline.add_local(png_bytes(1000, 500));

    let preview = pipeline.downscale_now(key);

    assert!(preview.is_encoded());
    assert_eq!(pipeline.peek_full(key), Some(preview));
    assert!(!pipeline.blobs().is_live(key));
}

#[test]
fn worker_result_matches_inline_result() {
    let bytes = png_bytes(1500, 900);

    let with_worker = PreviewPipeline::new(Config::default());
    let a = with_worker.add_local(bytes.clone());
    let without_worker = PreviewPipeline::new(Config::default().without_worker());
    let b = without_worker.add_local(bytes);

    assert_eq!(with_worker.downscale_now(a), without_worker.downscale_now(b));
}
