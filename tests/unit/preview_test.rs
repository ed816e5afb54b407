//! Unit tests for the per-file preview orchestrator

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use studio_preview::{FilePreview, ImageSource, Preview, PreviewPipeline, PreviewState};

use crate::helpers::{
    inline_config, jpeg_bytes, shared, wait_until, CountingCodec, FailingCodec, GatedCodec,
    PanickingCodec,
};

const WAIT: Duration = Duration::from_secs(20);

#[test]
fn local_image_ends_with_full_preview() {
    let pipeline = PreviewPipeline::new(inline_config());
    let key = pipeline.add_local(jpeg_bytes(1600, 900));

    let mut preview = FilePreview::start(ImageSource::Local(key), &pipeline);
    assert_eq!(preview.state(), PreviewState::Downscaling);
    assert!(preview.is_processing());

    assert!(preview.wait_ready(WAIT));
    assert_eq!(preview.state(), PreviewState::Ready);
    assert_eq!(preview.display(), pipeline.peek_full(key).as_ref());
    assert!(preview.tiny().is_none());
}

#[test]
fn cached_full_preview_is_ready_immediately() {
    let (codec, erased) = shared(CountingCodec::new());
    let pipeline = PreviewPipeline::with_codec(inline_config(), erased);
    let key = pipeline.add_local(jpeg_bytes(400, 400));
    let full = pipeline.downscale_now(key);
    let decodes = codec.decodes.load(Ordering::SeqCst);

    let preview = FilePreview::start(ImageSource::Local(key), &pipeline);

    assert_eq!(preview.state(), PreviewState::Ready);
    assert_eq!(preview.display(), Some(&full));
    assert_eq!(codec.decodes.load(Ordering::SeqCst), decodes);
}

#[test]
fn full_supersedes_late_tiny() {
    // Placeholder work is slowed so the full preview lands first
    let (codec, erased) = shared(CountingCodec::new().with_tiny_delay(Duration::from_millis(300)));
    let pipeline = PreviewPipeline::with_codec(inline_config(), erased);
    let key = pipeline.add_local(jpeg_bytes(1200, 900));

    let mut preview = FilePreview::start(ImageSource::Local(key), &pipeline);
    assert!(preview.wait_ready(WAIT));
    let full = preview.display().cloned().unwrap();
    assert!(full.is_encoded());

    assert!(wait_until(WAIT, || pipeline.peek_tiny(key).is_some()));
    thread::sleep(Duration::from_millis(20));
    preview.poll();

    assert_eq!(preview.display(), Some(&full));
    assert!(preview.tiny().is_none());
    assert_eq!(codec.tiny_resizes(), 1);
}

#[test]
fn tiny_shows_while_full_is_pending() {
    let (_codec, erased) = shared(CountingCodec::new().with_full_delay(Duration::from_millis(400)));
    let pipeline = PreviewPipeline::with_codec(inline_config(), erased);
    let key = pipeline.add_local(jpeg_bytes(1200, 900));

    let mut preview = FilePreview::start(ImageSource::Local(key), &pipeline);

    assert!(wait_until(WAIT, || {
        preview.poll();
        preview.tiny().is_some() || preview.state() == PreviewState::Ready
    }));
    if preview.state() != PreviewState::Ready {
        assert_eq!(preview.display(), preview.tiny());
        assert!(preview.is_processing());
    }

    assert!(preview.wait_ready(WAIT));
    assert!(preview.tiny().is_none());
}

#[test]
fn cached_tiny_is_shown_on_start() {
    let (_codec, erased) = shared(CountingCodec::new().with_full_delay(Duration::from_millis(200)));
    let pipeline = PreviewPipeline::with_codec(inline_config(), erased);
    let key = pipeline.add_local(jpeg_bytes(600, 600));
    let tiny = Preview::Encoded("data:image/jpeg;base64,AAAA".to_string());
    pipeline.caches().tiny.set(key, tiny.clone());

    let preview = FilePreview::start(ImageSource::Local(key), &pipeline);

    assert_eq!(preview.display(), Some(&tiny));
    assert_eq!(preview.state(), PreviewState::Downscaling);
}

#[test]
fn failing_codec_shows_original() {
    let pipeline = PreviewPipeline::with_codec(inline_config(), std::sync::Arc::new(FailingCodec));
    let key = pipeline.add_local(vec![1, 2, 3]);

    let mut preview = FilePreview::start(ImageSource::Local(key), &pipeline);

    assert!(preview.wait_ready(WAIT));
    assert_eq!(preview.display(), Some(&Preview::Source(key)));
    assert_eq!(preview.display_src(), Some(key.to_url()));
}

#[test]
fn result_after_cancel_is_never_shown() {
    let (codec, erased) = shared(GatedCodec::new());
    let pipeline = PreviewPipeline::with_codec(inline_config(), erased);
    let key = pipeline.add_local(jpeg_bytes(1000, 800));

    let mut preview = FilePreview::start(ImageSource::Local(key), &pipeline);
    assert!(wait_until(WAIT, || codec.decodes_started.load(Ordering::SeqCst) >= 1));

    preview.cancel(&pipeline);
    assert!(!pipeline.blobs().is_live(key));

    codec.open();
    assert!(wait_until(WAIT, || pipeline.queue().stats().completed() == 1));

    assert!(!preview.poll());
    assert_eq!(preview.state(), PreviewState::Cancelled);
    assert_eq!(preview.display(), None);
    assert!(!preview.wait_ready(Duration::from_millis(50)));
}

#[test]
fn cancel_twice_is_harmless() {
    let pipeline = PreviewPipeline::new(inline_config());
    let key = pipeline.add_local(jpeg_bytes(100, 100));
    let mut preview = FilePreview::start(ImageSource::Local(key), &pipeline);

    preview.cancel(&pipeline);
    preview.cancel(&pipeline);

    assert_eq!(preview.state(), PreviewState::Cancelled);
    assert!(!pipeline.blobs().is_live(key));
}

#[test]
fn remote_source_does_no_work() {
    let (codec, erased) = shared(CountingCodec::new());
    let pipeline = PreviewPipeline::with_codec(inline_config(), erased);

    let preview = FilePreview::start(
        ImageSource::Remote("https://cdn.example/session/42.jpg".into()),
        &pipeline,
    );

    assert_eq!(preview.state(), PreviewState::Ready);
    assert_eq!(
        preview.display(),
        Some(&Preview::Remote("https://cdn.example/session/42.jpg".into()))
    );
    assert_eq!(codec.decodes.load(Ordering::SeqCst), 0);
}

#[test]
fn panicking_codec_ends_ready_with_original() {
    for config in [studio_preview::Config::default(), inline_config()] {
        let pipeline = PreviewPipeline::with_codec(config, std::sync::Arc::new(PanickingCodec));
        let key = pipeline.add_local(jpeg_bytes(200, 100));

        let mut preview = FilePreview::start(ImageSource::Local(key), &pipeline);

        assert!(preview.wait_ready(WAIT));
        assert_eq!(preview.state(), PreviewState::Ready);
        assert_eq!(preview.display(), Some(&Preview::Source(key)));
    }
}
