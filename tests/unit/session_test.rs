//! Unit tests for the upload session file list

use std::time::Duration;

use studio_preview::{PreviewPipeline, PreviewState, UploadSession, UploadStatus};

use crate::helpers::{inline_config, jpeg_bytes, png_bytes, shared, wait_until, GatedCodec};

const WAIT: Duration = Duration::from_secs(30);

#[test]
fn every_added_image_gets_a_downscaled_preview() {
    let mut session = UploadSession::new(inline_config());
    let a = session.add_file("a.jpg", "image/jpeg", jpeg_bytes(1600, 1200)).unwrap();
    let b = session.add_file("b.png", "image/png", png_bytes(300, 900)).unwrap();

    assert!(session.wait_all(WAIT));

    for id in [a, b] {
        let record = session.file(id).unwrap();
        assert!(record.preview.as_deref().unwrap().starts_with("data:image/jpeg;base64,"));
        assert_eq!(session.preview_state(id), Some(PreviewState::Ready));
    }
}

#[test]
fn non_images_are_filtered_out() {
    let mut session = UploadSession::new(inline_config());
    assert!(session.add_file("contract.pdf", "application/pdf", vec![0; 32]).is_none());
    assert!(session.add_file("shot.jpg", "image/jpeg", jpeg_bytes(50, 50)).is_some());
    assert_eq!(session.len(), 1);
}

#[test]
fn record_carries_file_metadata() {
    let mut session = UploadSession::new(inline_config());
    let bytes = jpeg_bytes(64, 48);
    let size = bytes.len() as u64;
    let id = session.add_file("portrait.jpg", "image/jpeg", bytes).unwrap();

    let record = session.file(id).unwrap();
    assert_eq!(record.name, "portrait.jpg");
    assert_eq!(record.mime_type, "image/jpeg");
    assert_eq!(record.size, size);
    assert_eq!(record.status, UploadStatus::Pending);
    assert_eq!(record.progress, 0);
}

#[test]
fn ids_are_unique_and_increasing() {
    let mut session = UploadSession::new(inline_config());
    let a = session.add_remote("a.jpg", "https://cdn.example/a.jpg");
    let b = session.add_remote("b.jpg", "https://cdn.example/b.jpg");
    assert!(b > a);
}

#[test]
fn removing_a_processing_file_discards_its_result() {
    let (codec, erased) = shared(GatedCodec::new());
    let pipeline = PreviewPipeline::with_codec(inline_config(), erased);
    let mut session = UploadSession::with_pipeline(pipeline);

    let removed = session.add_file("gone.jpg", "image/jpeg", jpeg_bytes(900, 600)).unwrap();
    let kept = session.add_file("kept.jpg", "image/jpeg", jpeg_bytes(600, 900)).unwrap();
    let removed_key = session.preview(removed).unwrap().source().local_key().unwrap();

    assert!(session.remove_file(removed));
    assert!(!session.pipeline().blobs().is_live(removed_key));
    assert!(session.file(removed).is_none());

    codec.open();
    assert!(session.wait_all(WAIT));
    assert!(wait_until(WAIT, || session.pipeline().queue().stats().completed() == 2));
    session.poll();

    assert_eq!(session.len(), 1);
    assert!(session.file(kept).unwrap().preview.is_some());
    assert!(session.files().all(|r| r.id != removed));
}

#[test]
fn poll_reports_updates_once() {
    let mut session = UploadSession::new(inline_config());
    let id = session.add_file("a.jpg", "image/jpeg", jpeg_bytes(400, 300)).unwrap();

    assert!(wait_until(WAIT, || {
        session.poll();
        session.preview_state(id) == Some(PreviewState::Ready)
    }));
    assert_eq!(session.poll(), 0);
}

#[test]
fn uploader_status_drives_counts() {
    let mut session = UploadSession::new(inline_config());
    let ids: Vec<u64> = (0..4)
        .map(|i| session.add_remote(format!("{}.jpg", i), format!("https://cdn.example/{}.jpg", i)))
        .collect();

    session.set_status(ids[0], UploadStatus::Uploading, 40);
    session.set_status(ids[1], UploadStatus::Success, 100);
    session.set_status(ids[2], UploadStatus::Error, 0);

    let counts = session.counts();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.uploading, 1);
    assert_eq!(counts.success, 1);
    assert_eq!(counts.error, 1);
}

#[test]
fn session_serializes_records() {
    let mut session = UploadSession::new(inline_config());
    session.add_remote("hero.jpg", "https://cdn.example/hero.jpg");

    let records: Vec<_> = session.files().collect();
    let json = serde_json::to_value(&records).unwrap();

    assert_eq!(json[0]["name"], "hero.jpg");
    assert_eq!(json[0]["status"], "pending");
    assert_eq!(json[0]["preview"], "https://cdn.example/hero.jpg");
}
