//! Upload session file list
//!
//! An `UploadSession` owns the preview pipeline and the list of files the
//! user has selected. The uploader drives `status` and `progress`; the
//! preview path only ever writes `FileRecord::preview`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::blob::ImageSource;
use crate::config::Config;
use crate::pipeline::PreviewPipeline;
use crate::preview::{FilePreview, PreviewState};

/// Prefix a selected file's MIME type must carry to be accepted
const IMAGE_MIME_PREFIX: &str = "image/";

/// Upload state of a file, as reported by the uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

/// One selected file and its current preview.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub id: u64,
    pub name: String,
    pub mime_type: String,
    /// Original size in bytes
    pub size: u64,
    pub status: UploadStatus,
    /// Upload progress, 0-100
    pub progress: u8,
    /// Best preview available right now, as an image `src`
    pub preview: Option<String>,
}

impl FileRecord {
    /// Size in megabytes with one decimal, e.g. `"2.4 MB"`
    pub fn size_label(&self) -> String {
        format!("{:.1} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}

/// Per-status file totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub uploading: usize,
    pub success: usize,
    pub error: usize,
}

struct Entry {
    record: FileRecord,
    preview: FilePreview,
}

/// The files selected for one photo-session upload.
pub struct UploadSession {
    pipeline: PreviewPipeline,
    entries: Vec<Entry>,
    next_id: u64,
}

impl UploadSession {
    pub fn new(config: Config) -> Self {
        Self::with_pipeline(PreviewPipeline::new(config))
    }

    /// Session over an existing pipeline (custom codec, tests).
    pub fn with_pipeline(pipeline: PreviewPipeline) -> Self {
        Self {
            pipeline,
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn pipeline(&self) -> &PreviewPipeline {
        &self.pipeline
    }

    /// Add a selected local file and start its preview.
    ///
    /// Returns `None` without touching the session if the file is not an image.
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Option<u64> {
        let name = name.into();
        let mime_type = mime_type.into();
        if !mime_type.starts_with(IMAGE_MIME_PREFIX) {
            tracing::debug!(%name, %mime_type, "skipping non-image file");
            return None;
        }

        let size = bytes.len() as u64;
        let key = self.pipeline.add_local(bytes);
        let preview = FilePreview::start(ImageSource::Local(key), &self.pipeline);
        Some(self.push(name, mime_type, size, preview))
    }

    /// Add an already published photo shown from its remote URL.
    pub fn add_remote(&mut self, name: impl Into<String>, url: impl Into<String>) -> u64 {
        let preview = FilePreview::start(ImageSource::Remote(url.into()), &self.pipeline);
        self.push(name.into(), String::new(), 0, preview)
    }

    fn push(&mut self, name: String, mime_type: String, size: u64, preview: FilePreview) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let record = FileRecord {
            id,
            name,
            mime_type,
            size,
            status: UploadStatus::Pending,
            progress: 0,
            preview: preview.display_src(),
        };
        self.entries.push(Entry { record, preview });
        id
    }

    /// Remove a file, cancelling its preview. Returns false if unknown.
    pub fn remove_file(&mut self, id: u64) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.record.id == id) else {
            return false;
        };
        let mut entry = self.entries.remove(index);
        entry.preview.cancel(&self.pipeline);
        true
    }

    /// Apply finished preview work. Returns the number of records updated.
    pub fn poll(&mut self) -> usize {
        let mut updated = 0;
        for entry in &mut self.entries {
            if entry.preview.poll() {
                entry.record.preview = entry.preview.display_src();
                updated += 1;
            }
        }
        updated
    }

    /// Poll until every preview is ready or `timeout` passes.
    ///
    /// Returns true if nothing is still processing.
    pub fn wait_all(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        for entry in &mut self.entries {
            let remaining = deadline.saturating_duration_since(Instant::now());
            entry.preview.wait_ready(remaining);
        }
        self.poll();
        // wait_ready applies results without touching the records
        for entry in &mut self.entries {
            entry.record.preview = entry.preview.display_src();
        }
        !self.entries.iter().any(|e| e.preview.is_processing())
    }

    /// Record upload progress from the uploader.
    pub fn set_status(&mut self, id: u64, status: UploadStatus, progress: u8) -> bool {
        match self.entries.iter_mut().find(|e| e.record.id == id) {
            Some(entry) => {
                entry.record.status = status;
                entry.record.progress = progress.min(100);
                true
            }
            None => false,
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn file(&self, id: u64) -> Option<&FileRecord> {
        self.entries.iter().map(|e| &e.record).find(|r| r.id == id)
    }

    pub fn preview(&self, id: u64) -> Option<&FilePreview> {
        self.entries
            .iter()
            .find(|e| e.record.id == id)
            .map(|e| &e.preview)
    }

    pub fn preview_state(&self, id: u64) -> Option<PreviewState> {
        self.preview(id).map(FilePreview::state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for record in self.files() {
            match record.status {
                UploadStatus::Pending => counts.pending += 1,
                UploadStatus::Uploading => counts.uploading += 1,
                UploadStatus::Success => counts.success += 1,
                UploadStatus::Error => counts.error += 1,
            }
        }
        counts
    }
}
