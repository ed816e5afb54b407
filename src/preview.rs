//! Per-file preview orchestration
//!
//! `FilePreview` sequences one selected file through progressive reveal:
//!
//! 1. Remote sources are shown as-is.
//! 2. A cached full preview is shown immediately.
//! 3. Otherwise the tiny placeholder and the full downscale are requested
//!    together. The placeholder is shown until the full preview lands.
//!
//! Once the full preview is set, the placeholder is never shown again, no
//! matter in which order results arrive. After `cancel`, every late result
//! is discarded.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use crate::blob::{ImageKey, ImageSource};
use crate::pipeline::PreviewPipeline;
use crate::types::Preview;

/// Longest single block inside `wait_ready`, so placeholders keep flowing
const WAIT_SLICE: Duration = Duration::from_millis(10);

/// Where a file is in the preview lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    /// Local image waiting for its first lookup
    LocalPending,
    /// Full downscale queued or running (the placeholder runs alongside)
    Downscaling,
    /// Final preview available
    Ready,
    /// File removed before the final preview arrived
    Cancelled,
}

/// Preview controller for one file.
pub struct FilePreview {
    source: ImageSource,
    state: PreviewState,
    full: Option<Preview>,
    tiny: Option<Preview>,
    full_rx: Option<Receiver<Preview>>,
    tiny_rx: Option<Receiver<Preview>>,
}

impl FilePreview {
    /// Begin previewing `source`.
    pub fn start(source: ImageSource, pipeline: &PreviewPipeline) -> Self {
        let mut preview = Self {
            source: source.clone(),
            state: PreviewState::LocalPending,
            full: None,
            tiny: None,
            full_rx: None,
            tiny_rx: None,
        };

        let key = match source {
            ImageSource::Remote(url) => {
                preview.full = Some(Preview::Remote(url));
                preview.state = PreviewState::Ready;
                return preview;
            }
            ImageSource::Local(key) => key,
        };

        if let Some(hit) = pipeline.peek_full(key) {
            preview.full = Some(hit);
            preview.state = PreviewState::Ready;
            return preview;
        }

        match pipeline.peek_tiny(key) {
            Some(tiny) => preview.tiny = Some(tiny),
            None => {
                let (tx, rx) = channel();
                if pipeline.spawn_tiny(key, move |tiny| {
                    let _ = tx.send(tiny);
                }) {
                    preview.tiny_rx = Some(rx);
                }
            }
        }

        preview.full_rx = Some(pipeline.request_full(key));
        preview.state = PreviewState::Downscaling;
        preview
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        matches!(
            self.state,
            PreviewState::LocalPending | PreviewState::Downscaling
        )
    }

    /// Best preview to show right now: full, else placeholder.
    pub fn display(&self) -> Option<&Preview> {
        if self.state == PreviewState::Cancelled {
            return None;
        }
        self.full.as_ref().or(self.tiny.as_ref())
    }

    /// `display` as an image `src` string
    pub fn display_src(&self) -> Option<String> {
        self.display().map(Preview::as_src)
    }

    /// The placeholder, while it is still the thing being shown
    pub fn tiny(&self) -> Option<&Preview> {
        self.tiny.as_ref()
    }

    pub fn full(&self) -> Option<&Preview> {
        self.full.as_ref()
    }

    /// Apply any results that have arrived. Returns true if `display` changed.
    pub fn poll(&mut self) -> bool {
        if self.state == PreviewState::Cancelled {
            return false;
        }

        let mut changed = false;

        if let Some(rx) = &self.full_rx {
            match rx.try_recv() {
                Ok(full) => {
                    self.apply_full(full);
                    changed = true;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.apply_full(self.fallback());
                    changed = true;
                }
            }
        }

        if let Some(rx) = &self.tiny_rx {
            match rx.try_recv() {
                Ok(tiny) => {
                    self.tiny_rx = None;
                    // A late placeholder must not replace the final preview
                    if self.full.is_none() {
                        self.tiny = Some(tiny);
                        changed = true;
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.tiny_rx = None,
            }
        }

        changed
    }

    /// Poll until the full preview arrives or `timeout` passes.
    pub fn wait_ready(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            match self.state {
                PreviewState::Ready => return true,
                PreviewState::Cancelled => return false,
                _ => {}
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            let Some(rx) = &self.full_rx else {
                return false;
            };
            match rx.recv_timeout(remaining.min(WAIT_SLICE)) {
                Ok(full) => self.apply_full(full),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => self.apply_full(self.fallback()),
            }
        }
    }

    /// Stop tracking this file and free its local image.
    ///
    /// Work already queued still runs to completion; its result is dropped.
    pub fn cancel(&mut self, pipeline: &PreviewPipeline) {
        if self.state == PreviewState::Cancelled {
            return;
        }
        self.state = PreviewState::Cancelled;
        self.full_rx = None;
        self.tiny_rx = None;
        self.tiny = None;
        self.full = None;

        if let Some(key) = self.local_key() {
            if pipeline.blobs().release(key) {
                tracing::debug!(%key, "cancelled preview released its local image");
            }
        }
    }

    fn apply_full(&mut self, full: Preview) {
        self.full = Some(full);
        self.tiny = None;
        self.full_rx = None;
        self.tiny_rx = None;
        self.state = PreviewState::Ready;
    }

    /// Shown when the full job vanished without a result
    fn fallback(&self) -> Preview {
        match &self.source {
            ImageSource::Local(key) => Preview::Source(*key),
            ImageSource::Remote(url) => Preview::Remote(url.clone()),
        }
    }

    fn local_key(&self) -> Option<ImageKey> {
        self.source.local_key()
    }
}
