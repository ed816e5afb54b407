//! Per-session preview services
//!
//! `PreviewPipeline` bundles everything the per-file orchestrators share:
//! the blob store, both caches, the codec, the bounded queue and the
//! background worker. One pipeline serves one upload session.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::blob::{BlobStore, ImageKey};
use crate::cache::PreviewCaches;
use crate::config::Config;
use crate::downscale::{commit, DownscaleJob, InlineDownscaler, WorkerDownscaler, WorkerOutcome};
use crate::queue::TaskQueue;
use crate::raster::{ImageCodec, RasterCodec};
use crate::tiny::spawn_tiny;
use crate::types::Preview;

type Waiters = Arc<Mutex<HashMap<ImageKey, Vec<Sender<Preview>>>>>;

/// Shared preview machinery for one upload session.
pub struct PreviewPipeline {
    config: Config,
    codec: Arc<dyn ImageCodec>,
    caches: Arc<PreviewCaches>,
    blobs: Arc<BlobStore>,
    queue: TaskQueue,
    worker: Option<Arc<WorkerDownscaler>>,
    inline: Arc<InlineDownscaler>,
    /// Callers waiting on a full preview job that is queued or running
    in_flight: Waiters,
}

impl PreviewPipeline {
    /// Pipeline backed by the `image` crate codec.
    pub fn new(config: Config) -> Self {
        Self::with_codec(config, Arc::new(RasterCodec::new()))
    }

    /// Pipeline using a custom codec.
    pub fn with_codec(config: Config, codec: Arc<dyn ImageCodec>) -> Self {
        let worker = if config.worker.enabled {
            match WorkerDownscaler::spawn(Arc::clone(&codec)) {
                Ok(worker) => Some(Arc::new(worker)),
                Err(e) => {
                    tracing::warn!(error = %e, "could not start preview worker, downscaling in queue slots");
                    None
                }
            }
        } else {
            None
        };

        let caches = Arc::new(PreviewCaches::new());
        let blobs = Arc::new(BlobStore::new());
        let inline = Arc::new(InlineDownscaler::new(
            Arc::clone(&codec),
            Arc::clone(&caches),
            Arc::clone(&blobs),
        ));

        Self {
            queue: TaskQueue::new(config.queue.max_concurrency),
            config,
            codec,
            caches,
            blobs,
            worker,
            inline,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn caches(&self) -> &PreviewCaches {
        &self.caches
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    /// Whether full previews are first attempted on the background worker
    pub fn has_worker(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| w.is_available())
    }

    /// Register a selected file's bytes as a local image.
    pub fn add_local(&self, bytes: impl Into<Arc<[u8]>>) -> ImageKey {
        self.blobs.create(bytes)
    }

    pub fn peek_full(&self, key: ImageKey) -> Option<Preview> {
        self.caches.full.peek(key)
    }

    pub fn peek_tiny(&self, key: ImageKey) -> Option<Preview> {
        self.caches.tiny.peek(key)
    }

    /// Start tiny placeholder generation off-thread.
    ///
    /// Returns false if the local image was already released, in which case
    /// `on_done` is never called.
    pub fn spawn_tiny<F>(&self, key: ImageKey, on_done: F) -> bool
    where
        F: FnOnce(Preview) + Send + 'static,
    {
        let Some(bytes) = self.blobs.read(key) else {
            return false;
        };
        spawn_tiny(
            Arc::clone(&self.codec),
            Arc::clone(&self.caches),
            key,
            bytes,
            self.config.tiny.clone(),
            on_done,
        );
        true
    }

    /// Request the full preview for `key`.
    ///
    /// Resolves from cache when possible. Concurrent requests for the same
    /// key share one job, so the image is decoded and resized at most once.
    pub fn request_full(&self, key: ImageKey) -> Receiver<Preview> {
        let (tx, rx) = channel();

        if let Some(hit) = self.caches.full.peek(key) {
            let _ = tx.send(hit);
            return rx;
        }

        let job = {
            let mut waiting = lock(&self.in_flight);
            if let Some(waiters) = waiting.get_mut(&key) {
                waiters.push(tx);
                return rx;
            }
            // The previous job may have committed between the peek and the lock
            if let Some(hit) = self.caches.full.peek(key) {
                let _ = tx.send(hit);
                return rx;
            }
            let Some(bytes) = self.blobs.read(key) else {
                tracing::debug!(%key, "full preview requested for released image");
                let _ = tx.send(Preview::Source(key));
                return rx;
            };
            waiting.insert(key, vec![tx]);
            DownscaleJob {
                key,
                bytes,
                settings: self.config.full.clone(),
            }
        };

        let worker = self.worker.clone();
        let inline = Arc::clone(&self.inline);
        let caches = Arc::clone(&self.caches);
        let blobs = Arc::clone(&self.blobs);
        let in_flight = Arc::clone(&self.in_flight);

        self.queue.enqueue(move || {
            // A panicking codec must still resolve every waiter
            let preview = catch_unwind(AssertUnwindSafe(|| {
                run_job(worker.as_deref(), &inline, &caches, &blobs, &job)
            }))
            .unwrap_or_else(|_| {
                tracing::warn!(key = %job.key, "downscale job panicked, showing original");
                Preview::Source(job.key)
            });
            let waiters = lock(&in_flight).remove(&job.key).unwrap_or_default();
            for waiter in waiters {
                // Waiters that went away (cancelled files) are skipped
                let _ = waiter.send(preview.clone());
            }
        });

        rx
    }

    /// Blocking convenience around `request_full`.
    pub fn downscale_now(&self, key: ImageKey) -> Preview {
        self.request_full(key)
            .recv()
            .unwrap_or(Preview::Source(key))
    }
}

/// Worker first, in-slot fallback second.
fn run_job(
    worker: Option<&WorkerDownscaler>,
    inline: &InlineDownscaler,
    caches: &PreviewCaches,
    blobs: &BlobStore,
    job: &DownscaleJob,
) -> Preview {
    let outcome = match worker {
        Some(worker) => worker.downscale(job),
        None => WorkerOutcome::Unavailable,
    };

    match outcome {
        WorkerOutcome::Done(encoded) => commit(caches, blobs, job.key, encoded),
        WorkerOutcome::Failed(err) => {
            tracing::debug!(key = %job.key, error = %err, "worker downscale failed, falling back");
            inline.run(job)
        }
        WorkerOutcome::Unavailable => inline.run(job),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
