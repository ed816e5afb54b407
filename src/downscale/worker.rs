//! Background downscale worker
//!
//! A dedicated thread owns the CPU-heavy decode/resize/encode work. The
//! boundary is message passing only: each request carries a `RequestId`,
//! the worker echoes it on the reply, and a router thread hands replies to
//! the caller waiting on that id. Replies nobody is waiting for are dropped.
//!
//! If the worker thread cannot be started or has exited, requests resolve
//! as `WorkerOutcome::Unavailable` immediately instead of blocking.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use super::{downscale_bytes, DownscaleJob, DownscaleSettings, EncodedPreview};
use crate::error::PreviewError;
use crate::raster::ImageCodec;

/// Correlation id attached to a worker request and echoed on its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Errors reported by the worker.
pub type WorkerError = PreviewError;

/// Message sent to the worker thread
#[derive(Debug)]
pub struct WorkerRequest {
    pub id: RequestId,
    pub bytes: Arc<[u8]>,
    pub settings: DownscaleSettings,
}

/// Message sent back by the worker thread
#[derive(Debug)]
pub struct WorkerResponse {
    pub id: RequestId,
    pub outcome: Result<EncodedPreview, WorkerError>,
}

/// What a caller gets back from `WorkerDownscaler::downscale`.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome {
    Done(EncodedPreview),
    /// The worker ran and reported an error
    Failed(WorkerError),
    /// No worker to talk to; the caller should fall back
    Unavailable,
}

type PendingReplies = Arc<Mutex<HashMap<RequestId, Sender<WorkerResponse>>>>;

/// Client side of the background worker.
pub struct WorkerDownscaler {
    /// Request channel into the worker; `None` after shutdown
    requests: Mutex<Option<Sender<WorkerRequest>>>,
    /// Callers waiting for a reply, by correlation id
    pending: PendingReplies,
    /// Cleared by the router once the worker is gone
    alive: Arc<AtomicBool>,
    next_id: AtomicU64,
}

impl WorkerDownscaler {
    /// Start the worker and reply-router threads.
    pub fn spawn(codec: Arc<dyn ImageCodec>) -> io::Result<Self> {
        let (request_tx, request_rx) = channel::<WorkerRequest>();
        let (reply_tx, reply_rx) = channel::<WorkerResponse>();

        thread::Builder::new()
            .name("preview-worker".to_string())
            .spawn(move || worker_loop(codec, request_rx, reply_tx))?;

        let pending: PendingReplies = Arc::new(Mutex::new(HashMap::new()));
        let alive = Arc::new(AtomicBool::new(true));

        let router_pending = Arc::clone(&pending);
        let router_alive = Arc::clone(&alive);
        // If this fails, request_tx is dropped on return and the worker exits
        thread::Builder::new()
            .name("preview-worker-router".to_string())
            .spawn(move || route_replies(reply_rx, router_pending, router_alive))?;

        tracing::debug!("preview worker started");
        Ok(Self {
            requests: Mutex::new(Some(request_tx)),
            pending,
            alive,
            next_id: AtomicU64::new(1),
        })
    }

    /// Whether the worker is still accepting requests
    pub fn is_available(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && lock(&self.requests).is_some()
    }

    /// Send `job` to the worker and block until its reply arrives.
    pub fn downscale(&self, job: &DownscaleJob) -> WorkerOutcome {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (reply_tx, reply_rx) = channel();

        {
            // Registration and the router's shutdown sweep share this lock,
            // so a registered caller is always either answered or released.
            let mut pending = lock(&self.pending);
            if !self.alive.load(Ordering::SeqCst) {
                return WorkerOutcome::Unavailable;
            }
            pending.insert(id, reply_tx);
        }

        let request = WorkerRequest {
            id,
            bytes: Arc::clone(&job.bytes),
            settings: job.settings.clone(),
        };
        let sent = match lock(&self.requests).as_ref() {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        };
        if !sent {
            lock(&self.pending).remove(&id);
            return WorkerOutcome::Unavailable;
        }

        loop {
            match reply_rx.recv() {
                Ok(reply) if reply.id == id => {
                    return match reply.outcome {
                        Ok(preview) => WorkerOutcome::Done(preview),
                        Err(err) => WorkerOutcome::Failed(err),
                    };
                }
                Ok(reply) => {
                    tracing::trace!(expected = %id, got = %reply.id, "discarding mismatched reply");
                }
                Err(_) => return WorkerOutcome::Unavailable,
            }
        }
    }

    /// Close the request channel. The worker finishes its current job and
    /// exits; later requests resolve as `Unavailable`.
    pub fn shutdown(&self) {
        lock(&self.requests).take();
    }
}

impl Drop for WorkerDownscaler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Worker thread body: one request at a time until the channel closes.
fn worker_loop(
    codec: Arc<dyn ImageCodec>,
    requests: Receiver<WorkerRequest>,
    replies: Sender<WorkerResponse>,
) {
    while let Ok(request) = requests.recv() {
        let outcome = handle_request(codec.as_ref(), &request);
        if replies
            .send(WorkerResponse {
                id: request.id,
                outcome,
            })
            .is_err()
        {
            return;
        }
    }
    tracing::debug!("preview worker stopped");
}

fn handle_request(
    codec: &dyn ImageCodec,
    request: &WorkerRequest,
) -> Result<EncodedPreview, WorkerError> {
    if !codec.offscreen_available() {
        return Err(PreviewError::SurfaceUnavailable);
    }

    catch_unwind(AssertUnwindSafe(|| {
        downscale_bytes(codec, &request.bytes, &request.settings)
    }))
    .unwrap_or_else(|panic| Err(PreviewError::Panicked(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Router thread body: deliver each reply to the caller registered for its id.
fn route_replies(replies: Receiver<WorkerResponse>, pending: PendingReplies, alive: Arc<AtomicBool>) {
    while let Ok(reply) = replies.recv() {
        let waiter = lock(&pending).remove(&reply.id);
        match waiter {
            // The caller may have given up; nothing to do then
            Some(tx) => {
                let _ = tx.send(reply);
            }
            None => tracing::trace!(id = %reply.id, "no caller for worker reply"),
        }
    }

    // Worker is gone: fail every waiter instead of leaving it blocked
    let mut pending = lock(&pending);
    alive.store(false, Ordering::SeqCst);
    pending.clear();
}
