//! Bounded-concurrency task queue
//!
//! A fixed pool of slot threads pulls boxed tasks from one shared channel.
//! Tasks are admitted in FIFO order and at most `max_concurrency` run at
//! once; a slot takes the next task as soon as its current one returns or
//! panics. The queue itself is unbounded.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Default number of tasks allowed to run at once
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Live counters for a `TaskQueue`.
#[derive(Debug, Default)]
pub struct QueueStats {
    queued: AtomicUsize,
    active: AtomicUsize,
    peak_active: AtomicUsize,
    completed: AtomicUsize,
}

impl QueueStats {
    /// Tasks waiting for a slot
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Tasks currently running
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest `active` value observed so far
    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    /// Tasks that finished, including ones that panicked
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn start(&self) {
        self.queued.fetch_sub(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Result of an enqueued task.
pub struct TaskHandle<T> {
    rx: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block until the task finishes. `None` if it panicked.
    pub fn wait(self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Block for at most `timeout`. `None` on timeout or panic.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Non-blocking check for the result
    pub fn try_take(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// FIFO queue running at most `max_concurrency` tasks at a time.
pub struct TaskQueue {
    /// Channel sender for tasks
    task_tx: Mutex<Sender<Task>>,
    stats: Arc<QueueStats>,
    max_concurrency: usize,
}

impl TaskQueue {
    /// Create a queue with `max_concurrency` slots (at least 1).
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        let (task_tx, task_rx) = channel::<Task>();
        let stats = Arc::new(QueueStats::default());

        spawn_slots(max_concurrency, task_rx, Arc::clone(&stats));

        Self {
            task_tx: Mutex::new(task_tx),
            stats,
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Queue `task` and return a handle to its result.
    pub fn enqueue<T, F>(&self, task: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = channel();
        let boxed: Task = Box::new(move || {
            // Ignore send errors (caller may have dropped the handle)
            let _ = result_tx.send(task());
        });

        self.stats.queued.fetch_add(1, Ordering::SeqCst);
        let sent = self
            .task_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .send(boxed);
        if sent.is_err() {
            // All slots are gone; the handle resolves to None
            self.stats.queued.fetch_sub(1, Ordering::SeqCst);
            tracing::warn!("task queue has no running slots");
        }

        TaskHandle { rx: result_rx }
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

/// Spawn the slot threads. Each exits when the task channel closes.
fn spawn_slots(count: usize, task_rx: Receiver<Task>, stats: Arc<QueueStats>) {
    let task_rx = Arc::new(Mutex::new(task_rx));

    for i in 0..count {
        let rx = Arc::clone(&task_rx);
        let stats = Arc::clone(&stats);

        let spawned = thread::Builder::new()
            .name(format!("preview-queue-{}", i))
            .spawn(move || loop {
                let task = {
                    let rx = rx.lock().unwrap_or_else(|e| e.into_inner());
                    match rx.recv() {
                        Ok(task) => task,
                        Err(_) => return, // channel closed
                    }
                };

                stats.start();
                if catch_unwind(AssertUnwindSafe(task)).is_err() {
                    tracing::warn!("queued task panicked");
                }
                stats.finish();
            });

        if let Err(e) = spawned {
            tracing::warn!(slot = i, error = %e, "failed to spawn queue slot");
        }
    }
}
