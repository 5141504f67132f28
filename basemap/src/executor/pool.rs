//! Fixed-size worker pool with a synchronized FIFO queue.
//!
//! Workers block on an empty queue via a condition variable and are woken
//! by either a new job or shutdown. Shutdown lets workers drain whatever
//! was queued before the flag was set; callers must stop enqueuing before
//! requesting shutdown or late jobs may be silently dropped.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

/// Fallback when the hardware concurrency cannot be detected.
const FALLBACK_CPU_COUNT: usize = 4;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Default pool size: one thread per core, minus one for the controller
/// thread, never less than one.
pub fn default_worker_count() -> usize {
    let cpus = thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(FALLBACK_CPU_COUNT);
    cpus.saturating_sub(1).max(1)
}

struct PoolShared {
    queue: Mutex<VecDeque<Job>>,
    work_available: Condvar,
    shutting_down: AtomicBool,
}

/// Fixed pool of background worker threads consuming a FIFO job queue.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn a pool with the default thread count.
    pub fn new() -> Self {
        Self::with_workers(default_worker_count())
    }

    /// Spawn a pool with an explicit thread count (clamped to ≥ 1).
    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        let shared = Arc::new(PoolShared {
            queue: Mutex::new(VecDeque::new()),
            work_available: Condvar::new(),
            shutting_down: AtomicBool::new(false),
        });

        let handles = (0..workers)
            .map(|id| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("tile-worker-{id}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        debug!(workers, "worker pool started");

        Self {
            shared,
            workers: handles,
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue a job. Never blocks; safe from any thread.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.queue.lock().push_back(Box::new(job));
        self.shared.work_available.notify_one();
    }

    /// Request shutdown and join all workers.
    ///
    /// Jobs already queued at this point are still executed; the caller
    /// must have stopped enqueuing.
    pub fn shutdown(mut self) {
        self.begin_shutdown();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }

    fn begin_shutdown(&self) {
        self.shared.shutting_down.store(true, Ordering::SeqCst);
        self.shared.work_available.notify_all();
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.begin_shutdown();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: &PoolShared) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(job) = queue.pop_front() {
                    break Some(job);
                }
                if shared.shutting_down.load(Ordering::SeqCst) {
                    break None;
                }
                shared.work_available.wait(&mut queue);
            }
        };

        match job {
            Some(job) => job(),
            None => return,
        }
    }
}
