//! Caller-supplied execution queue for periodic-time callbacks.
//!
//! A [`TaskQueue`] is a named worker thread draining boxed jobs FIFO from a
//! crossbeam channel. The periodic-time source posts its callbacks onto one
//! of these instead of invoking them on the ticker thread, mirroring the
//! queue parameter of the native periodic-time API.

use crossbeam_channel::{Sender, unbounded};

type Job = Box<dyn FnOnce() + Send>;

/// Handle to a FIFO worker thread.
///
/// Clones share the same worker. The worker exits once every handle has
/// been dropped and the backlog is drained.
#[derive(Clone)]
pub struct TaskQueue {
    tx: Sender<Job>,
}

impl TaskQueue {
    /// Spawn a worker thread with the given name.
    pub fn new(name: &str) -> Self {
        let (tx, rx) = unbounded::<Job>();
        let thread_name = name.to_string();
        let spawned = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                tracing::debug!(queue = %thread_name, "task queue worker started");
                for job in rx {
                    job();
                }
                tracing::debug!(queue = %thread_name, "task queue worker exiting");
            });
        if let Err(err) = spawned {
            tracing::warn!("failed to spawn task queue worker: {err}");
        }
        Self { tx }
    }

    /// Enqueue a job; runs after everything already queued.
    ///
    /// Jobs posted after the worker is gone are dropped.
    pub fn run(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Box::new(job));
    }
}
