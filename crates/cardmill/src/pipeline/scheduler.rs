//! Task scheduling seam between the pipeline and the async runtime.
//!
//! Production uses `TokioScheduler` (fire-and-forget `tokio::spawn`);
//! tests use `InlineScheduler` to drive spawned jobs deterministically.

use std::sync::Mutex;

use futures_util::future::BoxFuture;

/// Spawns pipeline job futures.
pub trait Scheduler: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Schedules jobs on the tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}

/// Collects spawned futures and runs them only when asked, so tests can
/// observe the queued state and control exactly when a job executes.
#[derive(Default)]
pub struct InlineScheduler {
    pending: Mutex<Vec<BoxFuture<'static, ()>>>,
}

impl InlineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Runs tasks to completion, in spawn order, until none remain.
    /// Tasks spawned while running are picked up too.
    pub async fn run_pending(&self) {
        loop {
            let batch: Vec<_> = std::mem::take(&mut *self.pending.lock().unwrap());
            if batch.is_empty() {
                break;
            }
            for task in batch {
                task.await;
            }
        }
    }
}

impl Scheduler for InlineScheduler {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.pending.lock().unwrap().push(task);
    }
}
