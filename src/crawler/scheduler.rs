//! Scheduler for running crawl tasks concurrently
//!
//! This module handles:
//! - Spawning dispatched tasks on the tokio runtime
//! - Global concurrency limiting via a semaphore
//! - Registering every task with the completion gate

use crate::crawler::gate::CompletionGate;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Scheduler runs dispatched tasks under a global concurrency limit
///
/// Dispatch never blocks: the semaphore permit is acquired inside the
/// spawned task. A page task that holds a permit can therefore dispatch its
/// children without waiting on permits it is itself keeping busy.
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    global_semaphore: Arc<Semaphore>,

    /// Outstanding-task tally
    gate: CompletionGate,

    /// Total tasks dispatched over the scheduler's lifetime
    dispatched: AtomicUsize,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum number of tasks running at once (at least 1)
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            global_semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            gate: CompletionGate::new(),
            dispatched: AtomicUsize::new(0),
        }
    }

    /// Spawns a task and registers it with the completion gate
    ///
    /// The task is counted as outstanding from this call until it finishes,
    /// including the time it spends waiting for a permit.
    pub fn dispatch<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let guard = self.gate.enter();
        let semaphore = Arc::clone(&self.global_semaphore);
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            let _guard = guard;
            match semaphore.acquire_owned().await {
                Ok(_permit) => task.await,
                Err(_) => tracing::error!("Scheduler semaphore closed; dropping task"),
            }
        });
    }

    /// Waits until every dispatched task, including ones dispatched while
    /// waiting, has settled
    pub async fn wait_idle(&self) {
        self.gate.wait().await;
    }

    /// Number of tasks dispatched but not yet settled
    pub fn outstanding(&self) -> usize {
        self.gate.outstanding()
    }

    /// Total number of tasks dispatched so far
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::Relaxed)
    }
}
