//! Completion gate for a dynamically growing set of tasks
//!
//! The gate keeps a tally of outstanding tasks. Each dispatched task holds a
//! [`TaskGuard`] for its whole lifetime and a parent always registers its
//! children before its own guard is released, so the tally can only reach
//! zero once no running task is left that could dispatch more work.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct GateInner {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Reference-counted outstanding-task tally
#[derive(Debug, Clone, Default)]
pub struct CompletionGate {
    inner: Arc<GateInner>,
}

/// Registration of one outstanding task
///
/// Dropping the guard settles the task, whether it finished normally,
/// panicked, or was aborted.
#[derive(Debug)]
#[must_use = "the task settles as soon as the guard is dropped"]
pub struct TaskGuard {
    inner: Arc<GateInner>,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new outstanding task
    pub fn enter(&self) -> TaskGuard {
        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
        TaskGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of tasks dispatched but not yet settled
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Waits until every registered task has settled
    ///
    /// Tasks registered while waiting are included. Returns immediately if
    /// nothing is outstanding.
    pub async fn wait(&self) {
        loop {
            // Register interest before checking the tally so a wake-up sent
            // between the check and the await is not lost.
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
