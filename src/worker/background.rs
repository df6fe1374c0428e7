//! Detached work that extends an event's lifetime
//!
//! A fetch handler hands its response back before the cache write finishes.
//! The write is parked here so the host can await it (`settle`) before
//! treating the event as complete or shutting the worker down.

use std::future::Future;
use std::sync::Mutex;
use tokio::task::JoinSet;
use tracing::warn;

/// Set of in-flight detached tasks
#[derive(Debug, Default)]
pub struct BackgroundTasks {
    tasks: Mutex<JoinSet<()>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` on the runtime, tracked until the next `settle`
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .spawn(task);
    }

    /// Tasks spawned and not yet collected by `settle`
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Wait for every tracked task, including ones spawned while waiting.
    /// Returns how many tasks completed.
    pub async fn settle(&self) -> usize {
        let mut completed = 0;
        loop {
            let mut batch = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|e| e.into_inner()));
            if batch.is_empty() {
                return completed;
            }
            while let Some(result) = batch.join_next().await {
                if let Err(e) = result {
                    warn!("Background task failed: {}", e);
                }
                completed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn settle_waits_for_all_tasks() {
        let tasks = BackgroundTasks::new();
        let done = Arc::new(AtomicUsize::new(0));

        for delay in [30u64, 10, 20] {
            let done = done.clone();
            tasks.spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(tasks.pending(), 3);

        assert_eq!(tasks.settle().await, 3);
        assert_eq!(done.load(Ordering::SeqCst), 3);
        assert_eq!(tasks.pending(), 0);
    }

    #[tokio::test]
    async fn settle_on_empty_returns_zero() {
        let tasks = BackgroundTasks::new();
        assert_eq!(tasks.settle().await, 0);
    }

    #[tokio::test]
    async fn panicking_task_does_not_poison_settle() {
        let tasks = BackgroundTasks::new();
        tasks.spawn(async { panic!("boom") });
        tasks.spawn(async {});
        assert_eq!(tasks.settle().await, 2);
    }
}
