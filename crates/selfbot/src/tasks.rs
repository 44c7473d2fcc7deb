//! Delayed tasks owned by the application.

use futures::FutureExt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Runs futures after a delay and cancels whatever is still pending on
/// [`shutdown`](Self::shutdown).
#[derive(Default)]
pub struct TaskScheduler {
    tasks: Mutex<JoinSet<()>>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has elapsed.
    pub async fn schedule_after<F>(&self, name: &'static str, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        reap_finished(&mut tasks);

        tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Running scheduled task: {}", name);
            task.await;
        });
        debug!("Scheduled {} in {:?} ({} pending)", name, delay, tasks.len());
    }

    /// Number of tasks that have not finished yet.
    pub async fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock().await;
        reap_finished(&mut tasks);
        tasks.len()
    }

    /// Abort every pending task and wait for them to wind down.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        let count = tasks.len();
        tasks.abort_all();

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    warn!("Scheduled task failed: {}", e);
                }
            }
        }

        if count > 0 {
            debug!("Cancelled {} scheduled tasks", count);
        }
    }
}

fn reap_finished(tasks: &mut JoinSet<()>) {
    while let Some(Some(result)) = tasks.join_next().now_or_never() {
        if let Err(e) = result {
            warn!("Scheduled task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_task_runs_after_delay() {
        let scheduler = TaskScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        scheduler
            .schedule_after("count", Duration::from_millis(10), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending().await, 0);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_tasks() {
        let scheduler = TaskScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        scheduler
            .schedule_after("never", Duration::from_secs(60), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert_eq!(scheduler.pending().await, 1);

        scheduler.shutdown().await;

        assert_eq!(scheduler.pending().await, 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
