//! Task scope
//!
//! Every background task a mounted view starts lives in one scope. Cancelling
//! the scope, or dropping its last handle, aborts them all. The backend is not
//! told; in-flight calls are simply abandoned.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Cancellation scope for a view's background work
#[derive(Debug, Clone, Default)]
pub struct TaskScope {
    inner: Arc<Mutex<ScopeInner>>,
}

#[derive(Debug, Default)]
struct ScopeInner {
    tasks: JoinSet<()>,
    cancelled: bool,
}

impl TaskScope {
    /// Create empty scope
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` inside the scope
    ///
    /// Returns `false` without spawning if the scope was cancelled.
    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut inner = self.inner.lock();
        if inner.cancelled {
            return false;
        }
        // Reap finished tasks so the set only holds live work.
        while inner.tasks.try_join_next().is_some() {}
        inner.tasks.spawn(task);
        true
    }

    /// Abort every task and refuse new ones
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        if !inner.cancelled {
            inner.cancelled = true;
            inner.tasks.abort_all();
            tracing::debug!("task scope cancelled");
        }
    }

    /// Whether `cancel` was called
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().cancelled
    }

    /// Number of tasks not yet reaped
    #[must_use]
    pub fn live_tasks(&self) -> usize {
        let mut inner = self.inner.lock();
        while inner.tasks.try_join_next().is_some() {}
        inner.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_running_tasks() {
        let scope = TaskScope::new();
        let finished = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&finished);
        assert!(scope.spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            flag.store(true, Ordering::SeqCst);
        }));

        tokio::task::yield_now().await;
        scope.cancel();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!finished.load(Ordering::SeqCst));
        assert!(scope.is_cancelled());
        assert!(!scope.spawn(async {}));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_last_handle_aborts_tasks() {
        let finished = Arc::new(AtomicBool::new(false));
        {
            let scope = TaskScope::new();
            let flag = Arc::clone(&finished);
            scope.spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                flag.store(true, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_tasks_are_reaped() {
        let scope = TaskScope::new();
        scope.spawn(async {});
        scope.spawn(async {});

        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(scope.live_tasks(), 0);
    }
}
