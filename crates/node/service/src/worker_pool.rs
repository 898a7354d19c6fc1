//! A bounded pool for CPU-heavy work.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

/// An error executing work on the [`WorkerPool`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerPoolError {
    /// The pool was closed and no longer accepts work.
    #[error("Worker pool is closed")]
    Closed,
    /// The work panicked.
    #[error("Worker pool task panicked")]
    Panicked,
}

/// Runs CPU-heavy closures on the blocking thread pool, at most `size` at a time.
///
/// Callers await the result without blocking the scheduler. Clones share the same bound.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Creates a pool running at most `size` closures concurrently.
    pub fn new(size: usize) -> Self {
        Self { permits: Arc::new(Semaphore::new(size.max(1))), size: size.max(1) }
    }

    /// Returns the maximum number of concurrently running closures.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of closures that could start right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Closes the pool. Queued and future calls to [`Self::execute`] fail with
    /// [`WorkerPoolError::Closed`]; running closures complete.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Runs `work` on the blocking thread pool once a slot is free and returns its output.
    pub async fn execute<F, T>(&self, work: F) -> Result<T, WorkerPoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit =
            Arc::clone(&self.permits).acquire_owned().await.map_err(|_| WorkerPoolError::Closed)?;
        coordinator_macros::set!(gauge, crate::Metrics::WORKER_POOL_BUSY, self.busy());

        let result = tokio::task::spawn_blocking(move || {
            // The slot is released when the work is done, even if the caller went away.
            let _permit = permit;
            work()
        })
        .await;

        coordinator_macros::set!(gauge, crate::Metrics::WORKER_POOL_BUSY, self.busy());
        result.map_err(|err| {
            if err.is_panic() {
                error!(target: "worker_pool", "Worker pool task panicked");
                WorkerPoolError::Panicked
            } else {
                WorkerPoolError::Closed
            }
        })
    }

    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn busy(&self) -> usize {
        self.size.saturating_sub(self.available())
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(std::thread::available_parallelism().map(usize::from).unwrap_or(1))
    }
}
