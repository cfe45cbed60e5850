//! Bounded pool for CPU-bound optimization work.
//!
//! Each job runs on tokio's blocking thread pool, but no more than `size`
//! jobs run at once; later requests wait for a permit.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::{EngineError, EngineResult};

/// Semaphore-guarded `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct OptimizationPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl OptimizationPool {
    /// Pool running at most `size` jobs concurrently (minimum 1).
    #[must_use]
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Pool sized to the available CPU cores.
    #[must_use]
    pub fn with_available_parallelism() -> Self {
        Self::new(std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get))
    }

    /// Maximum concurrent jobs.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits currently free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Runs `job` on a blocking thread once a permit is free.
    pub async fn run<T, F>(&self, job: F) -> EngineResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> EngineResult<T> + Send + 'static,
    {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| EngineError::Internal(format!("optimization pool closed: {e}")))?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await?
    }
}

impl Default for OptimizationPool {
    fn default() -> Self {
        Self::with_available_parallelism()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_runs_job() {
        let pool = OptimizationPool::new(2);
        let value = pool.run(|| Ok(21 * 2)).await.unwrap();
        assert_eq!(value, 42);
        assert_eq!(pool.available(), 2);
    }

    #[tokio::test]
    async fn test_propagates_error() {
        let pool = OptimizationPool::new(1);
        let err = pool
            .run(|| -> EngineResult<()> { Err(EngineError::Internal("boom".into())) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "internal");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bounds_concurrency() {
        let pool = OptimizationPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let jobs: Vec<_> = (0..6)
            .map(|_| {
                let pool = pool.clone();
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    pool.run(move || {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(20));
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .await
                })
            })
            .collect();
        for job in jobs {
            job.await.unwrap().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_minimum_size() {
        assert_eq!(OptimizationPool::new(0).size(), 1);
    }
}
