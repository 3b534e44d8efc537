//! Tracked background execution for pipeline runs.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::error;

/// Owns the background tasks spawned for accepted submissions.
///
/// Unlike a bare `tokio::spawn`, handles are retained so shutdown and tests
/// can wait for in-flight runs with [`WorkerPool::join`]. Panics inside a
/// run are reported, never propagated.
#[derive(Default)]
pub struct WorkerPool {
    handles: Mutex<Vec<(String, JoinHandle<()>)>>,
}

impl WorkerPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a labelled background task and tracks its handle.
    pub fn spawn<F>(&self, label: impl Into<String>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((label.into(), handle));
    }

    /// Waits for every task spawned so far to finish.
    pub async fn join(&self) {
        let drained: Vec<(String, JoinHandle<()>)> = {
            let mut handles = self
                .handles
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            handles.drain(..).collect()
        };
        for (label, handle) in drained {
            if let Err(err) = handle.await {
                error!(label = %label, error = %err, "pipeline worker terminated abnormally");
            }
        }
    }

    /// Returns how many tasks are currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
