//! State store port for pipeline run records.

use crate::pipeline::domain::{RoundNumber, RunKey, TaskRecord, TaskSlug};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for state store operations.
pub type StateStoreResult<T> = Result<T, StateStoreError>;

/// Keyed store of every (task, round) pipeline run.
///
/// The store is the single source of truth for status queries and the
/// enforcement point for duplicate-submission and exclusivity rules. All
/// mutations are atomic with respect to a single task key.
#[async_trait]
pub trait TaskStateStore: Send + Sync {
    /// Atomically admits a new run and stores its record.
    ///
    /// Admission enforces the ordering invariants: an identical
    /// (task, round, nonce) tuple is a duplicate; a non-terminal run for
    /// the same task blocks new submissions; round N > 1 requires round
    /// N − 1 to have completed. A `Failed` round may be resubmitted with a
    /// different nonce, replacing its record.
    ///
    /// # Errors
    ///
    /// Returns the admission-rule violation, or
    /// [`StateStoreError::Persistence`] when the store itself fails.
    async fn begin_run(&self, record: &TaskRecord) -> StateStoreResult<()>;

    /// Persists changes to an existing record (state, artifact locations,
    /// outcomes).
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::NotFound`] when the run was never
    /// admitted.
    async fn update(&self, record: &TaskRecord) -> StateStoreResult<()>;

    /// Finds the record for one (task, round) key.
    ///
    /// Returns `None` when the run is unknown.
    async fn find(&self, key: &RunKey) -> StateStoreResult<Option<TaskRecord>>;

    /// Returns all known records for a task, in ascending round order.
    async fn find_by_task(&self, task: &TaskSlug) -> StateStoreResult<Vec<TaskRecord>>;
}

/// Errors returned by state store implementations.
#[derive(Debug, Clone, Error)]
pub enum StateStoreError {
    /// The same (task, round, nonce) tuple was already accepted.
    #[error("duplicate submission for run {0}")]
    DuplicateSubmission(RunKey),

    /// A run for this task is still in flight.
    #[error("a pipeline run is already in flight for task {0}")]
    RunInFlight(TaskSlug),

    /// The round was submitted before its predecessor completed.
    #[error("round {round} for task {task} requires the prior round to be completed")]
    PriorRoundIncomplete {
        /// Task whose ordering invariant was violated.
        task: TaskSlug,
        /// The rejected round.
        round: RoundNumber,
    },

    /// The round is older than the highest round already known.
    #[error("round {round} for task {task} is older than the highest known round {highest}")]
    RoundOutOfOrder {
        /// Task whose ordering invariant was violated.
        task: TaskSlug,
        /// The rejected round.
        round: RoundNumber,
        /// Highest round already admitted for the task.
        highest: RoundNumber,
    },

    /// The round already completed and cannot be re-run.
    #[error("run {0} already completed")]
    RoundAlreadyCompleted(RunKey),

    /// The run was not found.
    #[error("run not found: {0}")]
    NotFound(RunKey),

    /// Storage-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StateStoreError {
    /// Wraps a storage-layer error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for admission-rule rejections, as opposed to
    /// storage-layer failures.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Persistence(_) | Self::NotFound(_))
    }
}
