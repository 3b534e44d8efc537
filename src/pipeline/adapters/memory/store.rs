//! In-memory task state store with admission-rule enforcement.

use crate::pipeline::domain::{PipelineState, RoundNumber, RunKey, TaskRecord, TaskSlug};
use crate::pipeline::ports::{StateStoreError, StateStoreResult, TaskStateStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("state store lock poisoned")]
struct LockPoisoned;

#[derive(Default)]
struct StoreState {
    records: HashMap<RunKey, TaskRecord>,
    highest: HashMap<TaskSlug, RoundNumber>,
}

/// Task state store backed by a process-local map.
///
/// Admission checks and the insert happen under one write lock, so the
/// exclusivity and ordering rules hold even with concurrent submissions.
/// Records survive for the process lifetime; nothing is ever deleted.
#[derive(Default)]
pub struct InMemoryTaskStateStore {
    state: RwLock<StoreState>,
}

impl InMemoryTaskStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreState {
    /// Applies the admission rules for a fresh (task, round) key.
    fn admit_new_round(&self, record: &TaskRecord) -> StateStoreResult<()> {
        let key = record.key();
        let task = key.task();
        let round = key.round();

        let Some(&highest) = self.highest.get(task) else {
            if round.is_first() {
                return Ok(());
            }
            return Err(StateStoreError::PriorRoundIncomplete {
                task: task.clone(),
                round,
            });
        };

        if round <= highest {
            return Err(StateStoreError::RoundOutOfOrder {
                task: task.clone(),
                round,
                highest,
            });
        }

        let prior_key = RunKey::new(task.clone(), highest);
        let prior_state = self.records.get(&prior_key).map(TaskRecord::state);
        match prior_state {
            Some(state) if !state.is_terminal() => {
                Err(StateStoreError::RunInFlight(task.clone()))
            }
            Some(PipelineState::Completed) if round.follows(highest) => Ok(()),
            _ => Err(StateStoreError::PriorRoundIncomplete {
                task: task.clone(),
                round,
            }),
        }
    }

    /// Applies the admission rules when the (task, round) key already has
    /// a record: duplicates and completed rounds are refused, a failed
    /// round may be replaced under a fresh nonce.
    fn admit_resubmission(existing: &TaskRecord, record: &TaskRecord) -> StateStoreResult<()> {
        let key = record.key();
        if existing.nonce() == record.nonce() {
            return Err(StateStoreError::DuplicateSubmission(key.clone()));
        }
        if !existing.state().is_terminal() {
            return Err(StateStoreError::RunInFlight(key.task().clone()));
        }
        if existing.state() == PipelineState::Completed {
            return Err(StateStoreError::RoundAlreadyCompleted(key.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStateStore for InMemoryTaskStateStore {
    async fn begin_run(&self, record: &TaskRecord) -> StateStoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StateStoreError::persistence(LockPoisoned))?;

        let key = record.key().clone();
        match state.records.get(&key) {
            Some(existing) => StoreState::admit_resubmission(existing, record)?,
            None => state.admit_new_round(record)?,
        }

        let task = key.task().clone();
        let round = key.round();
        state.records.insert(key, record.clone());
        state
            .highest
            .entry(task)
            .and_modify(|current| {
                if round > *current {
                    *current = round;
                }
            })
            .or_insert(round);
        Ok(())
    }

    async fn update(&self, record: &TaskRecord) -> StateStoreResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StateStoreError::persistence(LockPoisoned))?;
        let Some(stored) = state.records.get_mut(record.key()) else {
            return Err(StateStoreError::NotFound(record.key().clone()));
        };
        *stored = record.clone();
        Ok(())
    }

    async fn find(&self, key: &RunKey) -> StateStoreResult<Option<TaskRecord>> {
        let state = self
            .state
            .read()
            .map_err(|_| StateStoreError::persistence(LockPoisoned))?;
        Ok(state.records.get(key).cloned())
    }

    async fn find_by_task(&self, task: &TaskSlug) -> StateStoreResult<Vec<TaskRecord>> {
        let state = self
            .state
            .read()
            .map_err(|_| StateStoreError::persistence(LockPoisoned))?;
        let mut records: Vec<TaskRecord> = state
            .records
            .values()
            .filter(|record| record.key().task() == task)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.key().round());
        Ok(records)
    }
}
