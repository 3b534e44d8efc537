//! Identifier and validated scalar types for the pipeline domain.

use super::PipelineDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a single pipeline run, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random run identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a run identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied task identifier, normalized and validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskSlug(String);

impl TaskSlug {
    /// Longest accepted task identifier.
    const MAX_LENGTH: usize = 200;

    /// Creates a validated task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::EmptyTaskId`] when the value is empty
    /// after trimming, [`PipelineDomainError::TaskIdTooLong`] when it exceeds
    /// the length limit, or [`PipelineDomainError::TaskIdWhitespace`] when it
    /// contains interior whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(PipelineDomainError::EmptyTaskId);
        }
        if normalized.chars().count() > Self::MAX_LENGTH {
            return Err(PipelineDomainError::TaskIdTooLong {
                limit: Self::MAX_LENGTH,
            });
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(PipelineDomainError::TaskIdWhitespace(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the task identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskSlug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Positive revision-cycle number within a task.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoundNumber(u32);

impl RoundNumber {
    /// The first round of a task, which creates the published artifact.
    pub const FIRST: Self = Self(1);

    /// Creates a validated round number.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidRound`] when the value is zero.
    pub const fn new(value: u32) -> Result<Self, PipelineDomainError> {
        if value == 0 {
            return Err(PipelineDomainError::InvalidRound(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns `true` for the artifact-creating first round.
    #[must_use]
    pub const fn is_first(self) -> bool {
        self.0 == 1
    }

    /// Returns `true` when `self` is the round immediately after `prior`.
    #[must_use]
    pub const fn follows(self, prior: Self) -> bool {
        self.0 == prior.0.saturating_add(1)
    }
}

impl fmt::Display for RoundNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key identifying one pipeline run: a task and a round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunKey {
    task: TaskSlug,
    round: RoundNumber,
}

impl RunKey {
    /// Creates a run key from its parts.
    #[must_use]
    pub const fn new(task: TaskSlug, round: RoundNumber) -> Self {
        Self { task, round }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task(&self) -> &TaskSlug {
        &self.task
    }

    /// Returns the round number.
    #[must_use]
    pub const fn round(&self) -> RoundNumber {
        self.round
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.task, self.round)
    }
}
