//! Terminal notification payload and delivery outcome.

use super::{PipelineDomainError, TaskRecord};
use serde::{Deserialize, Serialize};

/// JSON body POSTed to the caller-specified callback URL.
///
/// Assembled strictly from a [`TaskRecord`] that carries publication
/// details; wire field names match what callback receivers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    email: String,
    task: String,
    round: u32,
    nonce: String,
    repo_url: String,
    commit_sha: String,
    pages_url: String,
}

impl NotificationPayload {
    /// Assembles the payload from a record that reached the notification
    /// stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::MissingPublication`] when the record
    /// has no publication details recorded.
    pub fn from_record(record: &TaskRecord) -> Result<Self, PipelineDomainError> {
        let publication = record
            .publication()
            .ok_or_else(|| PipelineDomainError::MissingPublication(record.key().clone()))?;
        Ok(Self {
            email: record.submitter().to_owned(),
            task: record.key().task().as_str().to_owned(),
            round: record.key().round().value(),
            nonce: record.nonce().to_owned(),
            repo_url: publication.repo_url().to_owned(),
            commit_sha: publication.commit_sha().to_owned(),
            pages_url: publication.pages_url().to_owned(),
        })
    }

    /// Returns the submitter identity.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the task identifier.
    #[must_use]
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns the round number.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Returns the correlation nonce.
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Returns the repository URL.
    #[must_use]
    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Returns the published revision identifier.
    #[must_use]
    pub fn commit_sha(&self) -> &str {
        &self.commit_sha
    }

    /// Returns the deployed-content URL.
    #[must_use]
    pub fn pages_url(&self) -> &str {
        &self.pages_url
    }
}

/// Result of driving the retry schedule to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    delivered: bool,
    attempts: u32,
    last_error: Option<String>,
}

impl NotificationOutcome {
    /// Creates an outcome for a delivery that succeeded on `attempts`.
    #[must_use]
    pub const fn success(attempts: u32) -> Self {
        Self {
            delivered: true,
            attempts,
            last_error: None,
        }
    }

    /// Creates an outcome for an exhausted retry schedule.
    #[must_use]
    pub const fn failure(attempts: u32, last_error: Option<String>) -> Self {
        Self {
            delivered: false,
            attempts,
            last_error,
        }
    }

    /// Returns `true` when the payload was delivered.
    #[must_use]
    pub const fn delivered(&self) -> bool {
        self.delivered
    }

    /// Returns how many attempts were made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the error observed on the final failed attempt.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
