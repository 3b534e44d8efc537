//! Task record aggregate and the pipeline state machine.

use super::{
    NotificationOutcome, ParsePipelineStateError, PipelineDomainError, RunId, RunKey,
    SubmissionRequest,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline lifecycle state for one (task, round) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// The run has been admitted but work has not started.
    Received,
    /// The generation collaborator is producing the artifact.
    Generating,
    /// The artifact is being scanned for embedded credentials.
    Scanning,
    /// The publishing collaborator is creating or updating the artifact.
    Publishing,
    /// The deployed content is being polled for reachability.
    Verifying,
    /// The terminal notification is being delivered.
    Notifying,
    /// The run finished and the notification was delivered.
    Completed,
    /// The run reached a fatal failure.
    Failed,
}

impl PipelineState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Generating => "generating",
            Self::Scanning => "scanning",
            Self::Publishing => "publishing",
            Self::Verifying => "verifying",
            Self::Notifying => "notifying",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for states that end the run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns `true` when the state machine permits moving to `target`.
    ///
    /// The pipeline advances strictly in stage order; `Failed` is reachable
    /// from every non-terminal state; terminal states permit nothing.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(target, Self::Failed) {
            return true;
        }
        matches!(
            (self, target),
            (Self::Received, Self::Generating)
                | (Self::Generating, Self::Scanning)
                | (Self::Scanning, Self::Publishing)
                | (Self::Publishing, Self::Verifying)
                | (Self::Verifying, Self::Notifying)
                | (Self::Notifying, Self::Completed)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PipelineState {
    type Error = ParsePipelineStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "received" => Ok(Self::Received),
            "generating" => Ok(Self::Generating),
            "scanning" => Ok(Self::Scanning),
            "publishing" => Ok(Self::Publishing),
            "verifying" => Ok(Self::Verifying),
            "notifying" => Ok(Self::Notifying),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParsePipelineStateError(value.to_owned())),
        }
    }
}

/// Locations produced by a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    repo_url: String,
    commit_sha: String,
    pages_url: String,
}

impl Publication {
    /// Creates publication details from the publishing collaborator's
    /// response.
    #[must_use]
    pub fn new(
        repo_url: impl Into<String>,
        commit_sha: impl Into<String>,
        pages_url: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            commit_sha: commit_sha.into(),
            pages_url: pages_url.into(),
        }
    }

    /// Returns the repository URL.
    #[must_use]
    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Returns the revision identifier of the published artifact.
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

/// Outcome of the post-publish reachability polling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Verification has not run yet.
    #[default]
    NotAttempted,
    /// The deployed content answered a reachability poll.
    Confirmed,
    /// Polling was exhausted without a positive answer; the run continues
    /// because the callback receiver performs its own reachability check.
    Unconfirmed,
}

/// Mutable record of one pipeline run, owned by the orchestrator.
///
/// The record is the single source of truth for status queries. Its state
/// changes only through [`TaskRecord::transition_to`] and the targeted
/// setters below; it is never deleted during the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    run_id: RunId,
    key: RunKey,
    submitter: String,
    nonce: String,
    callback_url: String,
    state: PipelineState,
    created_at: DateTime<Utc>,
    state_entered_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    publication: Option<Publication>,
    verification: VerificationStatus,
    degraded_reason: Option<String>,
    notification: Option<NotificationOutcome>,
    last_error: Option<String>,
}

impl TaskRecord {
    /// Creates a record in [`PipelineState::Received`] for an admitted
    /// submission.
    #[must_use]
    pub fn for_request(request: &SubmissionRequest, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            run_id: RunId::new(),
            key: request.run_key(),
            submitter: request.submitter().to_owned(),
            nonce: request.nonce().to_owned(),
            callback_url: request.callback_url().to_owned(),
            state: PipelineState::Received,
            created_at: timestamp,
            state_entered_at: timestamp,
            completed_at: None,
            publication: None,
            verification: VerificationStatus::NotAttempted,
            degraded_reason: None,
            notification: None,
            last_error: None,
        }
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the (task, round) key.
    #[must_use]
    pub const fn key(&self) -> &RunKey {
        &self.key
    }

    /// Returns the submitter identity echoed back in the notification.
    #[must_use]
    pub fn submitter(&self) -> &str {
        &self.submitter
    }

    /// Returns the correlation nonce.
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Returns the callback URL that receives the terminal notification.
    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Returns the current pipeline state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Returns the admission timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the current state was entered.
    #[must_use]
    pub const fn state_entered_at(&self) -> DateTime<Utc> {
        self.state_entered_at
    }

    /// Returns the terminal timestamp, if the run has ended.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the recorded publication details, if any.
    #[must_use]
    pub const fn publication(&self) -> Option<&Publication> {
        self.publication.as_ref()
    }

    /// Returns the verification outcome.
    #[must_use]
    pub const fn verification(&self) -> VerificationStatus {
        self.verification
    }

    /// Returns why generation was degraded, when the fallback was used.
    #[must_use]
    pub fn degraded_reason(&self) -> Option<&str> {
        self.degraded_reason.as_deref()
    }

    /// Returns the notification outcome, if notification was attempted.
    #[must_use]
    pub const fn notification(&self) -> Option<&NotificationOutcome> {
        self.notification.as_ref()
    }

    /// Returns the last recorded error, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Advances the record to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidStateTransition`] when the
    /// state machine refuses the move.
    pub fn transition_to(
        &mut self,
        target: PipelineState,
        clock: &impl Clock,
    ) -> Result<(), PipelineDomainError> {
        if !self.state.can_transition_to(target) {
            return Err(PipelineDomainError::InvalidStateTransition {
                key: self.key.clone(),
                from: self.state,
                to: target,
            });
        }
        let timestamp = clock.utc();
        self.state = target;
        self.state_entered_at = timestamp;
        if target.is_terminal() {
            self.completed_at = Some(timestamp);
        }
        Ok(())
    }

    /// Moves the record to [`PipelineState::Failed`], retaining the cause
    /// for status queries.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidStateTransition`] when the
    /// record is already terminal.
    pub fn fail(
        &mut self,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), PipelineDomainError> {
        self.last_error = Some(reason.into());
        self.transition_to(PipelineState::Failed, clock)
    }

    /// Records that the fallback artifact was substituted for the
    /// collaborator's output.
    pub fn mark_degraded(&mut self, reason: impl Into<String>) {
        self.degraded_reason = Some(reason.into());
    }

    /// Records the publishing collaborator's response.
    pub fn set_publication(&mut self, publication: Publication) {
        self.publication = Some(publication);
    }

    /// Records the verification outcome.
    pub const fn set_verification(&mut self, verification: VerificationStatus) {
        self.verification = verification;
    }

    /// Records the notification delivery outcome.
    pub fn record_notification(&mut self, outcome: NotificationOutcome) {
        self.notification = Some(outcome);
    }
}
