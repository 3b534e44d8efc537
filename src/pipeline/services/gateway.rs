//! Request gateway: validation, admission, and asynchronous hand-off.

use super::orchestrator::PipelineOrchestrator;
use crate::pipeline::domain::{
    Attachment, PipelineDomainError, RoundNumber, RunId, RunKey, SubmissionRequest, TaskRecord,
    TaskSlug,
};
use crate::pipeline::ports::{
    ArtifactGenerator, NotificationTransport, Publisher, Sleeper, StateStoreError, TaskStateStore,
};
use crate::worker::WorkerPool;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Inbound submission as received on the wire, prior to validation.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    /// Submitter identity echoed back in the terminal notification.
    pub email: String,
    /// Shared secret proving the caller is authorised.
    pub secret: String,
    /// Task identifier.
    pub task: String,
    /// Round number, starting at 1.
    pub round: u32,
    /// Opaque correlation value echoed back in the notification.
    pub nonce: String,
    /// Natural-language description of what to build.
    pub brief: String,
    /// Evaluation checks forwarded to the generation collaborator.
    #[serde(default)]
    pub checks: Vec<String>,
    /// Callback URL for the terminal notification.
    pub evaluation_url: String,
    /// Base64-encoded supplementary files.
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,
}

/// Undecoded attachment body as received on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAttachment {
    /// File name.
    pub name: String,
    /// Base64 payload, bare or as a `data:` URI.
    pub content: String,
}

/// Gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Shared secret submissions must present.
    pub shared_secret: String,
}

/// Synchronous refusals reported to the caller without creating a run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The presented shared secret did not match.
    #[error("invalid shared secret")]
    InvalidSecret,

    /// A submission field failed domain validation.
    #[error(transparent)]
    Domain(#[from] PipelineDomainError),
}

/// Gateway failures surfaced to the transport layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The submission was refused before admission.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The state store failed for a reason other than admission rules.
    #[error(transparent)]
    Store(#[from] StateStoreError),
}

/// Admission decision for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    /// The run was admitted and handed to the pipeline.
    Accepted,
    /// An admission rule refused the run.
    Rejected,
}

/// Immediate response to a well-formed submission.
///
/// Returned before any pipeline work happens; the submission's task and
/// round are echoed back so callers can correlate the decision. Rejection
/// here means an admission rule fired, not that the pipeline failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgment {
    status: AckStatus,
    task: String,
    round: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<RunId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl Acknowledgment {
    /// Builds an accepted acknowledgment carrying the new run identifier.
    #[must_use]
    pub fn accepted(key: &RunKey, run_id: RunId) -> Self {
        Self {
            status: AckStatus::Accepted,
            task: key.task().as_str().to_owned(),
            round: key.round().value(),
            run_id: Some(run_id),
            reason: None,
        }
    }

    /// Builds a rejected acknowledgment carrying the refusal reason.
    #[must_use]
    pub fn rejected(key: &RunKey, reason: String) -> Self {
        Self {
            status: AckStatus::Rejected,
            task: key.task().as_str().to_owned(),
            round: key.round().value(),
            run_id: None,
            reason: Some(reason),
        }
    }

    /// Returns the admission decision.
    #[must_use]
    pub const fn status(&self) -> AckStatus {
        self.status
    }

    /// Returns the echoed task identifier.
    #[must_use]
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns the echoed round number.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Returns the run identifier for accepted submissions.
    #[must_use]
    pub const fn run_id(&self) -> Option<RunId> {
        self.run_id
    }

    /// Returns the refusal reason for rejected submissions.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Front door for submissions and status queries.
///
/// Validation and admission happen synchronously; the pipeline itself runs
/// on the worker pool, so the acknowledgment never waits on generation or
/// publishing.
pub struct SubmissionGateway<S, G, P, T, L, C>
where
    S: TaskStateStore + 'static,
    G: ArtifactGenerator + 'static,
    P: Publisher + 'static,
    T: NotificationTransport + 'static,
    L: Sleeper + 'static,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    orchestrator: Arc<PipelineOrchestrator<S, G, P, T, L, C>>,
    pool: Arc<WorkerPool>,
    clock: Arc<C>,
    config: GatewayConfig,
}

impl<S, G, P, T, L, C> SubmissionGateway<S, G, P, T, L, C>
where
    S: TaskStateStore + 'static,
    G: ArtifactGenerator + 'static,
    P: Publisher + 'static,
    T: NotificationTransport + 'static,
    L: Sleeper + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a gateway over the given collaborators.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        orchestrator: Arc<PipelineOrchestrator<S, G, P, T, L, C>>,
        pool: Arc<WorkerPool>,
        clock: Arc<C>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            store,
            orchestrator,
            pool,
            clock,
            config,
        }
    }

    /// Validates and admits one submission.
    ///
    /// On acceptance the pipeline is spawned on the worker pool and the
    /// acknowledgment returns immediately. Admission-rule refusals come
    /// back as a rejected acknowledgment, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the shared secret or any
    /// field is invalid, or [`GatewayError::Store`] when the state store
    /// fails outside the admission rules.
    pub async fn submit(&self, submission: Submission) -> Result<Acknowledgment, GatewayError> {
        if submission.secret != self.config.shared_secret {
            warn!(task = %submission.task, "submission presented an invalid secret");
            return Err(ValidationError::InvalidSecret.into());
        }

        let request = build_request(submission).map_err(ValidationError::Domain)?;
        let record = TaskRecord::for_request(&request, &*self.clock);

        if let Err(err) = self.store.begin_run(&record).await {
            if err.is_rejection() {
                warn!(key = %record.key(), reason = %err, "submission rejected at admission");
                return Ok(Acknowledgment::rejected(record.key(), err.to_string()));
            }
            return Err(GatewayError::Store(err));
        }

        let ack = Acknowledgment::accepted(record.key(), record.run_id());
        info!(key = %record.key(), run_id = %record.run_id(), "submission accepted");

        let orchestrator = Arc::clone(&self.orchestrator);
        let label = record.key().to_string();
        self.pool.spawn(label, async move {
            orchestrator.run(&request, record).await;
        });

        Ok(ack)
    }

    /// Returns every recorded run for a task, in ascending round order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Validation`] when the task identifier is
    /// invalid, or [`GatewayError::Store`] when the lookup fails.
    pub async fn status(&self, task: &str) -> Result<Vec<TaskRecord>, GatewayError> {
        let slug = TaskSlug::new(task).map_err(ValidationError::Domain)?;
        Ok(self.store.find_by_task(&slug).await?)
    }
}

fn build_request(submission: Submission) -> Result<SubmissionRequest, PipelineDomainError> {
    let task = TaskSlug::new(submission.task)?;
    let round = RoundNumber::new(submission.round)?;
    let attachments = submission
        .attachments
        .into_iter()
        .map(|raw| Attachment::from_base64(raw.name, &raw.content))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SubmissionRequest::new(
        task,
        round,
        submission.nonce,
        submission.email,
        submission.brief,
        submission.evaluation_url,
    )?
    .with_checks(submission.checks)
    .with_attachments(attachments))
}
