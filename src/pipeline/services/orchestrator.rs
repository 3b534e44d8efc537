//! Pipeline orchestration: the stage state machine for one run.

use super::fallback;
use super::notifier::{DEFAULT_RETRY_DELAYS_SECS, Notifier};
use crate::pipeline::domain::{
    Artifact, GenerationOutcome, NotificationPayload, PipelineState, Publication,
    SubmissionRequest, TaskRecord, VerificationStatus,
};
use crate::pipeline::ports::{
    ArtifactGenerator, NotificationTransport, Publisher, Sleeper, TaskStateStore,
};
use crate::scanner;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// What to do when the secret scan reports findings.
///
/// The default is deliberate: scanning is pre-deployment auditing, not a
/// hard gate, so findings are logged (masked) and the run continues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanPolicy {
    /// Log findings and continue.
    #[default]
    WarnOnly,
    /// Fail the run before anything is published.
    Abort,
}

/// Tunables for one orchestrator instance.
///
/// Timeouts apply per external call, never to the pipeline as a whole.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Secret-scan continuation policy.
    pub scan_policy: ScanPolicy,
    /// Timeout for the generation collaborator call.
    pub generation_timeout: Duration,
    /// Timeout for the publish collaborator call.
    pub publish_timeout: Duration,
    /// Number of reachability polls before giving up.
    pub verify_attempts: u32,
    /// Timeout for each reachability poll.
    pub verify_poll_timeout: Duration,
    /// Fixed delay between reachability polls.
    pub verify_delay: Duration,
    /// Notification retry schedule.
    pub retry_delays: Vec<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scan_policy: ScanPolicy::WarnOnly,
            generation_timeout: Duration::from_secs(300),
            publish_timeout: Duration::from_secs(120),
            verify_attempts: 5,
            verify_poll_timeout: Duration::from_secs(10),
            verify_delay: Duration::from_secs(2),
            retry_delays: DEFAULT_RETRY_DELAYS_SECS
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect(),
        }
    }
}

/// Fatal stage outcomes retained on the task record.
///
/// Only these classes end a run in `Failed`; generation degradation and
/// unconfirmed verification are recoverable and recorded separately.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StageFailure {
    /// The secret scan reported findings under the abort policy.
    #[error("secret scan detected {count} finding(s) under abort policy")]
    SecretsDetected {
        /// Number of findings.
        count: usize,
    },

    /// The publishing collaborator failed; its error is kept verbatim.
    #[error("{0}")]
    Publish(String),

    /// The notification retry schedule was exhausted.
    #[error("notification failed after {attempts} attempt(s): {last_error}")]
    Notification {
        /// Attempts made before giving up.
        attempts: u32,
        /// Error observed on the final attempt.
        last_error: String,
    },
}

/// Drives one (task, round) run through
/// `Generating → Scanning → Publishing → Verifying → Notifying`.
///
/// Stages execute strictly sequentially; every transition is persisted to
/// the state store, which is the read model for status queries. No failure
/// escapes [`PipelineOrchestrator::run`]: every external-call error is
/// converted into a recorded outcome before the state machine advances.
pub struct PipelineOrchestrator<S, G, P, T, L, C>
where
    S: TaskStateStore,
    G: ArtifactGenerator,
    P: Publisher,
    T: NotificationTransport,
    L: Sleeper,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    generator: Arc<G>,
    publisher: Arc<P>,
    notifier: Notifier<T, L>,
    sleeper: Arc<L>,
    clock: Arc<C>,
    config: PipelineConfig,
}

impl<S, G, P, T, L, C> PipelineOrchestrator<S, G, P, T, L, C>
where
    S: TaskStateStore,
    G: ArtifactGenerator,
    P: Publisher,
    T: NotificationTransport,
    L: Sleeper,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        generator: Arc<G>,
        publisher: Arc<P>,
        transport: Arc<T>,
        sleeper: Arc<L>,
        clock: Arc<C>,
        config: PipelineConfig,
    ) -> Self {
        let notifier = Notifier::new(transport, Arc::clone(&sleeper), config.retry_delays.clone());
        Self {
            store,
            generator,
            publisher,
            notifier,
            sleeper,
            clock,
            config,
        }
    }

    /// Executes the whole pipeline for one admitted run and returns the
    /// final record.
    ///
    /// The record always ends terminal: `Completed` when the notification
    /// landed, `Failed` otherwise.
    pub async fn run(&self, request: &SubmissionRequest, mut record: TaskRecord) -> TaskRecord {
        info!(
            task = %request.task(),
            round = %request.round(),
            run_id = %record.run_id(),
            "pipeline run started"
        );

        if !self.advance(&mut record, PipelineState::Generating).await {
            return record;
        }
        let outcome = self.generate(request).await;
        if let Some(reason) = outcome.degraded_reason() {
            warn!(key = %record.key(), reason, "generation degraded, using fallback artifact");
            record.mark_degraded(reason);
            self.persist(&record).await;
        }
        let artifact = outcome.into_artifact();

        if !self.advance(&mut record, PipelineState::Scanning).await {
            return record;
        }
        if let Err(failure) = self.scan(&artifact, &record) {
            self.fail(&mut record, &failure).await;
            return record;
        }

        if !self.advance(&mut record, PipelineState::Publishing).await {
            return record;
        }
        let publication = match self.publish(request, &artifact).await {
            Ok(publication) => publication,
            Err(failure) => {
                self.fail(&mut record, &failure).await;
                return record;
            }
        };
        record.set_publication(publication.clone());
        self.persist(&record).await;

        if !self.advance(&mut record, PipelineState::Verifying).await {
            return record;
        }
        let verification = self.verify(publication.pages_url(), &record).await;
        record.set_verification(verification);
        self.persist(&record).await;

        if !self.advance(&mut record, PipelineState::Notifying).await {
            return record;
        }
        self.notify(&mut record).await;
        record
    }

    async fn generate(&self, request: &SubmissionRequest) -> GenerationOutcome {
        let generating =
            self.generator
                .generate(request.brief(), request.checks(), request.attachments());
        match timeout(self.config.generation_timeout, generating).await {
            Ok(Ok(artifact)) => GenerationOutcome::Generated(artifact),
            Ok(Err(err)) => GenerationOutcome::Degraded {
                artifact: fallback::minimal_artifact(request.task(), request.brief()),
                reason: err.to_string(),
            },
            Err(_) => GenerationOutcome::Degraded {
                artifact: fallback::minimal_artifact(request.task(), request.brief()),
                reason: format!(
                    "generation timed out after {}s",
                    self.config.generation_timeout.as_secs()
                ),
            },
        }
    }

    fn scan(&self, artifact: &Artifact, record: &TaskRecord) -> Result<(), StageFailure> {
        let mut count: usize = 0;
        for file in artifact.files() {
            for finding in scanner::scan(file.content()) {
                count = count.saturating_add(1);
                warn!(
                    key = %record.key(),
                    file = file.path(),
                    line = finding.line(),
                    kind = finding.kind(),
                    excerpt = finding.masked_excerpt(),
                    "potential secret detected"
                );
            }
        }
        if count == 0 {
            info!(key = %record.key(), "secret scan clean");
            return Ok(());
        }
        match self.config.scan_policy {
            ScanPolicy::WarnOnly => {
                warn!(
                    key = %record.key(),
                    findings = count,
                    "secrets detected, continuing under warn-only policy"
                );
                Ok(())
            }
            ScanPolicy::Abort => Err(StageFailure::SecretsDetected { count }),
        }
    }

    async fn publish(
        &self,
        request: &SubmissionRequest,
        artifact: &Artifact,
    ) -> Result<Publication, StageFailure> {
        let publishing = self
            .publisher
            .publish(request.task(), request.round(), artifact);
        match timeout(self.config.publish_timeout, publishing).await {
            Ok(Ok(publication)) => {
                info!(
                    task = %request.task(),
                    repo_url = publication.repo_url(),
                    pages_url = publication.pages_url(),
                    "artifact published"
                );
                Ok(publication)
            }
            Ok(Err(err)) => Err(StageFailure::Publish(err.to_string())),
            Err(_) => Err(StageFailure::Publish(format!(
                "publish timed out after {}s",
                self.config.publish_timeout.as_secs()
            ))),
        }
    }

    async fn verify(&self, pages_url: &str, record: &TaskRecord) -> VerificationStatus {
        for attempt in 1..=self.config.verify_attempts {
            if self.poll_reachable(pages_url).await {
                info!(key = %record.key(), attempt, "deployed content reachable");
                return VerificationStatus::Confirmed;
            }
            if attempt < self.config.verify_attempts {
                self.sleeper.sleep(self.config.verify_delay).await;
            }
        }
        warn!(
            key = %record.key(),
            attempts = self.config.verify_attempts,
            "verification unconfirmed, continuing to notification"
        );
        VerificationStatus::Unconfirmed
    }

    async fn poll_reachable(&self, pages_url: &str) -> bool {
        let probing = self.publisher.check_reachable(pages_url);
        match timeout(self.config.verify_poll_timeout, probing).await {
            Ok(Ok(reachable)) => reachable,
            Ok(Err(err)) => {
                warn!(pages_url, error = %err, "reachability probe failed");
                false
            }
            Err(_) => {
                warn!(pages_url, "reachability probe timed out");
                false
            }
        }
    }

    async fn notify(&self, record: &mut TaskRecord) {
        let payload = match NotificationPayload::from_record(record) {
            Ok(payload) => payload,
            Err(err) => {
                error!(key = %record.key(), error = %err, "notification payload unavailable");
                if record.fail(err.to_string(), &*self.clock).is_ok() {
                    self.persist(record).await;
                }
                return;
            }
        };

        let url = record.callback_url().to_owned();
        let outcome = self.notifier.notify(&url, &payload).await;
        let delivered = outcome.delivered();
        let attempts = outcome.attempts();
        let last_error = outcome
            .last_error()
            .unwrap_or("no attempts made")
            .to_owned();
        record.record_notification(outcome);

        if delivered {
            if self.advance(record, PipelineState::Completed).await {
                info!(key = %record.key(), "pipeline run completed");
            }
        } else {
            self.fail(
                record,
                &StageFailure::Notification {
                    attempts,
                    last_error,
                },
            )
            .await;
        }
    }

    /// Moves the record to `target` and persists it; refusal is a
    /// programming error and leaves the record untouched.
    async fn advance(&self, record: &mut TaskRecord, target: PipelineState) -> bool {
        match record.transition_to(target, &*self.clock) {
            Ok(()) => {
                self.persist(record).await;
                true
            }
            Err(err) => {
                error!(key = %record.key(), error = %err, "refused state transition");
                false
            }
        }
    }

    async fn fail(&self, record: &mut TaskRecord, failure: &StageFailure) {
        error!(key = %record.key(), error = %failure, "pipeline run failed");
        if let Err(err) = record.fail(failure.to_string(), &*self.clock) {
            error!(key = %record.key(), error = %err, "refused failure transition");
            return;
        }
        self.persist(record).await;
    }

    /// Persist failures are logged and absorbed: the run still reaches a
    /// terminal state even if the read model lags.
    async fn persist(&self, record: &TaskRecord) {
        if let Err(err) = self.store.update(record).await {
            error!(key = %record.key(), error = %err, "failed to persist task record");
        }
    }
}
