//! Scripted fakes and fixture helpers shared by the pipeline unit tests.

use crate::pipeline::domain::{
    Artifact, ArtifactFile, Attachment, NotificationPayload, Publication, RoundNumber,
    SubmissionRequest, TaskRecord, TaskSlug,
};
use crate::pipeline::ports::{
    ArtifactGenerator, DeliveryError, GeneratorError, GeneratorResult, NotificationTransport,
    PublishError, PublishResult, Publisher, Sleeper,
};
use async_trait::async_trait;
use mockable::DefaultClock;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Generator that replays a fixed outcome on every call.
pub(super) struct ScriptedGenerator {
    outcome: Result<Artifact, String>,
    stall: bool,
}

impl ScriptedGenerator {
    pub(super) const fn succeeding(artifact: Artifact) -> Self {
        Self {
            outcome: Ok(artifact),
            stall: false,
        }
    }

    pub(super) fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_owned()),
            stall: false,
        }
    }

    /// Never resolves; trips the per-call generation timeout.
    pub(super) const fn stalling() -> Self {
        Self {
            outcome: Err(String::new()),
            stall: true,
        }
    }
}

#[async_trait]
impl ArtifactGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _brief: &str,
        _checks: &[String],
        _attachments: &[Attachment],
    ) -> GeneratorResult<Artifact> {
        if self.stall {
            std::future::pending::<()>().await;
        }
        self.outcome.clone().map_err(GeneratorError)
    }
}

/// Publisher that replays a fixed outcome and scripts reachability polls.
pub(super) struct ScriptedPublisher {
    outcome: Result<Publication, String>,
    reachable_on_poll: Option<u32>,
    polls: AtomicU32,
    stall: bool,
}

impl ScriptedPublisher {
    /// Publishes successfully; the probe answers positively on poll
    /// `reachable_on_poll` (1-based), or never when `None`.
    pub(super) const fn succeeding(publication: Publication, reachable_on_poll: Option<u32>) -> Self {
        Self {
            outcome: Ok(publication),
            reachable_on_poll,
            polls: AtomicU32::new(0),
            stall: false,
        }
    }

    pub(super) fn failing(reason: &str) -> Self {
        Self {
            outcome: Err(reason.to_owned()),
            reachable_on_poll: None,
            polls: AtomicU32::new(0),
            stall: false,
        }
    }

    /// Never resolves; trips the per-call publish timeout.
    pub(super) const fn stalling() -> Self {
        Self {
            outcome: Err(String::new()),
            reachable_on_poll: None,
            polls: AtomicU32::new(0),
            stall: true,
        }
    }

    pub(super) fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for ScriptedPublisher {
    async fn publish(
        &self,
        _task: &TaskSlug,
        _round: RoundNumber,
        _artifact: &Artifact,
    ) -> PublishResult<Publication> {
        if self.stall {
            std::future::pending::<()>().await;
        }
        self.outcome.clone().map_err(PublishError)
    }

    async fn check_reachable(&self, _pages_url: &str) -> PublishResult<bool> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        Ok(self.reachable_on_poll.is_some_and(|target| poll >= target))
    }
}

/// Transport that records deliveries and succeeds on a scripted attempt.
pub(super) struct RecordingTransport {
    succeed_on_attempt: Option<u32>,
    attempts: AtomicU32,
    deliveries: Mutex<Vec<(String, NotificationPayload)>>,
}

impl RecordingTransport {
    /// Succeeds on attempt `succeed_on_attempt` (1-based); `None` fails
    /// every attempt.
    pub(super) const fn new(succeed_on_attempt: Option<u32>) -> Self {
        Self {
            succeed_on_attempt,
            attempts: AtomicU32::new(0),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(super) fn deliveries(&self) -> Vec<(String, NotificationPayload)> {
        self.deliveries.lock().expect("deliveries lock").clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn deliver(&self, url: &str, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.deliveries
            .lock()
            .expect("deliveries lock")
            .push((url.to_owned(), payload.clone()));
        if self.succeed_on_attempt.is_some_and(|target| attempt == target) {
            Ok(())
        } else {
            Err(DeliveryError("callback returned 500 Internal Server Error".to_owned()))
        }
    }
}

/// Sleeper that records requested durations and returns immediately.
#[derive(Default)]
pub(super) struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn slept(&self) -> Vec<Duration> {
        self.slept.lock().expect("slept lock").clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().expect("slept lock").push(duration);
    }
}

pub(super) fn request(task: &str, round: u32, nonce: &str) -> SubmissionRequest {
    let slug = TaskSlug::new(task).expect("valid task slug");
    let round_number = RoundNumber::new(round).expect("valid round");
    SubmissionRequest::new(
        slug,
        round_number,
        nonce,
        "dev@example.com",
        "build X",
        "https://callback.example.com/notify",
    )
    .expect("valid request")
}

pub(super) fn record(task: &str, round: u32, nonce: &str) -> TaskRecord {
    TaskRecord::for_request(&request(task, round, nonce), &DefaultClock)
}

pub(super) fn clean_artifact() -> Artifact {
    Artifact::new(vec![ArtifactFile::new(
        "index.html",
        "<html><body>hello</body></html>",
    )])
}

pub(super) fn leaky_artifact() -> Artifact {
    Artifact::new(vec![ArtifactFile::new(
        "app.js",
        "const key = \"sk-ABCDEFGHIJKLMNOPQRSTUVWX\";\n",
    )])
}

pub(super) fn publication() -> Publication {
    Publication::new(
        "https://github.com/owner/t1",
        "abc123",
        "https://owner.github.io/t1/",
    )
}
