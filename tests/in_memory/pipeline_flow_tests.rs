//! End-to-end pipeline flows over in-memory infrastructure.

use super::helpers::{
    self, Harness, RecordingTransport, ScriptedGenerator, ScriptedPublisher,
};
use gantry::pipeline::domain::{PipelineState, TaskRecord, VerificationStatus};
use gantry::pipeline::services::AckStatus;
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[fixture]
fn harness() -> Harness {
    helpers::happy_harness()
}

/// Asserts exactly one record exists for the task and returns it.
///
/// # Errors
///
/// Returns an error if the result set does not contain exactly one record.
fn single_record(records: &[TaskRecord]) -> Result<&TaskRecord, eyre::Report> {
    eyre::ensure!(
        records.len() == 1,
        "expected exactly one record, found {}",
        records.len()
    );
    records
        .first()
        .ok_or_else(|| eyre::eyre!("expected at least one record"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submission_flows_through_to_a_delivered_notification(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let ack = harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await?;
    eyre::ensure!(ack.status() == AckStatus::Accepted, "submission accepted");
    eyre::ensure!(ack.task() == "t1", "acknowledgment echoes the task");
    eyre::ensure!(ack.round() == 1, "acknowledgment echoes the round");

    harness.pool.join().await;

    let records = harness.gateway.status("t1").await?;
    let record = single_record(&records)?;
    eyre::ensure!(
        record.state() == PipelineState::Completed,
        "run must complete, was {}",
        record.state()
    );
    eyre::ensure!(
        record.verification() == VerificationStatus::Confirmed,
        "deployment must be confirmed"
    );

    let deliveries = harness.transport.deliveries();
    let (url, payload) = deliveries
        .first()
        .ok_or_else(|| eyre::eyre!("expected one delivery"))?;
    eyre::ensure!(url == "https://callback.example.com/notify", "callback URL");
    eyre::ensure!(payload.email() == "dev@example.com", "payload email");
    eyre::ensure!(payload.task() == "t1", "payload task");
    eyre::ensure!(payload.round() == 1, "payload round");
    eyre::ensure!(payload.nonce() == "nonce-1", "payload nonce");
    eyre::ensure!(
        payload.repo_url() == "https://github.com/owner/t1",
        "payload repo URL"
    );
    eyre::ensure!(payload.commit_sha() == "abc123", "payload revision");
    eyre::ensure!(
        payload.pages_url() == "https://owner.github.io/t1/",
        "payload pages URL"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn degraded_generation_still_publishes_and_notifies() {
    let harness = helpers::harness(
        ScriptedGenerator::failing("model unavailable"),
        ScriptedPublisher::succeeding(helpers::publication(), Some(1)),
        RecordingTransport::new(Some(1)),
    );

    harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("submission succeeds");
    harness.pool.join().await;

    let records = harness.gateway.status("t1").await.expect("status succeeds");
    let record = records.first().expect("record persisted");
    assert_eq!(record.state(), PipelineState::Completed);
    assert_eq!(record.degraded_reason(), Some("model unavailable"));
    assert_eq!(harness.transport.attempts(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn publish_failure_surfaces_in_status_and_skips_notification() {
    let harness = helpers::harness(
        ScriptedGenerator::succeeding(helpers::clean_artifact()),
        ScriptedPublisher::failing("repository creation failed"),
        RecordingTransport::new(Some(1)),
    );

    harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("submission succeeds");
    harness.pool.join().await;

    let records = harness.gateway.status("t1").await.expect("status succeeds");
    let record = records.first().expect("record persisted");
    assert_eq!(record.state(), PipelineState::Failed);
    assert_eq!(record.last_error(), Some("repository creation failed"));
    assert!(harness.transport.deliveries().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn flaky_callback_is_retried_with_backoff() {
    let harness = helpers::harness(
        ScriptedGenerator::succeeding(helpers::clean_artifact()),
        ScriptedPublisher::succeeding(helpers::publication(), Some(1)),
        RecordingTransport::new(Some(3)),
    );

    harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("submission succeeds");
    harness.pool.join().await;

    let records = harness.gateway.status("t1").await.expect("status succeeds");
    let record = records.first().expect("record persisted");
    assert_eq!(record.state(), PipelineState::Completed);
    let notification = record.notification().expect("notification recorded");
    assert!(notification.delivered());
    assert_eq!(notification.attempts(), 3);
    assert_eq!(
        harness.sleeper.slept(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_deployment_is_recorded_but_not_fatal() {
    let harness = helpers::harness(
        ScriptedGenerator::succeeding(helpers::clean_artifact()),
        ScriptedPublisher::succeeding(helpers::publication(), None),
        RecordingTransport::new(Some(1)),
    );

    harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("submission succeeds");
    harness.pool.join().await;

    let records = harness.gateway.status("t1").await.expect("status succeeds");
    let record = records.first().expect("record persisted");
    assert_eq!(record.state(), PipelineState::Completed);
    assert_eq!(record.verification(), VerificationStatus::Unconfirmed);
    assert_eq!(harness.publisher.polls(), 5);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn acknowledgment_returns_while_the_pipeline_is_in_flight() {
    let release = Arc::new(Notify::new());
    let harness = helpers::harness(
        ScriptedGenerator::gated(Arc::clone(&release), helpers::clean_artifact()),
        ScriptedPublisher::succeeding(helpers::publication(), Some(1)),
        RecordingTransport::new(Some(1)),
    );

    let ack = harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("submission succeeds");
    assert_eq!(ack.status(), AckStatus::Accepted);

    let records = harness.gateway.status("t1").await.expect("status succeeds");
    assert!(
        !records.first().expect("record admitted").state().is_terminal(),
        "run must still be in flight at acknowledgment time"
    );

    release.notify_one();
    harness.pool.join().await;
    let settled = harness.gateway.status("t1").await.expect("status succeeds");
    assert_eq!(
        settled.first().expect("record persisted").state(),
        PipelineState::Completed
    );
}
