//! Gateway admission rules exercised through the public API.

use super::helpers::{
    self, Harness, RecordingTransport, ScriptedGenerator, ScriptedPublisher,
};
use gantry::pipeline::domain::PipelineState;
use gantry::pipeline::services::{AckStatus, GatewayError, ValidationError};
use rstest::{fixture, rstest};
use std::sync::Arc;
use tokio::sync::Notify;

#[fixture]
fn harness() -> Harness {
    helpers::happy_harness()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_tuple_is_rejected_with_a_reason(harness: Harness) {
    harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("first submission succeeds");
    harness.pool.join().await;

    let ack = harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("duplicate is a normal acknowledgment");

    assert_eq!(ack.status(), AckStatus::Rejected);
    assert!(ack.reason().expect("reason").contains("duplicate"));
    // The completed run is untouched.
    let records = harness.gateway.status("t1").await.expect("status succeeds");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records.first().expect("record").state(),
        PipelineState::Completed
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rounds_must_arrive_in_order(harness: Harness) {
    let ack = harness
        .gateway
        .submit(helpers::submission("t1", 2, "nonce-1"))
        .await
        .expect("rejection is a normal acknowledgment");

    assert_eq!(ack.status(), AckStatus::Rejected);
    assert!(ack.reason().expect("reason").contains("prior round"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn in_flight_runs_block_further_submissions() {
    let release = Arc::new(Notify::new());
    let harness = helpers::harness(
        ScriptedGenerator::gated(Arc::clone(&release), helpers::clean_artifact()),
        ScriptedPublisher::succeeding(helpers::publication(), Some(1)),
        RecordingTransport::new(Some(1)),
    );
    harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("first submission succeeds");

    let ack = harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-2"))
        .await
        .expect("rejection is a normal acknowledgment");

    assert_eq!(ack.status(), AckStatus::Rejected);
    assert!(ack.reason().expect("reason").contains("in flight"));

    release.notify_one();
    harness.pool.join().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_rounds_admit_their_successor(harness: Harness) {
    harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("round 1 succeeds");
    harness.pool.join().await;

    let ack = harness
        .gateway
        .submit(helpers::submission("t1", 2, "nonce-2"))
        .await
        .expect("round 2 succeeds");

    assert_eq!(ack.status(), AckStatus::Accepted);
    harness.pool.join().await;
    let records = harness.gateway.status("t1").await.expect("status succeeds");
    let rounds: Vec<u32> = records
        .iter()
        .map(|record| record.key().round().value())
        .collect();
    assert_eq!(rounds, vec![1, 2]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_rounds_accept_a_resubmission_with_a_fresh_nonce() {
    let harness = helpers::harness(
        ScriptedGenerator::succeeding(helpers::clean_artifact()),
        ScriptedPublisher::failing("repository creation failed"),
        RecordingTransport::new(Some(1)),
    );
    harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-1"))
        .await
        .expect("first submission succeeds");
    harness.pool.join().await;

    let first = harness.gateway.status("t1").await.expect("status succeeds");
    assert_eq!(
        first.first().expect("record").state(),
        PipelineState::Failed
    );
    let first_run = first.first().expect("record").run_id();

    let ack = harness
        .gateway
        .submit(helpers::submission("t1", 1, "nonce-2"))
        .await
        .expect("resubmission succeeds");
    assert_eq!(ack.status(), AckStatus::Accepted);
    harness.pool.join().await;

    let records = harness.gateway.status("t1").await.expect("status succeeds");
    assert_eq!(records.len(), 1);
    let record = records.first().expect("record");
    assert_ne!(record.run_id(), first_run);
    assert_eq!(record.nonce(), "nonce-2");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wrong_secret_never_creates_a_run(harness: Harness) {
    let mut sub = helpers::submission("t1", 1, "nonce-1");
    sub.secret = "wrong".to_owned();

    let result = harness.gateway.submit(sub).await;

    assert!(matches!(
        result,
        Err(GatewayError::Validation(ValidationError::InvalidSecret))
    ));
    let records = harness.gateway.status("t1").await.expect("status succeeds");
    assert!(records.is_empty());
}
