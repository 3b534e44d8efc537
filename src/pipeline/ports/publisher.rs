//! Publishing collaborator port.

use crate::pipeline::domain::{Artifact, Publication, RoundNumber, TaskSlug};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for publishing operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Repository-publishing capability consumed by the orchestrator.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes the artifact for one task round.
    ///
    /// Round 1 creates a new published artifact; round ≥ 2 updates the
    /// existing one identified by the task key.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when creating or updating the remote entry
    /// fails; publish failure is fatal to the pipeline.
    async fn publish(
        &self,
        task: &TaskSlug,
        round: RoundNumber,
        artifact: &Artifact,
    ) -> PublishResult<Publication>;

    /// Reports whether the deployed content is reachable yet.
    ///
    /// The collaborator propagates deployments asynchronously, so a `false`
    /// answer may simply mean "not yet".
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the reachability probe itself fails;
    /// the orchestrator treats probe errors as "not reachable".
    async fn check_reachable(&self, pages_url: &str) -> PublishResult<bool>;
}

/// Opaque failure reported by the publishing collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct PublishError(pub String);
