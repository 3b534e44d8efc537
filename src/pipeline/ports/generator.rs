//! Generation collaborator port.

use crate::pipeline::domain::{Artifact, Attachment};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for generation operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Content-generation capability consumed by the orchestrator.
///
/// The engine behind this port is opaque; the pipeline only observes a
/// success or failure outcome. A failure is recoverable: the orchestrator
/// substitutes a built-in fallback artifact.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    /// Produces an artifact from the brief, the evaluation checks, and any
    /// attachments.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] when the engine cannot produce an
    /// artifact.
    async fn generate(
        &self,
        brief: &str,
        checks: &[String],
        attachments: &[Attachment],
    ) -> GeneratorResult<Artifact>;
}

/// Opaque failure reported by the generation collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct GeneratorError(pub String);
