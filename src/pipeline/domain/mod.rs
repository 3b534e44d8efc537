//! Domain model for the build-publish-notify pipeline.
//!
//! The pipeline domain models validated submissions, per-run task records
//! with a guarded state machine, generation outcomes, and notification
//! payload assembly while keeping all infrastructure concerns outside of
//! the domain boundary.

mod artifact;
mod error;
mod ids;
mod notification;
mod record;
mod request;

pub use artifact::{Artifact, ArtifactFile, GenerationOutcome};
pub use error::{ParsePipelineStateError, PipelineDomainError};
pub use ids::{RoundNumber, RunId, RunKey, TaskSlug};
pub use notification::{NotificationOutcome, NotificationPayload};
pub use record::{PipelineState, Publication, TaskRecord, VerificationStatus};
pub use request::{Attachment, SubmissionRequest};
