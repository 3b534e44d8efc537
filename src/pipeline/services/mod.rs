//! Application services for the build-publish-notify pipeline.

mod fallback;
mod gateway;
mod notifier;
mod orchestrator;

pub use gateway::{
    AckStatus, Acknowledgment, GatewayConfig, GatewayError, RawAttachment, Submission,
    SubmissionGateway, ValidationError,
};
pub use notifier::Notifier;
pub use orchestrator::{PipelineConfig, PipelineOrchestrator, ScanPolicy, StageFailure};
