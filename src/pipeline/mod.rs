//! Build-publish-notify pipeline: gateway, orchestrator, and state store.
//!
//! A submission enters through the [`services::SubmissionGateway`], is
//! admitted into the [`ports::TaskStateStore`], and is then driven by the
//! [`services::PipelineOrchestrator`] through generation, secret scanning,
//! publishing, reachability verification, and callback notification.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
