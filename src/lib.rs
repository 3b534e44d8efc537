//! Gantry: a task lifecycle orchestrator for build-publish-notify
//! pipelines.
//!
//! A submission names a task, a round, and a natural-language brief.
//! Gantry validates and admits it, then drives a fixed pipeline: generate
//! an artifact, scan it for embedded credentials, publish it, verify the
//! deployed content is reachable, and notify a callback URL with retry.
//! Every run is tracked in a state store that answers status queries.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure run-lifecycle logic with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for the state store and the
//!   external collaborators
//! - **Adapters**: Concrete implementations of ports (in-memory store,
//!   HTTP delivery, runtime timers)
//!
//! # Modules
//!
//! - [`pipeline`]: Submission gateway, orchestrator, notifier, and state
//!   store
//! - [`scanner`]: Secret scanning and masking for generated artifacts
//! - [`worker`]: Tracked background execution for accepted runs

pub mod pipeline;
pub mod scanner;
pub mod worker;
