//! Port contracts for the pipeline.
//!
//! Ports define infrastructure-agnostic interfaces used by the gateway and
//! the orchestrator: the task state store, the external generation and
//! publishing collaborators, the notification transport, and the sleep
//! abstraction that keeps retry and polling delays testable.

pub mod generator;
pub mod publisher;
pub mod sleeper;
pub mod store;
pub mod transport;

pub use generator::{ArtifactGenerator, GeneratorError, GeneratorResult};
pub use publisher::{PublishError, PublishResult, Publisher};
pub use sleeper::Sleeper;
pub use store::{StateStoreError, StateStoreResult, TaskStateStore};
pub use transport::{DeliveryError, NotificationTransport};
