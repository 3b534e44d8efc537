//! Infrastructure adapters implementing the pipeline ports.

pub mod http;
pub mod memory;
pub mod runtime;

pub use http::HttpNotificationTransport;
pub use memory::InMemoryTaskStateStore;
pub use runtime::TokioSleeper;
