//! HTTP adapters for outbound delivery.

mod transport;

pub use transport::HttpNotificationTransport;
