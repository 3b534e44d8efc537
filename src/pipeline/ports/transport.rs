//! Notification delivery transport port.

use crate::pipeline::domain::NotificationPayload;
use async_trait::async_trait;
use thiserror::Error;

/// Single-attempt delivery of a notification payload.
///
/// Implementations collapse non-2xx responses and network-level failures
/// into the same retryable [`DeliveryError`]; the retry schedule lives in
/// the notifier, not the transport.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Delivers the payload to the target URL once.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] for any non-2xx response or network-level
    /// failure.
    async fn deliver(&self, url: &str, payload: &NotificationPayload) -> Result<(), DeliveryError>;
}

/// A failed delivery attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct DeliveryError(pub String);
