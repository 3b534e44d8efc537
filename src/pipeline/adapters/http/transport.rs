//! Notification delivery over HTTP POST.

use crate::pipeline::domain::NotificationPayload;
use crate::pipeline::ports::{DeliveryError, NotificationTransport};
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers notification payloads as JSON over HTTP POST.
///
/// Each attempt carries its own request timeout; a timed-out request is a
/// failed attempt like any other.
#[derive(Debug, Clone)]
pub struct HttpNotificationTransport {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpNotificationTransport {
    /// Creates a transport with an explicit per-request timeout.
    #[must_use]
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            request_timeout,
        }
    }
}

impl Default for HttpNotificationTransport {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

#[async_trait]
impl NotificationTransport for HttpNotificationTransport {
    async fn deliver(&self, url: &str, payload: &NotificationPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .json(payload)
            .send()
            .await
            .map_err(|err| DeliveryError(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError(format!("callback returned {status}")))
        }
    }
}
