//! Callback notification with bounded exponential-backoff retry.

use crate::pipeline::domain::{NotificationOutcome, NotificationPayload};
use crate::pipeline::ports::{NotificationTransport, Sleeper};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default retry schedule in seconds: sleep N before attempt N + 1.
pub(crate) const DEFAULT_RETRY_DELAYS_SECS: [u64; 5] = [1, 2, 4, 8, 16];

/// Delivers a notification payload with a fixed retry schedule.
///
/// The schedule length bounds the attempt count: one attempt per schedule
/// entry, with the Nth delay slept before the (N + 1)th attempt. The final
/// delay is therefore never slept. Each attempt's timeout belongs to the
/// transport; the notifier only owns the inter-attempt delays.
#[derive(Clone)]
pub struct Notifier<T, S>
where
    T: NotificationTransport,
    S: Sleeper,
{
    transport: Arc<T>,
    sleeper: Arc<S>,
    delays: Vec<Duration>,
}

impl<T, S> Notifier<T, S>
where
    T: NotificationTransport,
    S: Sleeper,
{
    /// Creates a notifier with an explicit delay schedule.
    #[must_use]
    pub const fn new(transport: Arc<T>, sleeper: Arc<S>, delays: Vec<Duration>) -> Self {
        Self {
            transport,
            sleeper,
            delays,
        }
    }

    /// Creates a notifier with the default `[1, 2, 4, 8, 16]` second
    /// schedule.
    #[must_use]
    pub fn with_default_schedule(transport: Arc<T>, sleeper: Arc<S>) -> Self {
        let delays = DEFAULT_RETRY_DELAYS_SECS
            .iter()
            .copied()
            .map(Duration::from_secs)
            .collect();
        Self::new(transport, sleeper, delays)
    }

    /// Drives the retry schedule to completion.
    ///
    /// Any non-2xx response or network-level failure counts as a retryable
    /// failure. An empty schedule makes no attempts and reports failure.
    pub async fn notify(&self, url: &str, payload: &NotificationPayload) -> NotificationOutcome {
        let mut attempts: u32 = 0;
        let mut last_error: Option<String> = None;

        for (index, delay) in self.delays.iter().enumerate() {
            attempts = attempts.saturating_add(1);
            match self.transport.deliver(url, payload).await {
                Ok(()) => {
                    info!(url, attempts, "notification delivered");
                    return NotificationOutcome::success(attempts);
                }
                Err(err) => {
                    warn!(url, attempts, error = %err, "notification attempt failed");
                    last_error = Some(err.to_string());
                }
            }
            if index + 1 < self.delays.len() {
                self.sleeper.sleep(*delay).await;
            }
        }

        warn!(url, attempts, "notification retries exhausted");
        NotificationOutcome::failure(attempts, last_error)
    }
}
