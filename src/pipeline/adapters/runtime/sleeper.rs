//! Sleeper backed by the Tokio timer.

use crate::pipeline::ports::Sleeper;
use async_trait::async_trait;
use std::time::Duration;

/// Production sleeper; tests substitute a recording fake instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
