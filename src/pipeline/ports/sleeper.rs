//! Sleep abstraction for retry and polling delays.

use async_trait::async_trait;
use std::time::Duration;

/// Awaitable delay used between notification attempts and verification
/// polls.
///
/// Injecting the sleeper keeps the exact delay sequence testable without
/// real time passing, the same way the clock is injected for timestamps.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}
