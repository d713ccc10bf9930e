//! Minimum-spacing rate governor for an upstream key
//!
//! The upstream enforces a global per-key limit, so every client that shares
//! a key must share one governor (wrap it in an `Arc`). Each call to
//! [`RateGovernor::throttle`] claims the next free slot under a lock, releases
//! the lock, then sleeps until its slot: concurrent callers are spaced by at
//! least `min_interval` and the lock is never held while sleeping or during
//! the network call that follows.

use crate::{CancelToken, GenerationError};
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

/// Stand-in slot when spacing would overflow the clock
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Serialises outbound requests to at most one per `min_interval`
///
/// Slots are handed out in lock-arrival order (`tokio::sync::Mutex` is
/// FIFO-fair).
///
/// # Examples
///
/// ```
/// use lectern_llm::RateGovernor;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let governor = Arc::new(RateGovernor::new(Duration::from_secs(6)));
/// assert_eq!(governor.min_interval(), Duration::from_secs(6));
/// ```
#[derive(Debug)]
pub struct RateGovernor {
    min_interval: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl RateGovernor {
    /// Create a governor enforcing `min_interval` between calls
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_slot: Mutex::new(None),
        }
    }

    /// The enforced spacing
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for the next free slot
    pub async fn throttle(&self) {
        let slot = self.claim_slot().await;
        sleep_until(slot).await;
    }

    /// Wait for the next free slot unless `cancel` fires first
    ///
    /// A slot claimed before cancellation stays claimed; the next caller is
    /// still spaced from it.
    pub async fn throttle_or_cancel(&self, cancel: &CancelToken) -> Result<(), GenerationError> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let slot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
            slot = self.claim_slot() => slot,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            _ = sleep_until(slot) => Ok(()),
        }
    }

    /// Atomically reserve the earliest slot at least `min_interval` after the previous one
    async fn claim_slot(&self) -> Instant {
        let mut last = self.last_slot.lock().await;
        let now = Instant::now();

        let slot = match *last {
            Some(previous) => now.max(
                previous
                    .checked_add(self.min_interval)
                    .unwrap_or_else(|| now + FAR_FUTURE),
            ),
            None => now,
        };
        *last = Some(slot);

        if slot > now {
            debug!("Rate limiting: waiting {:.1}s", (slot - now).as_secs_f64());
        }
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let governor = RateGovernor::new(Duration::from_secs(6));
        let start = Instant::now();
        governor.throttle().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_calls_are_spaced() {
        let governor = RateGovernor::new(Duration::from_secs(6));
        let mut stamps = Vec::new();

        for _ in 0..5 {
            governor.throttle().await;
            stamps.push(Instant::now());
        }

        for pair in stamps.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(6));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_idle_period() {
        let governor = RateGovernor::new(Duration::from_secs(6));
        governor.throttle().await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        let start = Instant::now();
        governor.throttle().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_never_share_a_slot() {
        let governor = Arc::new(RateGovernor::new(Duration::from_secs(6)));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let governor = Arc::clone(&governor);
                tokio::spawn(async move {
                    governor.throttle().await;
                    Instant::now()
                })
            })
            .collect();

        let mut stamps = Vec::new();
        for task in tasks {
            stamps.push(task.await.unwrap());
        }
        stamps.sort();

        for pair in stamps.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(6));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let governor = RateGovernor::new(Duration::from_secs(6));
        governor.throttle().await;

        let token = CancelToken::after(Duration::from_secs(2));
        let start = Instant::now();
        let result = governor.throttle_or_cancel(&token).await;

        assert_eq!(result, Err(GenerationError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_does_not_overflow() {
        let governor = RateGovernor::new(Duration::from_secs(u64::MAX / 2));
        governor.throttle().await;

        let token = CancelToken::after(Duration::from_secs(1));
        let result = tokio::spawn(async move { governor.throttle_or_cancel(&token).await })
            .await
            .unwrap();
        assert_eq!(result, Err(GenerationError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let governor = RateGovernor::new(Duration::from_secs(6));
        let (handle, token) = CancelToken::pair();
        handle.cancel();
        assert_eq!(
            governor.throttle_or_cancel(&token).await,
            Err(GenerationError::Cancelled)
        );
    }
}
