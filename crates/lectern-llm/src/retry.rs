//! Retry orchestration around a single upstream call
//!
//! Each attempt first claims a slot from the shared [`RateGovernor`], then
//! calls the generator. Failures are handled by tag:
//!
//! | Error | Attempts left | Exhausted |
//! |-------|---------------|-----------|
//! | `RateLimited` | wait `retry_after + 1s` (or 10s), retry | return the error |
//! | `TimedOut` | wait 5s, retry | `Ok(Generation::NoResponse)` |
//! | anything else | return the error | return the error |

use crate::{CancelToken, GenerationError, RateGovernor, TextGenerator};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of upstream calls per invocation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Back-off rules for transient failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total upstream calls allowed per invocation
    pub max_attempts: u32,

    /// Wait after a rate limit that carried no suggested delay
    pub rate_limit_fallback: Duration,

    /// Added to a suggested rate-limit delay
    pub rate_limit_padding: Duration,

    /// Wait after a timeout
    pub timeout_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_fallback: Duration::from_secs(10),
            rate_limit_padding: Duration::from_secs(1),
            timeout_backoff: Duration::from_secs(5),
        }
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Sleep, then try again
    RetryAfter(Duration),
    /// Stop and hand the caller the "no response" sentinel
    NoResponse,
    /// Stop and propagate the error
    GiveUp,
}

impl RetryPolicy {
    /// Decide how to react to `error` raised by attempt number `attempt` (1-based)
    pub fn decide(&self, error: &GenerationError, attempt: u32) -> RetryDecision {
        let attempts_left = attempt < self.max_attempts;

        match error {
            GenerationError::RateLimited { retry_after } if attempts_left => {
                let delay = retry_after
                    .map(|suggested| suggested.saturating_add(self.rate_limit_padding))
                    .unwrap_or(self.rate_limit_fallback);
                RetryDecision::RetryAfter(delay)
            }
            GenerationError::TimedOut if attempts_left => {
                RetryDecision::RetryAfter(self.timeout_backoff)
            }
            GenerationError::TimedOut => RetryDecision::NoResponse,
            _ => RetryDecision::GiveUp,
        }
    }
}

/// Outcome of a resilient invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    /// The upstream produced text
    Response(String),

    /// Every attempt timed out; callers should use their own default content
    NoResponse,
}

impl Generation {
    /// The response text, if any
    pub fn into_text(self) -> Option<String> {
        match self {
            Generation::Response(text) => Some(text),
            Generation::NoResponse => None,
        }
    }
}

/// A text generator wrapped with rate governance and retries
///
/// # Examples
///
/// ```
/// use lectern_llm::{Generation, MockProvider, RateGovernor, ResilientClient, RetryPolicy};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() {
/// let governor = Arc::new(RateGovernor::new(Duration::from_secs(6)));
/// let client = ResilientClient::new(MockProvider::new("[]"), governor, RetryPolicy::default());
///
/// let outcome = client.invoke("prompt").await.unwrap();
/// assert_eq!(outcome, Generation::Response("[]".to_string()));
/// # }
/// ```
pub struct ResilientClient<G> {
    generator: G,
    governor: Arc<RateGovernor>,
    policy: RetryPolicy,
}

impl<G> ResilientClient<G>
where
    G: TextGenerator,
{
    /// Wrap a generator; the governor should be shared by every client of the same key
    pub fn new(generator: G, governor: Arc<RateGovernor>, policy: RetryPolicy) -> Self {
        Self {
            generator,
            governor,
            policy,
        }
    }

    /// The wrapped generator
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The retry policy in force
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call the upstream with throttling and retries
    pub async fn invoke(&self, prompt: &str) -> Result<Generation, GenerationError> {
        self.invoke_with_cancel(prompt, &CancelToken::never()).await
    }

    /// Call the upstream, abandoning promptly once `cancel` fires
    ///
    /// Cancellation is observed during the throttle wait, the upstream call
    /// itself and every back-off wait, and yields `Err(Cancelled)`.
    pub async fn invoke_with_cancel(
        &self,
        prompt: &str,
        cancel: &CancelToken,
    ) -> Result<Generation, GenerationError> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            self.governor.throttle_or_cancel(cancel).await?;

            debug!(
                "Calling {} (attempt {}/{}, prompt length {})",
                self.generator.name(),
                attempt,
                max_attempts,
                prompt.len()
            );

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                outcome = self.generator.generate(prompt) => outcome,
            };

            let error = match outcome {
                Ok(text) => {
                    info!(
                        "Got response from {} ({} chars)",
                        self.generator.name(),
                        text.len()
                    );
                    return Ok(Generation::Response(text));
                }
                Err(error) => error,
            };

            match self.policy.decide(&error, attempt) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(
                        "{}. Retrying in {:.1}s (attempt {}/{})",
                        error,
                        delay.as_secs_f64(),
                        attempt,
                        max_attempts
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                RetryDecision::NoResponse => {
                    warn!(
                        "Request timed out after {} attempts, returning no response",
                        max_attempts
                    );
                    return Ok(Generation::NoResponse);
                }
                RetryDecision::GiveUp => {
                    if error.is_transient() {
                        warn!("{} after {} attempts", error, attempt);
                    } else {
                        warn!("Non-retryable upstream error: {}", error);
                    }
                    return Err(error);
                }
            }
        }

        Ok(Generation::NoResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;
    use tokio::time::Instant;

    fn client(mock: &MockProvider) -> ResilientClient<MockProvider> {
        ResilientClient::new(
            mock.clone(),
            Arc::new(RateGovernor::new(Duration::from_secs(6))),
            RetryPolicy::default(),
        )
    }

    #[test]
    fn test_decide_rate_limit_with_hint() {
        let policy = RetryPolicy::default();
        let error = GenerationError::RateLimited {
            retry_after: Some(Duration::from_secs(20)),
        };
        assert_eq!(
            policy.decide(&error, 1),
            RetryDecision::RetryAfter(Duration::from_secs(21))
        );
        assert_eq!(policy.decide(&error, 3), RetryDecision::GiveUp);
    }

    #[test]
    fn test_decide_huge_hint_saturates() {
        let policy = RetryPolicy::default();
        let error = GenerationError::RateLimited {
            retry_after: Some(Duration::MAX),
        };
        assert_eq!(
            policy.decide(&error, 1),
            RetryDecision::RetryAfter(Duration::MAX)
        );
    }

    #[test]
    fn test_decide_timeout() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(&GenerationError::TimedOut, 2),
            RetryDecision::RetryAfter(Duration::from_secs(5))
        );
        assert_eq!(
            policy.decide(&GenerationError::TimedOut, 3),
            RetryDecision::NoResponse
        );
    }

    #[test]
    fn test_decide_other_errors_never_retry() {
        let policy = RetryPolicy::default();
        let error = GenerationError::InvalidRequest("bad".into());
        assert_eq!(policy.decide(&error, 1), RetryDecision::GiveUp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let mock = MockProvider::new("ok");
        let outcome = client(&mock).invoke("p").await;
        assert_eq!(outcome, Ok(Generation::Response("ok".into())));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_hint_waits_fallback_then_succeeds() {
        let mock = MockProvider::new("second")
            .then_err(GenerationError::RateLimited { retry_after: None });

        let outcome = client(&mock).invoke("p").await;
        assert_eq!(outcome, Ok(Generation::Response("second".into())));

        let calls = mock.call_instants();
        assert_eq!(calls.len(), 2);
        let gap = calls[1] - calls[0];
        assert!(gap >= Duration::from_secs(10), "gap was {:?}", gap);
        assert!(gap < Duration::from_secs(11), "gap was {:?}", gap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_with_hint_waits_hint_plus_padding() {
        let mock = MockProvider::new("later").then_err(GenerationError::RateLimited {
            retry_after: Some(Duration::from_secs(20)),
        });

        client(&mock).invoke("p").await.unwrap();

        let calls = mock.call_instants();
        assert!(calls[1] - calls[0] >= Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_propagates() {
        let error = GenerationError::RateLimited { retry_after: None };
        let mock = MockProvider::new("never").then_err_times(error.clone(), 5);

        let outcome = client(&mock).invoke("p").await;
        assert_eq!(outcome, Err(error));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_timeouts_return_no_response() {
        let mock = MockProvider::new("never").then_err_times(GenerationError::TimedOut, 3);

        let outcome = client(&mock).invoke("p").await;
        assert_eq!(outcome, Ok(Generation::NoResponse));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_backoff_respects_governor() {
        let mock = MockProvider::new("ok").then_err(GenerationError::TimedOut);

        client(&mock).invoke("p").await.unwrap();

        // 5s back-off is shorter than the 6s spacing, so the governor wins.
        let calls = mock.call_instants();
        assert!(calls[1] - calls[0] >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let mock = MockProvider::new("never").then_err(GenerationError::Auth("expired".into()));

        let outcome = client(&mock).invoke("p").await;
        assert_eq!(outcome, Err(GenerationError::Auth("expired".into())));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let mock = MockProvider::new("never")
            .then_err(GenerationError::RateLimited { retry_after: None });
        let token = CancelToken::after(Duration::from_secs(3));

        let start = Instant::now();
        let outcome = client(&mock).invoke_with_cancel("p", &token).await;

        assert_eq!(outcome, Err(GenerationError::Cancelled));
        assert_eq!(mock.call_count(), 1);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    struct SlowProvider {
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl TextGenerator for SlowProvider {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(self.delay).await;
            Ok("late".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_upstream_call() {
        let client = ResilientClient::new(
            SlowProvider {
                delay: Duration::from_secs(60),
            },
            Arc::new(RateGovernor::new(Duration::from_secs(6))),
            RetryPolicy::default(),
        );
        let token = CancelToken::after(Duration::from_secs(2));

        let start = Instant::now();
        let outcome = client.invoke_with_cancel("p", &token).await;

        assert_eq!(outcome, Err(GenerationError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_yields_no_response() {
        let mock = MockProvider::new("unused");
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        let client = ResilientClient::new(
            mock.clone(),
            Arc::new(RateGovernor::new(Duration::from_secs(6))),
            policy,
        );

        assert_eq!(client.invoke("p").await, Ok(Generation::NoResponse));
        assert_eq!(mock.call_count(), 0);
    }
}
