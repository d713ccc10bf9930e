//! Lectern LLM Provider Layer
//!
//! Everything that talks to, or stands in for, the upstream text-generation
//! service.
//!
//! # Architecture
//!
//! ```text
//! prompt → ResilientClient → RateGovernor.throttle() → TextGenerator.generate()
//!                 ↑                                            │
//!                 └──── RetryPolicy (rate limit / timeout) ────┘
//! ```
//!
//! Providers classify failures at their own boundary into a tagged
//! [`GenerationError`]; the retry policy only ever looks at the tag.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted mock for testing
//! - `GeminiProvider`: Google Gemini `generateContent` API
//!
//! # Examples
//!
//! ```
//! use lectern_llm::{MockProvider, TextGenerator};
//!
//! # async fn example() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod cancel;
pub mod config;
pub mod gemini;
pub mod governor;
pub mod retry;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

pub use cancel::{CancelHandle, CancelToken};
pub use config::LlmConfig;
pub use gemini::GeminiProvider;
pub use governor::RateGovernor;
pub use retry::{Generation, ResilientClient, RetryDecision, RetryPolicy};

/// Errors that can occur during LLM operations
///
/// Providers map their transport-level failures onto these variants, so
/// retry decisions never depend on error message text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Upstream rejected the request for rate or quota reasons
    #[error("Rate limit exceeded{}", retry_hint(.retry_after))]
    RateLimited {
        /// Delay suggested by the upstream, when it sent one
        retry_after: Option<Duration>,
    },

    /// The request did not complete before its deadline
    #[error("Request timed out")]
    TimedOut,

    /// Credentials missing, invalid or not allowed to use the model
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Upstream refused the request as malformed or unknown
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream answered, but not with anything we can read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The caller gave up before a response arrived
    #[error("Request cancelled")]
    Cancelled,
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(delay) => format!(" (retry in {:.1}s)", delay.as_secs_f64()),
        None => String::new(),
    }
}

impl GenerationError {
    /// Whether the retry policy may try this request again
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited { .. } | GenerationError::TimedOut
        )
    }
}

/// An upstream text generator
///
/// Implementations perform exactly one request per call: throttling and
/// retries are layered on top by [`ResilientClient`].
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Short provider name for logs
    fn name(&self) -> &str {
        "llm"
    }
}

/// Mock LLM provider for deterministic testing
///
/// Returns scripted outcomes in order, then the default response once the
/// script runs out. Clones share the script, the call counter and the
/// recorded call instants.
///
/// # Examples
///
/// ```
/// use lectern_llm::{GenerationError, MockProvider, TextGenerator};
///
/// # async fn example() {
/// let provider = MockProvider::new("fine")
///     .then_err(GenerationError::TimedOut)
///     .then_ok("first");
///
/// assert!(provider.generate("p").await.is_err());
/// assert_eq!(provider.generate("p").await.unwrap(), "first");
/// assert_eq!(provider.generate("p").await.unwrap(), "fine");
/// assert_eq!(provider.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, GenerationError>>>>,
    calls: Arc<Mutex<Vec<Instant>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful response
    pub fn then_ok(self, response: impl Into<String>) -> Self {
        self.push(Ok(response.into()));
        self
    }

    /// Queue a failure
    pub fn then_err(self, error: GenerationError) -> Self {
        self.push(Err(error));
        self
    }

    /// Queue the same failure `times` times
    pub fn then_err_times(self, error: GenerationError, times: usize) -> Self {
        for _ in 0..times {
            self.push(Err(error.clone()));
        }
        self
    }

    fn push(&self, outcome: Result<String, GenerationError>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Instants at which generate was called, in call order
    pub fn call_instants(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl TextGenerator for MockProvider {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Instant::now());
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        scripted.unwrap_or_else(|| Ok(self.default_response.clone()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt").await;
        assert_eq!(result, Ok("Test response".to_string()));
    }

    #[tokio::test]
    async fn test_mock_provider_script_then_default() {
        let provider = MockProvider::default()
            .then_ok("one")
            .then_err(GenerationError::Auth("bad key".into()));

        assert_eq!(provider.generate("a").await.unwrap(), "one");
        assert!(matches!(
            provider.generate("b").await,
            Err(GenerationError::Auth(_))
        ));
        assert_eq!(provider.generate("c").await.unwrap(), "Default mock response");
        assert_eq!(provider.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_transient_classification() {
        assert!(GenerationError::TimedOut.is_transient());
        assert!(GenerationError::RateLimited { retry_after: None }.is_transient());
        assert!(!GenerationError::Auth("x".into()).is_transient());
        assert!(!GenerationError::Cancelled.is_transient());
    }

    #[test]
    fn test_rate_limit_display_includes_hint() {
        let err = GenerationError::RateLimited {
            retry_after: Some(Duration::from_millis(2500)),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded (retry in 2.5s)");
        let err = GenerationError::RateLimited { retry_after: None };
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }
}
