//! Configuration for the upstream client

use crate::{RateGovernor, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Longest configurable wait or spacing (seconds)
pub const MAX_WAIT_SECS: u64 = 86_400;

/// Configuration for the upstream text generator, its rate governor and retries
///
/// # Examples
///
/// ```
/// use lectern_llm::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.min_interval_secs, 6);
/// assert_eq!(config.max_attempts, 3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Minimum spacing between requests (seconds)
    /// Default: 6 (10 requests per minute)
    pub min_interval_secs: u64,

    /// Total upstream calls per invocation
    pub max_attempts: u32,

    /// Wait after a rate limit without a suggested delay (seconds)
    pub rate_limit_fallback_secs: u64,

    /// Added to a suggested rate-limit delay (seconds)
    pub rate_limit_padding_secs: u64,

    /// Wait after a timeout (seconds)
    pub timeout_backoff_secs: u64,

    /// Client-side deadline for a single HTTP request (seconds)
    pub request_timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling probability
    pub top_p: f32,

    /// Top-k sampling
    pub top_k: u32,

    /// Output token cap
    pub max_output_tokens: u32,
}

impl Default for LlmConfig {
    /// Free-tier friendly defaults
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            min_interval_secs: 6,
            max_attempts: 3,
            rate_limit_fallback_secs: 10,
            rate_limit_padding_secs: 1,
            timeout_backoff_secs: 5,
            request_timeout_secs: 120,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

impl LlmConfig {
    /// Paid-tier preset: tighter spacing, one extra attempt
    pub fn paid_tier() -> Self {
        Self {
            min_interval_secs: 1,
            max_attempts: 4,
            ..Self::default()
        }
    }

    /// Minimum spacing as a Duration
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }

    /// Per-request deadline as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Retry policy described by this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            rate_limit_fallback: Duration::from_secs(self.rate_limit_fallback_secs),
            rate_limit_padding: Duration::from_secs(self.rate_limit_padding_secs),
            timeout_backoff: Duration::from_secs(self.timeout_backoff_secs),
        }
    }

    /// A fresh governor for one upstream key
    pub fn governor(&self) -> Arc<RateGovernor> {
        Arc::new(RateGovernor::new(self.min_interval()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        for (name, secs) in [
            ("min_interval_secs", self.min_interval_secs),
            ("rate_limit_fallback_secs", self.rate_limit_fallback_secs),
            ("rate_limit_padding_secs", self.rate_limit_padding_secs),
            ("timeout_backoff_secs", self.timeout_backoff_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if secs > MAX_WAIT_SECS {
                return Err(format!("{} {} exceeds {}", name, secs, MAX_WAIT_SECS));
            }
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(format!("top_p {} out of range [0.0, 1.0]", self.top_p));
        }
        if self.max_output_tokens == 0 {
            return Err("max_output_tokens must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
