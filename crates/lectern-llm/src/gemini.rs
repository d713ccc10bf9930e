//! Gemini Provider Implementation
//!
//! Talks to Google's `generateContent` REST API.
//!
//! # Features
//!
//! - Async HTTP communication with a client-side request deadline
//! - Configurable endpoint, model and sampling settings
//! - Failure classification at the boundary: HTTP status and the API's
//!   `google.rpc` error status become tagged [`GenerationError`] variants,
//!   including the server's suggested retry delay
//!
//! Retries and rate governance are not done here; wrap the provider in a
//! [`crate::ResilientClient`].
//!
//! # Examples
//!
//! ```no_run
//! use lectern_llm::{GeminiProvider, LlmConfig};
//!
//! let provider = GeminiProvider::from_config("api-key", &LlmConfig::default()).unwrap();
//! ```

use crate::{GenerationError, LlmConfig, TextGenerator};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

static RETRY_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)retry in (\d+(?:\.\d+)?)\s*s").expect("static regex is valid")
});

/// Gemini API provider
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize, Default)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<Value>,
}

impl GeminiProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns `Auth` for a blank key and `Communication` if the HTTP client
    /// cannot be built.
    pub fn from_config(api_key: impl Into<String>, config: &LlmConfig) -> Result<Self, GenerationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::Auth("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenerationError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client,
            generation_config: GenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    /// The model this provider calls
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: &self.generation_config,
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &body));
        }

        extract_text(&body)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn classify_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::TimedOut
    } else {
        GenerationError::Communication(format!("Request failed: {}", e))
    }
}

/// Map a non-success HTTP answer onto a tagged error
fn classify_error(status: u16, body: &str) -> GenerationError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_default();
    let message = if api_error.message.is_empty() {
        body.trim().to_string()
    } else {
        api_error.message.clone()
    };

    match (status, api_error.status.as_str()) {
        (429, _) | (_, "RESOURCE_EXHAUSTED") => GenerationError::RateLimited {
            retry_after: retry_delay(&api_error),
        },
        (504, _) | (408, _) | (_, "DEADLINE_EXCEEDED") => GenerationError::TimedOut,
        (401, _) | (403, _) | (_, "UNAUTHENTICATED") | (_, "PERMISSION_DENIED") => {
            GenerationError::Auth(message)
        }
        (400, _) | (404, _) => GenerationError::InvalidRequest(message),
        _ => GenerationError::Communication(format!("HTTP {}: {}", status, message)),
    }
}

/// Suggested delay from a `RetryInfo` detail, else from a "retry in Ns" phrase
fn retry_delay(api_error: &ApiError) -> Option<Duration> {
    let from_details = api_error.details.iter().find_map(|detail| {
        let is_retry_info = detail
            .get("@type")
            .and_then(Value::as_str)
            .is_some_and(|t| t.ends_with("RetryInfo"));
        if !is_retry_info {
            return None;
        }
        detail
            .get("retryDelay")
            .and_then(Value::as_str)
            .and_then(parse_seconds)
    });

    from_details.or_else(|| {
        RETRY_IN
            .captures(&api_error.message)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    })
}

/// Parse a protobuf duration string such as `"37s"` or `"1.5s"`
fn parse_seconds(value: &str) -> Option<Duration> {
    let secs = value.trim().strip_suffix('s')?.parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Concatenate the text parts of the first candidate
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(GenerationError::InvalidResponse(format!(
            "Empty response: {}",
            reason
        )));
    };

    if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
        warn!("Response stopped at the output token limit and may be truncated");
    }

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    debug!("Gemini response length: {} chars", text.len());
    Ok(text)
}
