/// LLM Client — the single point of entry for completion-service calls.
///
/// Rankers and estimators depend on the narrow `CompletionService` trait, never on
/// `LlmClient` directly, so they can be driven by a deterministic fake in tests.
///
/// A call either returns whatever text the model produced (possibly garbage, which
/// callers route through `extract::extract_json`) or fails with a typed `LlmError`
/// after transient failures have been retried.
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod extract;
pub mod prompts;
#[cfg(test)]
pub mod testing;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Default model; overridable through `COMPLETION_MODEL`.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
/// Retries after the first attempt, for transient failures only.
pub const MAX_RETRIES: u32 = 2;
const BASE_BACKOFF_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl LlmError {
    /// Transport failures, rate limiting and 5xx are worth another attempt; anything
    /// the service answered deliberately is not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LlmError::Api { status, .. } => *status == 429 || (500..600).contains(status),
        }
    }
}

/// One request to the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_message: String,
    pub model: String,
    /// Caller / session identifier, forwarded for attribution.
    pub caller_id: String,
    /// Feature tag, e.g. `job_recommendations`.
    pub feature: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Model and timeouts applied to every outgoing completion request.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub ranking_timeout: Duration,
    pub estimation_timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ranking_timeout: Duration::from_secs(60),
            estimation_timeout: Duration::from_secs(45),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    metadata: AnthropicMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AnthropicMetadata<'a> {
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Completion client for the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = AnthropicRequest {
            model: &request.model,
            max_tokens: MAX_TOKENS,
            system: &request.system_message,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &request.prompt,
            }],
            metadata: AnthropicMetadata {
                user_id: &request.caller_id,
            },
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .timeout(request.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, body));
        }

        let parsed: AnthropicResponse = response.json().await?;
        debug!(
            feature = %request.feature,
            "Completion succeeded: input_tokens={}, output_tokens={}",
            parsed.usage.input_tokens, parsed.usage.output_tokens
        );

        Ok(CompletionResponse {
            content: parsed.text().unwrap_or_default().to_string(),
        })
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    /// Retries transient failures up to `MAX_RETRIES` times with exponential backoff
    /// (500ms, 1s); the last error is returned once retries run out. A response that
    /// arrived is returned as-is, however malformed.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        with_retries(&request.feature, || self.attempt(request)).await
    }
}

/// Runs `operation` until it succeeds, fails permanently, or `MAX_RETRIES` retries of
/// transient failures are used up. The last error is returned.
async fn with_retries<T, F, Fut>(feature: &str, mut operation: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < MAX_RETRIES => {
                attempt += 1;
                let delay = backoff(attempt);
                warn!(
                    feature = %feature,
                    "Completion attempt {} failed ({e}), retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(
                    feature = %feature,
                    "Completion failed after {} attempt(s): {e}",
                    attempt + 1
                );
                return Err(e);
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(BASE_BACKOFF_MS * (1 << attempt.saturating_sub(1)))
}

fn api_error(status: StatusCode, body: String) -> LlmError {
    let message = serde_json::from_str::<AnthropicError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}
