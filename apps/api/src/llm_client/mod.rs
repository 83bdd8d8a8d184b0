//! LLM Client — relays composed conversations to the Anthropic Messages API.
//!
//! Handlers depend on the `ChatModel` trait, never on this client directly,
//! so the relay can be stubbed in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model behind every chat model id.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// A language model that answers a conversation under a system prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenates every text block in order.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
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

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    /// Sends one conversation to the Messages API. Rate limits and upstream
    /// failures are retried up to `MAX_RETRIES` times; other errors are final.
    pub async fn call(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Result<LlmResponse, LlmError> {
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages,
        };

        let mut last_error = None;
        for attempt in 0..MAX_RETRIES {
            if let Some(delay) = backoff(attempt) {
                tokio::time::sleep(delay).await;
            }
            match self.send(&body).await {
                Ok(response) => {
                    debug!(
                        attempt,
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        "Chat relay answered"
                    );
                    return Ok(response);
                }
                Err(Outcome::Retry(err)) => {
                    warn!(attempt, error = %err, "Chat relay attempt failed");
                    last_error = Some(err);
                }
                Err(Outcome::Fail(err)) => return Err(err),
            }
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    async fn send(&self, body: &AnthropicRequest<'_>) -> Result<LlmResponse, Outcome> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| Outcome::Retry(e.into()))?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| Outcome::Fail(e.into()));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AnthropicError>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        let err = LlmError::Api {
            status: status.as_u16(),
            message,
        };
        if is_retryable(status) {
            Err(Outcome::Retry(err))
        } else {
            Err(Outcome::Fail(err))
        }
    }
}

enum Outcome {
    Retry(LlmError),
    Fail(LlmError),
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before the given attempt: none for the first, then 1s, 2s, ...
fn backoff(attempt: u32) -> Option<Duration> {
    (attempt > 0).then(|| Duration::from_secs(1 << (attempt - 1)))
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let response = self.call(system, messages).await?;
        response.text().ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_response_text_joins_text_blocks() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [
                { "type": "text", "text": "Olá" },
                { "type": "tool_use" },
                { "type": "text", "text": ", Ana." }
            ],
            "usage": { "input_tokens": 10, "output_tokens": 3 }
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Olá, Ana."));
    }

    #[test]
    fn test_response_without_text_is_none() {
        let response: LlmResponse = serde_json::from_value(json!({
            "content": [],
            "usage": { "input_tokens": 1, "output_tokens": 0 }
        }))
        .unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_backoff_doubles_after_first_attempt() {
        assert_eq!(backoff(0), None);
        assert_eq!(backoff(1), Some(Duration::from_secs(1)));
        assert_eq!(backoff(2), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_only_rate_limits_and_server_errors_retry() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_request_serializes_messages_with_lowercase_roles() {
        let messages = vec![ChatMessage {
            role: Role::User,
            content: "hi".into(),
        }];
        let body = serde_json::to_value(AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: "sys",
            messages: &messages,
        })
        .unwrap();
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["system"], "sys");
    }
}
