//! OpenAI-compatible chat completions backend.

use crate::backend::CompletionEngine;
use crate::error::CompletionError;
use async_trait::async_trait;
use chatrelay_conversation::Turn;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL, without the `/v1/...` path.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature, if overridden.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate, if capped.
    pub max_tokens: Option<u32>,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a configuration for the public OpenAI API.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Points the backend at another OpenAI-compatible server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Completion engine backed by `POST /v1/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiEngine {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiEngine {
    /// Creates a new backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::InvalidConfig {
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionEngine for OpenAiEngine {
    #[instrument(skip(self, turns), fields(model = %self.config.model, turns = turns.len()))]
    async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: turns,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error.code, envelope.error.message),
                Err(_) => (None, body),
            };

            tracing::debug!(status = %status, code = ?code, "completion API returned error");

            return Err(match status.as_u16() {
                429 => CompletionError::RateLimited { retry_after_secs },
                401 | 403 => CompletionError::Unauthorized { reason: message },
                status => CompletionError::Api {
                    status,
                    code,
                    message,
                },
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| CompletionError::ResponseParseFailed {
                    reason: e.to_string(),
                })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn engine(server: &MockServer) -> OpenAiEngine {
        OpenAiEngine::new(
            OpenAiConfig::new("sk-test")
                .with_base_url(server.uri())
                .with_model("gpt-test"),
        )
        .expect("engine")
    }

    fn dialogue() -> Vec<Turn> {
        vec![Turn::system("Be brief."), Turn::user("hello")]
    }

    #[tokio::test]
    async fn complete_sends_dialogue_and_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-test",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = engine(&server).await.complete(&dialogue()).await;

        assert_eq!(reply, Ok("hi".to_string()));
    }

    #[tokio::test]
    async fn complete_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_json(serde_json::json!({
                        "error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}
                    })),
            )
            .mount(&server)
            .await;

        let err = engine(&server)
            .await
            .complete(&dialogue())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CompletionError::RateLimited {
                retry_after_secs: Some(7)
            }
        );
        assert_eq!(err.kind(), FailureKind::RateLimited);
    }

    #[tokio::test]
    async fn complete_maps_401_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "code": "invalid_api_key"}
            })))
            .mount(&server)
            .await;

        let err = engine(&server)
            .await
            .complete(&dialogue())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::AuthFailed);
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn complete_keeps_unstructured_error_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = engine(&server)
            .await
            .complete(&dialogue())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CompletionError::Api {
                status: 502,
                code: None,
                message: "bad gateway".to_string(),
            }
        );
        assert_eq!(err.kind(), FailureKind::Other);
    }

    #[tokio::test]
    async fn complete_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = engine(&server)
            .await
            .complete(&dialogue())
            .await
            .unwrap_err();

        assert_eq!(err, CompletionError::EmptyResponse);
    }

    #[tokio::test]
    async fn complete_reports_unparseable_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = engine(&server)
            .await
            .complete(&dialogue())
            .await
            .unwrap_err();

        assert!(matches!(err, CompletionError::ResponseParseFailed { .. }));
    }

    #[test]
    fn config_defaults() {
        let config = OpenAiConfig::new("sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}
