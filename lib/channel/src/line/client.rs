//! LINE Messaging API client.

use crate::channel::{MessagingChannel, ReplyTarget};
use crate::error::ChannelError;
use async_trait::async_trait;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Default API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.line.me";

/// Maximum number of message objects per reply or push request.
pub const MAX_MESSAGES_PER_REQUEST: usize = 5;

/// Maximum characters in one text message object.
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Configuration for the LINE client.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Channel access token.
    pub access_token: String,
    /// API base URL.
    pub api_base_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl LineConfig {
    /// Creates a configuration for the public API.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum OutboundMessage<'a> {
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<OutboundMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<OutboundMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

/// Client for the LINE reply and push APIs.
#[derive(Debug, Clone)]
pub struct LineClient {
    client: reqwest::Client,
    config: LineConfig,
}

impl LineClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: LineConfig) -> Result<Self, Report<ChannelError>> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChannelError::InvalidConfig {
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url.trim_end_matches('/'))
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), Report<ChannelError>> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.config.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        Err(ChannelError::Rejected {
            status: status.as_u16(),
            message,
        }
        .into())
    }

    fn text_messages(chunks: &[String]) -> Vec<OutboundMessage<'_>> {
        chunks
            .iter()
            .map(|text| OutboundMessage::Text {
                text: text.as_str(),
            })
            .collect()
    }
}

#[async_trait]
impl MessagingChannel for LineClient {
    /// Replies with the first five chunks and pushes the rest in batches.
    ///
    /// A reply token accepts a single request of at most five messages, so
    /// longer replies continue through the push API addressed to the user.
    #[instrument(skip(self, chunks), fields(user_id = %target.user_id, chunks = chunks.len()))]
    async fn send_reply(
        &self,
        target: &ReplyTarget,
        chunks: &[String],
    ) -> Result<(), Report<ChannelError>> {
        let mut batches = chunks.chunks(MAX_MESSAGES_PER_REQUEST);

        let Some(first) = batches.next() else {
            return Ok(());
        };
        self.post(
            "/v2/bot/message/reply",
            &ReplyRequest {
                reply_token: target.reply_token.as_str(),
                messages: Self::text_messages(first),
            },
        )
        .await?;

        for batch in batches {
            tracing::debug!(messages = batch.len(), "pushing reply overflow");
            self.post(
                "/v2/bot/message/push",
                &PushRequest {
                    to: target.user_id.as_str(),
                    messages: Self::text_messages(batch),
                },
            )
            .await?;
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "line"
    }
}
