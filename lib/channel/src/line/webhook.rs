//! Webhook payload decoding.
//!
//! Only text message events sent by a user are relayed. Every other event
//! type (follows, stickers, postbacks, ...) decodes into an `Other` variant
//! and is ignored.

use crate::channel::InboundMessage;
use crate::error::WebhookError;
use serde::Deserialize;

/// Top-level webhook body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// Bot user ID that received the events.
    #[serde(default)]
    pub destination: Option<String>,
    /// Delivered events. LINE sends an empty list when verifying the URL.
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One webhook event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// A message was sent to the bot.
    Message(MessageEvent),
    /// Any other event type.
    #[serde(other)]
    Other,
}

/// A message event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Token for replying to this event.
    #[serde(default)]
    pub reply_token: Option<String>,
    /// Who sent the message.
    pub source: EventSource,
    /// The message itself.
    pub message: EventMessage,
}

/// The origin of an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    /// `user`, `group` or `room`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The sending user, when LINE discloses it.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Message content.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventMessage {
    /// A text message.
    Text {
        /// Message ID.
        id: String,
        /// Message text.
        text: String,
    },
    /// Images, stickers, locations, ...
    #[serde(other)]
    Other,
}

impl WebhookPayload {
    /// Decodes a webhook body.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` if the body is not a valid payload.
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::MalformedPayload {
            reason: e.to_string(),
        })
    }

    /// Returns the relayable text messages, in delivery order.
    ///
    /// Events lacking a reply token or a user ID are skipped.
    #[must_use]
    pub fn text_messages(&self) -> Vec<InboundMessage> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Message(MessageEvent {
                    reply_token: Some(reply_token),
                    source:
                        EventSource {
                            user_id: Some(user_id),
                            ..
                        },
                    message: EventMessage::Text { text, .. },
                }) => Some(InboundMessage::new(
                    user_id.as_str(),
                    text.as_str(),
                    reply_token.as_str(),
                )),
                _ => None,
            })
            .collect()
    }
}
