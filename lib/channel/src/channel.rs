//! Messaging channel trait and related types.
//!
//! A channel delivers inbound text messages to the relay and carries the
//! relay's reply chunks back to the user.

use crate::error::ChannelError;
use async_trait::async_trait;
use chatrelay_core::{ReplyToken, UserId};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where a reply to one inbound message goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTarget {
    /// Token issued with the inbound event.
    pub reply_token: ReplyToken,
    /// The user who sent the inbound message.
    pub user_id: UserId,
}

impl ReplyTarget {
    /// Creates a reply target.
    #[must_use]
    pub fn new(reply_token: impl Into<ReplyToken>, user_id: impl Into<UserId>) -> Self {
        Self {
            reply_token: reply_token.into(),
            user_id: user_id.into(),
        }
    }
}

/// One inbound text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// The sender.
    pub user_id: UserId,
    /// The message text.
    pub text: String,
    /// Where to send the reply.
    pub reply_target: ReplyTarget,
}

impl InboundMessage {
    /// Creates an inbound message.
    #[must_use]
    pub fn new(
        user_id: impl Into<UserId>,
        text: impl Into<String>,
        reply_token: impl Into<ReplyToken>,
    ) -> Self {
        let user_id = user_id.into();
        Self {
            reply_target: ReplyTarget {
                reply_token: reply_token.into(),
                user_id: user_id.clone(),
            },
            user_id,
            text: text.into(),
        }
    }
}

/// Trait for outbound message delivery.
#[async_trait]
pub trait MessagingChannel: Send + Sync {
    /// Sends the chunks as separate messages, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the delivery fails. Chunks sent
    /// before the failure are not recalled.
    async fn send_reply(
        &self,
        target: &ReplyTarget,
        chunks: &[String],
    ) -> Result<(), Report<ChannelError>>;

    /// Returns the channel name, for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: MessagingChannel + ?Sized> MessagingChannel for Arc<T> {
    async fn send_reply(
        &self,
        target: &ReplyTarget,
        chunks: &[String],
    ) -> Result<(), Report<ChannelError>> {
        (**self).send_reply(target, chunks).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_message_reply_target_carries_sender() {
        let message = InboundMessage::new("U123", "hello", "token-1");
        assert_eq!(message.reply_target.user_id, message.user_id);
        assert_eq!(message.reply_target.reply_token.as_str(), "token-1");
        assert_eq!(message.text, "hello");
    }
}
