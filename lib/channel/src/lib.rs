//! Messaging channels for chatrelay.
//!
//! This crate provides:
//!
//! - **MessagingChannel trait**: outbound delivery of reply chunks
//! - **Splitter**: cutting long replies into transport-sized chunks
//! - **LINE**: webhook verification, event decoding and the reply/push client

pub mod channel;
pub mod error;
pub mod line;
pub mod splitter;

pub use channel::{InboundMessage, MessagingChannel, ReplyTarget};
pub use error::{ChannelError, WebhookError};
pub use splitter::split;
