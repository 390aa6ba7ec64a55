//! Error types for the channel crate.
//!
//! - `ChannelError`: outbound delivery failures
//! - `WebhookError`: inbound webhook authentication and parsing failures

use std::fmt;

/// Errors from sending messages through a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The request could not be sent.
    RequestFailed { reason: String },
    /// The channel refused the request.
    Rejected { status: u16, message: String },
    /// The channel client could not be configured.
    InvalidConfig { reason: String },
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => write!(f, "channel request failed: {reason}"),
            Self::Rejected { status, message } => {
                write!(f, "channel rejected request with HTTP {status}: {message}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid channel configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for ChannelError {}

/// Errors from authenticating and decoding inbound webhooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    /// The signature header was absent.
    MissingSignature,
    /// The signature did not match the body.
    InvalidSignature,
    /// The body was not a valid webhook payload.
    MalformedPayload { reason: String },
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSignature => write!(f, "missing webhook signature"),
            Self::InvalidSignature => write!(f, "invalid webhook signature"),
            Self::MalformedPayload { reason } => {
                write!(f, "malformed webhook payload: {reason}")
            }
        }
    }
}

impl std::error::Error for WebhookError {}
