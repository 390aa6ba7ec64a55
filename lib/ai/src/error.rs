//! Error types for the AI crate.
//!
//! `CompletionError` describes what went wrong talking to a completion
//! engine. The relay only needs to know which user-facing fallback to show,
//! so every error also classifies into a coarse [`FailureKind`].

use std::fmt;

/// Coarse classification of a completion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The engine is throttling requests or the quota is exhausted.
    RateLimited,
    /// The engine rejected our credentials.
    AuthFailed,
    /// Anything else.
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::AuthFailed => write!(f, "auth_failed"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Errors from completion engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The request could not be sent or the connection broke.
    RequestFailed { reason: String },
    /// The engine answered with an error status.
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// Rate limit or quota exceeded.
    RateLimited { retry_after_secs: Option<u64> },
    /// Credentials were rejected.
    Unauthorized { reason: String },
    /// The response body was not understood.
    ResponseParseFailed { reason: String },
    /// The engine returned no text.
    EmptyResponse,
    /// No answer within the allotted time.
    Timeout,
    /// The engine client could not be configured.
    InvalidConfig { reason: String },
}

impl CompletionError {
    /// Classifies the error.
    ///
    /// Structured information (dedicated variants, HTTP status, provider
    /// error codes) wins. Free-form messages are only scanned for rate-limit
    /// and authentication markers when nothing structured matched.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Unauthorized { .. } => FailureKind::AuthFailed,
            Self::Api { status: 429, .. } => FailureKind::RateLimited,
            Self::Api {
                status: 401 | 403, ..
            } => FailureKind::AuthFailed,
            Self::Api {
                code: Some(code), ..
            } if matches!(code.as_str(), "rate_limit_exceeded" | "insufficient_quota") => {
                FailureKind::RateLimited
            }
            Self::Api {
                code: Some(code), ..
            } if code == "invalid_api_key" => FailureKind::AuthFailed,
            Self::Timeout | Self::EmptyResponse => FailureKind::Other,
            _ => classify_message(&self.to_string()),
        }
    }
}

/// Scans an error message for rate-limit and authentication markers.
#[must_use]
pub fn classify_message(message: &str) -> FailureKind {
    const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "ratelimit", "too many requests"];
    const AUTH_MARKERS: &[&str] = &["authentication", "unauthorized", "api key", "api_key"];

    let message = message.to_lowercase();
    if RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m)) {
        FailureKind::RateLimited
    } else if AUTH_MARKERS.iter().any(|m| message.contains(m)) {
        FailureKind::AuthFailed
    } else {
        FailureKind::Other
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => write!(f, "completion request failed: {reason}"),
            Self::Api {
                status,
                code,
                message,
            } => match code {
                Some(code) => write!(f, "completion API error {status} ({code}): {message}"),
                None => write!(f, "completion API error {status}: {message}"),
            },
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::Unauthorized { reason } => write!(f, "authentication failed: {reason}"),
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse completion response: {reason}")
            }
            Self::EmptyResponse => write!(f, "completion response contained no text"),
            Self::Timeout => write!(f, "completion request timed out"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid completion engine configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for CompletionError {}
