//! Error types for the conversation crate.
//!
//! Store operations themselves cannot fail: corrupt histories are repaired
//! silently. Only constructing a history policy from bad settings is an
//! error, and it surfaces at startup.

use std::fmt;

/// Errors from building a [`HistoryPolicy`](crate::HistoryPolicy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryPolicyError {
    /// The history length cap must leave room for the system turn.
    ZeroMaxLength,
    /// The system instruction must contain text.
    EmptySystemInstruction,
}

impl fmt::Display for HistoryPolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxLength => write!(f, "maximum history length must be at least 1"),
            Self::EmptySystemInstruction => write!(f, "system instruction must not be empty"),
        }
    }
}

impl std::error::Error for HistoryPolicyError {}
