//! Error types for the relay crate.

use std::fmt;

/// Errors from validating relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayConfigError {
    /// A setting was out of range.
    InvalidSetting { name: &'static str, reason: String },
}

impl fmt::Display for RelayConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, reason } => {
                write!(f, "invalid setting {name}: {reason}")
            }
        }
    }
}

impl std::error::Error for RelayConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_config_error_display() {
        let err = RelayConfigError::InvalidSetting {
            name: "max_chunk_length",
            reason: "must be at least 1".to_string(),
        };
        assert!(err.to_string().contains("max_chunk_length"));
    }
}
