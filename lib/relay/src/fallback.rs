//! User-facing replies for failed completions.
//!
//! The underlying error is only ever logged. Users see one of three fixed
//! messages chosen by the failure kind.

use chatrelay_ai::FailureKind;

/// Shown when the completion engine is throttling requests.
pub const RATE_LIMITED_REPLY: &str =
    "I'm receiving too many requests right now. Please wait a moment and try again.";

/// Shown when the completion engine rejected our credentials.
pub const AUTH_FAILED_REPLY: &str =
    "I can't reach my language service because of a configuration problem. Please let the bot administrator know.";

/// Shown for every other failure.
pub const GENERIC_REPLY: &str =
    "Sorry, something went wrong while preparing a reply. Please try again later.";

/// Returns the fallback reply for a failure kind.
#[must_use]
pub fn fallback_reply(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::RateLimited => RATE_LIMITED_REPLY,
        FailureKind::AuthFailed => AUTH_FAILED_REPLY,
        FailureKind::Other => GENERIC_REPLY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_a_distinct_reply() {
        let replies = [
            fallback_reply(FailureKind::RateLimited),
            fallback_reply(FailureKind::AuthFailed),
            fallback_reply(FailureKind::Other),
        ];
        assert_ne!(replies[0], replies[1]);
        assert_ne!(replies[1], replies[2]);
        assert_ne!(replies[0], replies[2]);
    }
}
