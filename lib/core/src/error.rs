//! Error handling foundation for chatrelay.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain-specific error types in their own
//! error modules, and wraps them in a `Report` as they cross crate
//! boundaries.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<usize> = Ok(30);
        assert_eq!(ok.expect("should be ok"), 30);
    }
}
