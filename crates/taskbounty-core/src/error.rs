//! # Validation Errors
//!
//! Structured validation errors for the domain primitives in this crate,
//! built with `thiserror`. Each variant carries the rejected input so that
//! operators can diagnose bad requests without guesswork.

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors for domain primitive construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Currency code is not three ASCII uppercase letters.
    #[error("invalid currency code: \"{0}\" (expected 3 uppercase ASCII letters, e.g. USD)")]
    InvalidCurrencyCode(String),

    /// Monetary amount is negative.
    #[error("negative amount: {0}")]
    NegativeAmount(Decimal),

    /// Arithmetic attempted across two different currencies.
    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch {
        /// The currency of the left-hand operand.
        expected: String,
        /// The currency of the right-hand operand.
        actual: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn invalid_currency_code_display() {
        let err = ValidationError::InvalidCurrencyCode("usd".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("usd"));
        assert!(msg.contains("3 uppercase"));
    }

    #[test]
    fn negative_amount_display() {
        let err = ValidationError::NegativeAmount(dec!(-5));
        assert!(format!("{err}").contains("-5"));
    }

    #[test]
    fn currency_mismatch_display() {
        let err = ValidationError::CurrencyMismatch {
            expected: "USD".to_string(),
            actual: "EUR".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("USD"));
        assert!(msg.contains("EUR"));
    }
}
