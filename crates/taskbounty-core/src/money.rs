//! # Money Value Object
//!
//! A decimal amount paired with a currency code. All reward and balance
//! arithmetic in the workspace flows through this type — floats are
//! unrepresentable, and cross-currency arithmetic is rejected at the
//! call site rather than silently mixing units.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// ISO-4217-style currency code: exactly three ASCII uppercase letters.
///
/// Validated at construction. The workflow does not maintain a currency
/// whitelist — any well-formed code is accepted and compared verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a currency code, validating the three-uppercase-letter format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCurrencyCode`] on any other shape.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.len() != 3 || !s.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrencyCode(s));
        }
        Ok(Self(s))
    }

    /// The default marketplace currency.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Access the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A non-negative decimal amount in a specific currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The decimal amount. Never negative.
    pub amount: Decimal,
    /// The currency the amount is denominated in.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a monetary value, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativeAmount`] if `amount < 0`.
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Result<Self, ValidationError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::NegativeAmount(amount));
        }
        Ok(Self { amount, currency })
    }

    /// A zero balance in the given currency.
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Whether the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Ensure `other` is denominated in the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::CurrencyMismatch`] when the codes differ.
    pub fn require_same_currency(&self, other: &Money) -> Result<(), ValidationError> {
        if self.currency != other.currency {
            return Err(ValidationError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: other.currency.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
