//! # Wallet Accounts
//!
//! Per-user, per-currency two-bucket accounts. `available` is the
//! spendable balance; `held` is the portion locked by open escrow
//! reservations. Moving between the buckets is the coordinator's job —
//! this module only models the account and its snapshot form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use taskbounty_core::{CurrencyCode, UserId};

/// A wallet account, keyed by (user, currency).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Account {
    pub(crate) available: Decimal,
    pub(crate) held: Decimal,
}

impl Account {
    pub(crate) fn empty() -> Self {
        Self {
            available: Decimal::ZERO,
            held: Decimal::ZERO,
        }
    }
}

/// Point-in-time snapshot of a wallet, as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// The wallet owner.
    pub user_id: UserId,
    /// The currency of both buckets.
    pub currency: CurrencyCode,
    /// Spendable balance.
    pub available: Decimal,
    /// Balance locked by open escrow reservations.
    pub held: Decimal,
}

impl WalletBalance {
    /// Total funds attributed to the user in this currency.
    pub fn total(&self) -> Decimal {
        self.available + self.held
    }
}
