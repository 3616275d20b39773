//! # Escrow Coordinator
//!
//! Reserves the reward at award time and settles it — release to the
//! assignee or refund to the creator — at terminal transitions.
//!
//! ## Reservation lifecycle
//!
//! ```text
//! reserve ──▶ HELD ──release──▶ RELEASED
//!               │
//!               └──refund───▶ REFUNDED
//! ```
//!
//! `RELEASED` and `REFUNDED` are terminal. Re-running the settlement
//! that already happened is a no-op detected via the reservation status,
//! never by re-debiting; crossing settlements (`release` after `refund`)
//! are rejected with [`EscrowError::AlreadySettled`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use taskbounty_core::{CurrencyCode, Money, ReservationId, UserId};

use crate::error::EscrowError;
use crate::wallet::{Account, WalletBalance};

/// The settlement state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Funds debited from the payer and held.
    Held,
    /// Funds moved to the payee's available balance (terminal).
    Released,
    /// Funds returned to the payer's available balance (terminal).
    Refunded,
}

impl ReservationStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Held => "HELD",
            Self::Released => "RELEASED",
            Self::Refunded => "REFUNDED",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An escrow reservation: a held amount with its payer and settlement state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier, stored on the bounty.
    pub id: ReservationId,
    /// The payer whose available balance was debited.
    pub payer: UserId,
    /// The reserved amount.
    pub amount: Money,
    /// Current settlement state.
    pub status: ReservationStatus,
    /// The payee, recorded once released.
    pub payee: Option<UserId>,
}

#[derive(Debug, Default)]
struct LedgerInner {
    accounts: HashMap<(UserId, CurrencyCode), Account>,
    reservations: HashMap<ReservationId, Reservation>,
}

impl LedgerInner {
    fn account_mut(&mut self, user: UserId, currency: &CurrencyCode) -> &mut Account {
        self.accounts
            .entry((user, currency.clone()))
            .or_insert_with(Account::empty)
    }
}

/// Thread-safe, cloneable escrow coordinator over an in-process wallet
/// ledger.
///
/// All operations are synchronous (the mutex is `parking_lot`, not
/// `tokio::sync`) because the ledger is never held across `.await`
/// points. A real payment gateway would replace this type behind the
/// same three verbs.
#[derive(Debug, Clone, Default)]
pub struct EscrowCoordinator {
    inner: Arc<Mutex<LedgerInner>>,
}

impl EscrowCoordinator {
    /// Create a coordinator with an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Wallet operations ────────────────────────────────────────────

    /// Credit a user's available balance. Seed/test helper standing in
    /// for the out-of-scope payment gateway's inbound transfer.
    pub fn deposit(&self, user: UserId, funds: &Money) -> WalletBalance {
        let mut inner = self.inner.lock();
        let account = inner.account_mut(user, &funds.currency);
        account.available += funds.amount;
        let snapshot = WalletBalance {
            user_id: user,
            currency: funds.currency.clone(),
            available: account.available,
            held: account.held,
        };
        tracing::debug!(user = %user, amount = %funds, "wallet deposit");
        snapshot
    }

    /// Point-in-time snapshot of a user's wallet in the given currency.
    /// Users without a wallet read as empty.
    pub fn balance(&self, user: UserId, currency: &CurrencyCode) -> WalletBalance {
        let inner = self.inner.lock();
        let account = inner
            .accounts
            .get(&(user, currency.clone()))
            .cloned()
            .unwrap_or_else(Account::empty);
        WalletBalance {
            user_id: user,
            currency: currency.clone(),
            available: account.available,
            held: account.held,
        }
    }

    /// Look up a reservation by identifier.
    pub fn reservation(&self, id: ReservationId) -> Option<Reservation> {
        self.inner.lock().reservations.get(&id).cloned()
    }

    // ── The three verbs ──────────────────────────────────────────────

    /// Reserve `reward` against the payer's available balance.
    ///
    /// Debits available into held and returns the reservation handle the
    /// bounty stores until settlement.
    ///
    /// # Errors
    ///
    /// [`EscrowError::InsufficientFunds`] if the payer's available
    /// balance is below the reward. The ledger is unchanged on error.
    pub fn reserve(&self, reward: &Money, payer: UserId) -> Result<ReservationId, EscrowError> {
        let mut inner = self.inner.lock();
        let account = inner.account_mut(payer, &reward.currency);
        if account.available < reward.amount {
            return Err(EscrowError::InsufficientFunds {
                payer,
                needed: reward.amount.to_string(),
                available: account.available.to_string(),
                currency: reward.currency.to_string(),
            });
        }
        account.available -= reward.amount;
        account.held += reward.amount;

        let id = ReservationId::new();
        inner.reservations.insert(
            id,
            Reservation {
                id,
                payer,
                amount: reward.clone(),
                status: ReservationStatus::Held,
                payee: None,
            },
        );
        tracing::info!(reservation = %id, payer = %payer, amount = %reward, "escrow reserved");
        Ok(id)
    }

    /// Move the held amount to the payee's available balance.
    ///
    /// Idempotent: releasing an already-released reservation is a no-op.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::ReservationNotFound`] for an unknown handle.
    /// - [`EscrowError::AlreadySettled`] if the reservation was refunded.
    pub fn release(&self, id: ReservationId, payee: UserId) -> Result<(), EscrowError> {
        let mut inner = self.inner.lock();
        let reservation = inner
            .reservations
            .get(&id)
            .cloned()
            .ok_or(EscrowError::ReservationNotFound { id })?;

        match reservation.status {
            ReservationStatus::Released => {
                tracing::debug!(reservation = %id, "release replayed; no-op");
                Ok(())
            }
            ReservationStatus::Refunded => Err(EscrowError::AlreadySettled {
                id,
                status: reservation.status,
                attempted: "release",
            }),
            ReservationStatus::Held => {
                let payer_account =
                    inner.account_mut(reservation.payer, &reservation.amount.currency);
                payer_account.held -= reservation.amount.amount;
                let payee_account = inner.account_mut(payee, &reservation.amount.currency);
                payee_account.available += reservation.amount.amount;

                let entry = inner
                    .reservations
                    .get_mut(&id)
                    .expect("present: looked up above under the same lock");
                entry.status = ReservationStatus::Released;
                entry.payee = Some(payee);
                tracing::info!(reservation = %id, payee = %payee, "escrow released");
                Ok(())
            }
        }
    }

    /// Return the held amount to the original payer.
    ///
    /// Idempotent: refunding an already-refunded reservation is a no-op.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::ReservationNotFound`] for an unknown handle.
    /// - [`EscrowError::AlreadySettled`] if the reservation was released.
    pub fn refund(&self, id: ReservationId) -> Result<(), EscrowError> {
        let mut inner = self.inner.lock();
        let reservation = inner
            .reservations
            .get(&id)
            .cloned()
            .ok_or(EscrowError::ReservationNotFound { id })?;

        match reservation.status {
            ReservationStatus::Refunded => {
                tracing::debug!(reservation = %id, "refund replayed; no-op");
                Ok(())
            }
            ReservationStatus::Released => Err(EscrowError::AlreadySettled {
                id,
                status: reservation.status,
                attempted: "refund",
            }),
            ReservationStatus::Held => {
                let account = inner.account_mut(reservation.payer, &reservation.amount.currency);
                account.held -= reservation.amount.amount;
                account.available += reservation.amount.amount;

                let entry = inner
                    .reservations
                    .get_mut(&id)
                    .expect("present: looked up above under the same lock");
                entry.status = ReservationStatus::Refunded;
                tracing::info!(reservation = %id, payer = %reservation.payer, "escrow refunded");
                Ok(())
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, CurrencyCode::usd()).unwrap()
    }

    fn funded_coordinator(payer: UserId, amount: rust_decimal::Decimal) -> EscrowCoordinator {
        let escrow = EscrowCoordinator::new();
        escrow.deposit(payer, &usd(amount));
        escrow
    }

    #[test]
    fn deposit_credits_available() {
        let user = UserId::new();
        let escrow = EscrowCoordinator::new();
        let snapshot = escrow.deposit(user, &usd(dec!(250)));
        assert_eq!(snapshot.available, dec!(250));
        assert_eq!(snapshot.held, dec!(0));
    }

    #[test]
    fn balance_of_unknown_user_is_empty() {
        let escrow = EscrowCoordinator::new();
        let snapshot = escrow.balance(UserId::new(), &CurrencyCode::usd());
        assert_eq!(snapshot.available, dec!(0));
        assert_eq!(snapshot.held, dec!(0));
    }

    #[test]
    fn reserve_moves_available_to_held() {
        let payer = UserId::new();
        let escrow = funded_coordinator(payer, dec!(150));

        let id = escrow.reserve(&usd(dec!(100)), payer).unwrap();

        let wallet = escrow.balance(payer, &CurrencyCode::usd());
        assert_eq!(wallet.available, dec!(50));
        assert_eq!(wallet.held, dec!(100));

        let reservation = escrow.reservation(id).unwrap();
        assert_eq!(reservation.status, ReservationStatus::Held);
        assert_eq!(reservation.payer, payer);
    }

    #[test]
    fn reserve_fails_on_insufficient_funds_without_side_effects() {
        let payer = UserId::new();
        let escrow = funded_coordinator(payer, dec!(50));

        let err = escrow.reserve(&usd(dec!(100)), payer).unwrap_err();
        assert!(matches!(err, EscrowError::InsufficientFunds { .. }));

        let wallet = escrow.balance(payer, &CurrencyCode::usd());
        assert_eq!(wallet.available, dec!(50));
        assert_eq!(wallet.held, dec!(0));
    }

    #[test]
    fn reserve_fails_for_unfunded_user() {
        let escrow = EscrowCoordinator::new();
        let err = escrow.reserve(&usd(dec!(1)), UserId::new()).unwrap_err();
        assert!(matches!(err, EscrowError::InsufficientFunds { .. }));
    }

    #[test]
    fn release_pays_the_payee_exactly_once() {
        let payer = UserId::new();
        let payee = UserId::new();
        let escrow = funded_coordinator(payer, dec!(100));
        let id = escrow.reserve(&usd(dec!(100)), payer).unwrap();

        escrow.release(id, payee).unwrap();
        // Second release is a status-detected no-op.
        escrow.release(id, payee).unwrap();

        let payer_wallet = escrow.balance(payer, &CurrencyCode::usd());
        assert_eq!(payer_wallet.available, dec!(0));
        assert_eq!(payer_wallet.held, dec!(0));

        let payee_wallet = escrow.balance(payee, &CurrencyCode::usd());
        assert_eq!(payee_wallet.available, dec!(100));

        let reservation = escrow.reservation(id).unwrap();
        assert_eq!(reservation.status, ReservationStatus::Released);
        assert_eq!(reservation.payee, Some(payee));
    }

    #[test]
    fn refund_returns_to_payer_exactly_once() {
        let payer = UserId::new();
        let escrow = funded_coordinator(payer, dec!(100));
        let id = escrow.reserve(&usd(dec!(100)), payer).unwrap();

        escrow.refund(id).unwrap();
        escrow.refund(id).unwrap();

        let wallet = escrow.balance(payer, &CurrencyCode::usd());
        assert_eq!(wallet.available, dec!(100));
        assert_eq!(wallet.held, dec!(0));
        assert_eq!(
            escrow.reservation(id).unwrap().status,
            ReservationStatus::Refunded
        );
    }

    #[test]
    fn crossed_settlements_are_rejected() {
        let payer = UserId::new();
        let payee = UserId::new();
        let escrow = funded_coordinator(payer, dec!(200));

        let released = escrow.reserve(&usd(dec!(100)), payer).unwrap();
        escrow.release(released, payee).unwrap();
        let err = escrow.refund(released).unwrap_err();
        assert!(matches!(err, EscrowError::AlreadySettled { .. }));

        let refunded = escrow.reserve(&usd(dec!(100)), payer).unwrap();
        escrow.refund(refunded).unwrap();
        let err = escrow.release(refunded, payee).unwrap_err();
        assert!(matches!(err, EscrowError::AlreadySettled { .. }));
    }

    #[test]
    fn unknown_reservation_is_not_found() {
        let escrow = EscrowCoordinator::new();
        assert!(matches!(
            escrow.release(ReservationId::new(), UserId::new()),
            Err(EscrowError::ReservationNotFound { .. })
        ));
        assert!(matches!(
            escrow.refund(ReservationId::new()),
            Err(EscrowError::ReservationNotFound { .. })
        ));
    }

    #[test]
    fn conservation_across_reserve_release() {
        // Total funds across all wallets are invariant under every verb.
        let payer = UserId::new();
        let payee = UserId::new();
        let escrow = funded_coordinator(payer, dec!(300));

        let total = |escrow: &EscrowCoordinator| {
            let p = escrow.balance(payer, &CurrencyCode::usd());
            let q = escrow.balance(payee, &CurrencyCode::usd());
            p.total() + q.total()
        };

        assert_eq!(total(&escrow), dec!(300));
        let id = escrow.reserve(&usd(dec!(120)), payer).unwrap();
        assert_eq!(total(&escrow), dec!(300));
        escrow.release(id, payee).unwrap();
        assert_eq!(total(&escrow), dec!(300));
    }

    #[test]
    fn currencies_are_ledgered_independently() {
        let user = UserId::new();
        let escrow = EscrowCoordinator::new();
        escrow.deposit(user, &usd(dec!(10)));
        let eur = Money::new(dec!(20), CurrencyCode::new("EUR").unwrap()).unwrap();
        escrow.deposit(user, &eur);

        assert_eq!(escrow.balance(user, &CurrencyCode::usd()).available, dec!(10));
        assert_eq!(
            escrow
                .balance(user, &CurrencyCode::new("EUR").unwrap())
                .available,
            dec!(20)
        );
    }

    #[test]
    fn clone_shares_the_ledger() {
        let user = UserId::new();
        let escrow = EscrowCoordinator::new();
        let clone = escrow.clone();
        clone.deposit(user, &usd(dec!(5)));
        assert_eq!(escrow.balance(user, &CurrencyCode::usd()).available, dec!(5));
    }
}
