//! # Escrow Errors
//!
//! Structured errors for wallet and reservation operations.

use thiserror::Error;

use taskbounty_core::{ReservationId, UserId};

use crate::coordinator::ReservationStatus;

/// Errors that can occur during escrow operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// The payer's available balance cannot cover the reservation.
    #[error("insufficient funds: payer {payer} has {available} {currency} available, needs {needed}")]
    InsufficientFunds {
        /// The payer whose wallet was checked.
        payer: UserId,
        /// The amount the reservation required.
        needed: String,
        /// The payer's available balance at the time of the check.
        available: String,
        /// The currency both amounts are denominated in.
        currency: String,
    },

    /// No reservation with the given identifier exists.
    #[error("reservation {id} not found")]
    ReservationNotFound {
        /// The missing reservation identifier.
        id: ReservationId,
    },

    /// The reservation was already settled the other way.
    ///
    /// Re-running the *same* settlement is an idempotent no-op; this
    /// error fires only when a release follows a refund or vice versa.
    #[error("reservation {id} is already {status}: cannot {attempted}")]
    AlreadySettled {
        /// The reservation identifier.
        id: ReservationId,
        /// The settlement already applied.
        status: ReservationStatus,
        /// The conflicting settlement that was attempted.
        attempted: &'static str,
    },
}
