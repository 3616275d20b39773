#![deny(missing_docs)]

//! # taskbounty-escrow — Escrow Coordinator & Wallet Ledger
//!
//! The simulated funds-transfer collaborator behind the bounty workflow.
//! Money movement is isolated behind exactly three verbs — `reserve`,
//! `release`, `refund` — so the lifecycle state machine never touches a
//! balance, and a real payment gateway can replace the in-process
//! implementation without touching the state machine.
//!
//! - **Wallets** (`wallet.rs`): per-user, per-currency two-bucket
//!   accounts (`available` / `held`).
//!
//! - **Coordinator** (`coordinator.rs`): reservation lifecycle
//!   (`HELD → RELEASED | REFUNDED`) with status-based idempotence —
//!   settling the same reservation twice changes balances exactly once.
//!
//! ## Crate Policy
//!
//! - Depends only on `taskbounty-core` internally.
//! - All operations are synchronous under a single `parking_lot` mutex;
//!   callers must not hold the lock across `.await` points (they cannot:
//!   nothing here is async).

pub mod coordinator;
pub mod error;
pub mod wallet;

pub use coordinator::{EscrowCoordinator, Reservation, ReservationStatus};
pub use error::EscrowError;
pub use wallet::WalletBalance;
