#![deny(missing_docs)]

//! # taskbounty-core — Foundational Types for the TaskBounty Workflow
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `thiserror`,
//! `uuid`, and `rust_decimal` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`UserId`] where a [`BountyId`] is
//!    expected, and an escrow [`ReservationId`] can never be confused with
//!    either.
//!
//! 2. **[`Money`] never touches floats.** Reward amounts and wallet
//!    balances are `rust_decimal::Decimal` with an attached currency code;
//!    arithmetic across currencies is rejected at construction sites.
//!
//! 3. **[`ValidationError`] hierarchy.** Structured errors with
//!    `thiserror` — no `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod money;

// Re-export primary types at crate root for ergonomic imports.
pub use error::ValidationError;
pub use identity::{ApplicationId, BountyId, ReservationId, UserId};
pub use money::{CurrencyCode, Money};
