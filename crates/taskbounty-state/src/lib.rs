#![deny(missing_docs)]

//! # taskbounty-state — Bounty Lifecycle State Machine
//!
//! The authoritative component for every bounty state transition:
//!
//! - **Bounty** (`bounty.rs`): the aggregate root — status machine,
//!   actor guards, transition log, and the two-phase protocol for
//!   transitions that move money (`prepare_*` validates under the
//!   caller's lock, the escrow call happens in between, `commit_*`
//!   mutates only after the money moved).
//!
//! - **Applications** (`application.rs`): the ordered application
//!   ledger — at most one application per (bounty, candidate), exactly
//!   one ever accepted.
//!
//! - **Delivery** (`delivery.rs`): the submitted work product. Zero or
//!   one per bounty.
//!
//! ## Crate Policy
//!
//! - Depends only on `taskbounty-core` internally.
//! - Performs no storage and no balance arithmetic: the repository and
//!   the escrow coordinator are the caller's collaborators. This crate
//!   decides *whether* a transition is legal and *what* settlement it
//!   requires, never *how* funds move.

pub mod application;
pub mod bounty;
pub mod delivery;
pub mod error;

pub use application::{Application, ApplicationStatus};
pub use bounty::{
    AwardPlan, Bounty, BountyStatus, NewBounty, ResolutionOutcome, Settlement, SettlementAction,
    TransitionRecord,
};
pub use delivery::Delivery;
pub use error::BountyError;
