//! # Route Modules
//!
//! Each module builds its own `Router<AppState>` and the app assembles
//! them in `lib.rs`.

pub mod bounties;
pub mod wallets;
