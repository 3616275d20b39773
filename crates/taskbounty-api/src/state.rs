//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! `AppState` holds the bounty repository (a thread-safe in-memory
//! [`Store`]) and the escrow coordinator. The store locks per key: a
//! `try_update` runs guard evaluation, the escrow call, and the
//! mutation for a transition under that bounty's own mutex, which is
//! the per-bounty mutual exclusion the workflow requires. Two
//! concurrent transitions on the same bounty serialize, and the loser
//! fails its guard against fresh state instead of clobbering a stale
//! read; transitions on different bounties never contend. Catalog,
//! review, and messaging data is NOT stored here — those collaborators
//! are out of scope.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use taskbounty_core::BountyId;
use taskbounty_escrow::EscrowCoordinator;
use taskbounty_state::Bounty;

// ── Generic In-Memory Store ─────────────────────────────────────────

/// Thread-safe, cloneable in-memory key-value store with per-key
/// locking.
///
/// The outer `RwLock` guards only the key index; every record sits
/// behind its own `Mutex`. A long-running `try_update` on one key (a
/// transition that includes an escrow call) therefore blocks neither
/// reads nor updates on other keys. All locks are `parking_lot`, not
/// `tokio::sync`, because none is ever held across an `.await` point,
/// and `parking_lot` locks are non-poisonable — a panicking writer does
/// not permanently corrupt the store.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, Arc<Mutex<T>>>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K: Eq + Hash + Copy, T: Clone> Store<K, T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.data
            .write()
            .insert(id, Arc::new(Mutex::new(value)))
            .map(|prev| prev.lock().clone())
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &K) -> Option<T> {
        let entry = self.data.read().get(id).cloned()?;
        let value = entry.lock().clone();
        Some(value)
    }

    /// List a snapshot of all records.
    pub fn list(&self) -> Vec<T> {
        let entries: Vec<Arc<Mutex<T>>> = self.data.read().values().cloned().collect();
        entries.iter().map(|entry| entry.lock().clone()).collect()
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current
    /// state, validate preconditions, perform the transition's side
    /// effects, mutate the record, and return `Ok(R)` or `Err(E)`. The
    /// entire operation runs under that record's mutex, eliminating
    /// TOCTOU races between read and update without blocking other
    /// keys; the index lock is released before the closure runs.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)`
    /// with the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        let entry = self.data.read().get(id).cloned()?;
        let mut guard = entry.lock();
        Some(f(&mut guard))
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Copy, T: Clone> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Application State ───────────────────────────────────────────────

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential
/// leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token secret. If `None`, authentication is
    /// disabled (development mode).
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in the store and the coordinator.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The bounty repository.
    pub bounties: Store<BountyId, Bounty>,
    /// The funds-transfer collaborator.
    pub escrow: EscrowCoordinator,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application state with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            bounties: Store::new(),
            escrow: EscrowCoordinator::new(),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
