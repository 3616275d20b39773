//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from taskbounty-state and taskbounty-escrow to
//! HTTP status codes and JSON error bodies with a machine-readable code.
//! Never exposes internal error details in responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use taskbounty_escrow::EscrowError;
use taskbounty_state::BountyError;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "INVALID_STATE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// Every error is terminal for the triggering request — nothing is
/// retried internally. `Conflict` is the one variant a client may
/// safely retry: the losing side of a serialization race, harmless to
/// replay because escrow settlement is idempotent.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bounty or application not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Actor is not authorized for the requested transition (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The bounty's current status does not permit the transition (400).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The request is well-formed but semantically invalid (400).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The payer's wallet cannot cover the reward (402).
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Lost a concurrency race; safe to retry (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure — missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error (500). Message is logged but not returned
    /// to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::InvalidState(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
            Self::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            Self::InsufficientFunds(_) => (StatusCode::PAYMENT_REQUIRED, "INSUFFICIENT_FUNDS"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Map lifecycle errors to the HTTP taxonomy.
impl From<BountyError> for AppError {
    fn from(err: BountyError) -> Self {
        match &err {
            BountyError::ApplicationNotFound { .. } => Self::NotFound(err.to_string()),
            BountyError::NotCreator { .. } | BountyError::NotAssignee { .. } => {
                Self::Forbidden(err.to_string())
            }
            BountyError::InvalidTransition { .. }
            | BountyError::Terminal { .. }
            | BountyError::ApplicationNotPending { .. } => Self::InvalidState(err.to_string()),
            BountyError::SelfApplication { .. }
            | BountyError::DuplicateApplication { .. }
            | BountyError::EstimateOutOfRange { .. }
            | BountyError::DeadlineNotFuture { .. }
            | BountyError::RewardBelowMinimum { .. } => Self::InvalidArgument(err.to_string()),
        }
    }
}

/// Map escrow errors to the HTTP taxonomy.
///
/// A missing reservation can only mean the bounty/ledger invariant was
/// broken — that is an internal fault, not a client error.
impl From<EscrowError> for AppError {
    fn from(err: EscrowError) -> Self {
        match &err {
            EscrowError::InsufficientFunds { .. } => Self::InsufficientFunds(err.to_string()),
            EscrowError::AlreadySettled { .. } => Self::Conflict(err.to_string()),
            EscrowError::ReservationNotFound { .. } => Self::Internal(err.to_string()),
        }
    }
}

/// Map domain-primitive validation errors to the HTTP taxonomy.
impl From<taskbounty_core::ValidationError> for AppError {
    fn from(err: taskbounty_core::ValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
