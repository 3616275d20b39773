//! # Wallet API
//!
//! Read access to wallet balances plus an admin-only deposit endpoint
//! that stands in for the out-of-scope payment gateway.
//!
//! ## Endpoints
//!
//! - `GET /v1/wallets/:user_id` — balance snapshot
//! - `POST /v1/wallets/:user_id/deposits` — credit funds (admin only)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use taskbounty_core::{CurrencyCode, Money, UserId};
use taskbounty_escrow::WalletBalance;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request DTOs ────────────────────────────────────────────────────

/// Currency selector for balance reads; defaults to USD.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    pub currency: Option<String>,
}

/// Request to credit a user's available balance.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DepositRequest {
    /// Amount to credit; must be positive.
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// ISO-4217-style currency code; defaults to USD.
    pub currency: Option<String>,
}

impl Validate for DepositRequest {
    fn validate(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err(format!("amount must be positive, got {}", self.amount));
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the wallets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/wallets/:user_id", get(get_balance))
        .route("/v1/wallets/:user_id/deposits", post(deposit))
}

// ── Handlers ────────────────────────────────────────────────────────

fn resolve_currency(code: Option<String>) -> Result<CurrencyCode, AppError> {
    match code {
        Some(code) => Ok(CurrencyCode::new(code)?),
        None => Ok(CurrencyCode::usd()),
    }
}

/// GET /v1/wallets/:user_id — Balance snapshot for one currency.
///
/// A user with no wallet history reads as an empty wallet, not a 404.
#[utoipa::path(
    get,
    path = "/v1/wallets/{user_id}",
    params(
        ("user_id" = String, Path, description = "Wallet owner"),
        ("currency" = Option<String>, Query, description = "Currency code, defaults to USD"),
    ),
    responses(
        (status = 200, description = "Balance snapshot"),
    ),
    tag = "wallets"
)]
pub(crate) async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<WalletBalance>, AppError> {
    let currency = resolve_currency(query.currency)?;
    Ok(Json(state.escrow.balance(user_id, &currency)))
}

/// POST /v1/wallets/:user_id/deposits — Credit available funds.
///
/// Admin only; the simulated stand-in for an inbound transfer.
#[utoipa::path(
    post,
    path = "/v1/wallets/{user_id}/deposits",
    params(("user_id" = String, Path, description = "Wallet owner")),
    request_body = DepositRequest,
    responses(
        (status = 201, description = "Funds credited, updated snapshot returned"),
        (status = 403, description = "Caller lacks the admin role", body = crate::error::ErrorBody),
    ),
    tag = "wallets"
)]
pub(crate) async fn deposit(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(user_id): Path<UserId>,
    body: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WalletBalance>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;

    let currency = resolve_currency(req.currency)?;
    let funds = Money::new(req.amount, currency)?;

    let snapshot = state.escrow.deposit(user_id, &funds);
    tracing::info!(user = %user_id, amount = %funds, "wallet credited");
    Ok((StatusCode::CREATED, Json(snapshot)))
}
