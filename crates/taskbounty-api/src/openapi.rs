//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TaskBounty API — Bounty Lifecycle & Escrow",
        version = "0.3.2",
        description = "Bounty marketplace workflow: lifecycle state machine, application ledger, simulated escrow, and the bounty query engine.",
        license(name = "BUSL-1.1")
    ),
    paths(
        // Bounties
        crate::routes::bounties::create_bounty,
        crate::routes::bounties::list_bounties,
        crate::routes::bounties::my_created,
        crate::routes::bounties::my_assigned,
        crate::routes::bounties::get_bounty,
        crate::routes::bounties::get_transitions,
        crate::routes::bounties::apply,
        crate::routes::bounties::list_applications,
        crate::routes::bounties::accept,
        crate::routes::bounties::deliver,
        crate::routes::bounties::complete,
        crate::routes::bounties::dispute,
        crate::routes::bounties::resolve,
        crate::routes::bounties::cancel,
        // Wallets
        crate::routes::wallets::get_balance,
        crate::routes::wallets::deposit,
    ),
    components(schemas(
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Bounty DTOs
        crate::routes::bounties::CreateBountyRequest,
        crate::routes::bounties::ApplyRequest,
        crate::routes::bounties::DeliverRequest,
        crate::routes::bounties::DisputeRequest,
        crate::routes::bounties::ResolveRequest,
        crate::routes::bounties::BountySummary,
        // Wallet DTOs
        crate::routes::wallets::DepositRequest,
    )),
    tags(
        (name = "bounties", description = "Bounty lifecycle and query API"),
        (name = "wallets", description = "Wallet balances and deposits"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
