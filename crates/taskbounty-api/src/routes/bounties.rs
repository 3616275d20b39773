//! # Bounty Lifecycle API
//!
//! The workflow facade: every endpoint resolves the caller, loads the
//! bounty, runs the lifecycle guard, performs any escrow movement, and
//! persists the result — as one atomic step per request.
//!
//! ## Endpoints
//!
//! - `POST /v1/bounties` — post a bounty
//! - `GET /v1/bounties` — query bounties (filter/sort/paginate)
//! - `GET /v1/bounties/my/created` — bounties the caller posted
//! - `GET /v1/bounties/my/assigned` — bounties awarded to the caller
//! - `GET /v1/bounties/:id` — full bounty detail
//! - `GET /v1/bounties/:id/transitions` — status audit trail
//! - `POST /v1/bounties/:id/apply` — apply
//! - `GET /v1/bounties/:id/applications` — list applications
//! - `PUT /v1/bounties/:id/accept/:application_id` — award to an applicant (reserves funds)
//! - `POST /v1/bounties/:id/deliver` — submit the work product
//! - `PUT /v1/bounties/:id/complete` — accept delivery (releases funds)
//! - `PUT /v1/bounties/:id/dispute` — contest the delivery
//! - `PUT /v1/bounties/:id/resolve` — arbiter verdict (settles funds)
//! - `PUT /v1/bounties/:id/cancel` — withdraw (refunds if in progress)
//!
//! ## Atomicity
//!
//! Transitions that settle an existing reservation run the guard, the
//! escrow call, and the commit inside the store's `try_update` closure,
//! under that bounty's lock. Award is the exception: the reservation
//! is taken against a snapshot and the commit re-checks the snapshot's
//! version — a concurrent mutation refunds the reservation and returns
//! `409 CONFLICT`, which the client may retry.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use taskbounty_core::{ApplicationId, BountyId, CurrencyCode, Money};
use taskbounty_state::{
    Application, Bounty, NewBounty, ResolutionOutcome, SettlementAction, TransitionRecord,
};

use crate::auth::{require_role, require_user, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{check_length, extract_validated_json, Validate};
use crate::query::{run_query, BountyQuery, QueryPage};
use crate::state::AppState;

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to post a new bounty.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBountyRequest {
    /// Short title, 5–100 characters.
    pub title: String,
    /// Full task description, 20–5000 characters.
    pub description: String,
    /// Free-form category label.
    pub category: String,
    /// Acceptance requirements, 10–3000 characters.
    pub requirements: String,
    /// Expected deliverables, 10–2000 characters.
    pub deliverables: String,
    /// Reward amount, at least 1.
    #[schema(value_type = String)]
    pub reward: Decimal,
    /// ISO-4217-style currency code; defaults to USD.
    pub currency: Option<String>,
    /// Completion deadline, must be in the future.
    pub deadline: DateTime<Utc>,
}

impl Validate for CreateBountyRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("title", &self.title, 5, 100)?;
        check_length("description", &self.description, 20, 5000)?;
        check_length("category", &self.category, 2, 50)?;
        check_length("requirements", &self.requirements, 10, 3000)?;
        check_length("deliverables", &self.deliverables, 10, 2000)?;
        Ok(())
    }
}

/// Request to apply for a bounty.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyRequest {
    /// The candidate's pitch, 20–2000 characters.
    pub proposal: String,
    /// Estimated days to completion, 1–365.
    pub estimated_days: u16,
}

impl Validate for ApplyRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("proposal", &self.proposal, 20, 2000)?;
        if self.estimated_days == 0 || self.estimated_days > 365 {
            return Err(format!(
                "estimated_days must be between 1 and 365, got {}",
                self.estimated_days
            ));
        }
        Ok(())
    }
}

/// Request to submit the work product.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeliverRequest {
    /// Description of what is being handed over, 10–2000 characters.
    pub deliverables: String,
    /// Links to the produced artifacts.
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Optional free-form note, at most 1000 characters.
    pub notes: Option<String>,
}

impl Validate for DeliverRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("deliverables", &self.deliverables, 10, 2000)?;
        if let Some(notes) = &self.notes {
            check_length("notes", notes, 0, 1000)?;
        }
        Ok(())
    }
}

/// Request to contest a delivery.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DisputeRequest {
    /// Why the delivery is unacceptable, 10–2000 characters.
    pub reason: String,
}

impl Validate for DisputeRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("reason", &self.reason, 10, 2000)
    }
}

/// An arbiter's verdict on a disputed bounty.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveRequest {
    /// `release_to_assignee` completes the bounty and pays out;
    /// `refund_to_creator` cancels it and returns the funds.
    #[schema(value_type = String)]
    pub outcome: ResolutionOutcome,
    /// The arbiter's written rationale, 10–2000 characters.
    pub resolution: String,
}

impl Validate for ResolveRequest {
    fn validate(&self) -> Result<(), String> {
        check_length("resolution", &self.resolution, 10, 2000)
    }
}

// ── Response DTOs ───────────────────────────────────────────────────

/// Compact listing row served by the query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BountySummary {
    #[schema(value_type = String, format = Uuid)]
    pub id: BountyId,
    pub title: String,
    pub category: String,
    #[schema(value_type = String)]
    pub reward: Decimal,
    pub currency: String,
    pub status: String,
    /// Number of applications received so far.
    pub applications: usize,
    pub deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Bounty> for BountySummary {
    fn from(bounty: Bounty) -> Self {
        Self {
            id: bounty.id,
            title: bounty.title,
            category: bounty.category,
            reward: bounty.reward.amount,
            currency: bounty.reward.currency.to_string(),
            status: bounty.status.to_string(),
            applications: bounty.applications.len(),
            deadline: bounty.deadline,
            created_at: bounty.created_at,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the bounty router with all lifecycle endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/bounties", get(list_bounties).post(create_bounty))
        .route("/v1/bounties/my/created", get(my_created))
        .route("/v1/bounties/my/assigned", get(my_assigned))
        .route("/v1/bounties/:id", get(get_bounty))
        .route("/v1/bounties/:id/transitions", get(get_transitions))
        .route("/v1/bounties/:id/apply", post(apply))
        .route("/v1/bounties/:id/applications", get(list_applications))
        .route("/v1/bounties/:id/accept/:application_id", put(accept))
        .route("/v1/bounties/:id/deliver", post(deliver))
        .route("/v1/bounties/:id/complete", put(complete))
        .route("/v1/bounties/:id/dispute", put(dispute))
        .route("/v1/bounties/:id/resolve", put(resolve))
        .route("/v1/bounties/:id/cancel", put(cancel))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/bounties — Post a new bounty in OPEN status.
#[utoipa::path(
    post,
    path = "/v1/bounties",
    request_body = CreateBountyRequest,
    responses(
        (status = 201, description = "Bounty created"),
        (status = 400, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn create_bounty(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateBountyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Bounty>), AppError> {
    let creator = require_user(&caller)?;
    let req = extract_validated_json(body)?;

    let currency = match req.currency {
        Some(code) => CurrencyCode::new(code)?,
        None => CurrencyCode::usd(),
    };
    let reward = Money::new(req.reward, currency)?;

    let bounty = Bounty::create(
        NewBounty {
            creator_id: creator,
            title: req.title,
            description: req.description,
            category: req.category,
            requirements: req.requirements,
            deliverables: req.deliverables,
            reward,
            deadline: req.deadline,
        },
        Utc::now(),
    )?;

    tracing::info!(bounty_id = %bounty.id, creator = %creator, "bounty created");
    state.bounties.insert(bounty.id, bounty.clone());
    Ok((StatusCode::CREATED, Json(bounty)))
}

/// GET /v1/bounties — Query bounties with filters, sorting, pagination.
#[utoipa::path(
    get,
    path = "/v1/bounties",
    params(BountyQuery),
    responses(
        (status = 200, description = "One page of matching bounties"),
    ),
    tag = "bounties"
)]
pub(crate) async fn list_bounties(
    State(state): State<AppState>,
    Query(query): Query<BountyQuery>,
) -> Json<QueryPage<BountySummary>> {
    let page = run_query(state.bounties.list(), &query);
    Json(page.map(BountySummary::from))
}

/// GET /v1/bounties/my/created — Bounties posted by the caller.
#[utoipa::path(
    get,
    path = "/v1/bounties/my/created",
    responses(
        (status = 200, description = "Bounties the caller created, newest first"),
    ),
    tag = "bounties"
)]
pub(crate) async fn my_created(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<BountySummary>>, AppError> {
    let me = require_user(&caller)?;
    Ok(Json(owned_by(&state, |b| b.creator_id == me)))
}

/// GET /v1/bounties/my/assigned — Bounties awarded to the caller.
#[utoipa::path(
    get,
    path = "/v1/bounties/my/assigned",
    responses(
        (status = 200, description = "Bounties the caller is assigned to, newest first"),
    ),
    tag = "bounties"
)]
pub(crate) async fn my_assigned(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<BountySummary>>, AppError> {
    let me = require_user(&caller)?;
    Ok(Json(owned_by(&state, |b| b.assignee_id == Some(me))))
}

/// GET /v1/bounties/:id — Full bounty detail, applications included.
#[utoipa::path(
    get,
    path = "/v1/bounties/{id}",
    params(("id" = String, Path, description = "Bounty ID")),
    responses(
        (status = 200, description = "Bounty found"),
        (status = 404, description = "Bounty not found", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn get_bounty(
    State(state): State<AppState>,
    Path(id): Path<BountyId>,
) -> Result<Json<Bounty>, AppError> {
    state.bounties.get(&id).map(Json).ok_or_else(|| not_found(id))
}

/// GET /v1/bounties/:id/transitions — Ordered status audit trail.
#[utoipa::path(
    get,
    path = "/v1/bounties/{id}/transitions",
    params(("id" = String, Path, description = "Bounty ID")),
    responses(
        (status = 200, description = "Transition log"),
        (status = 404, description = "Bounty not found", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn get_transitions(
    State(state): State<AppState>,
    Path(id): Path<BountyId>,
) -> Result<Json<Vec<TransitionRecord>>, AppError> {
    state
        .bounties
        .get(&id)
        .map(|b| Json(b.transition_log))
        .ok_or_else(|| not_found(id))
}

/// POST /v1/bounties/:id/apply — Apply for an open bounty.
#[utoipa::path(
    post,
    path = "/v1/bounties/{id}/apply",
    params(("id" = String, Path, description = "Bounty ID")),
    request_body = ApplyRequest,
    responses(
        (status = 201, description = "Application recorded"),
        (status = 400, description = "Bounty not open, duplicate, or self-application", body = crate::error::ErrorBody),
        (status = 404, description = "Bounty not found", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn apply(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<BountyId>,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let applicant = require_user(&caller)?;
    let req = extract_validated_json(body)?;

    let application = state
        .bounties
        .try_update(&id, |bounty| {
            bounty
                .apply(applicant, req.proposal, req.estimated_days, Utc::now())
                .map(|a| a.clone())
                .map_err(AppError::from)
        })
        .ok_or_else(|| not_found(id))??;

    tracing::info!(bounty_id = %id, applicant = %applicant, "application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /v1/bounties/:id/applications — List applications in submission order.
#[utoipa::path(
    get,
    path = "/v1/bounties/{id}/applications",
    params(("id" = String, Path, description = "Bounty ID")),
    responses(
        (status = 200, description = "Applications in submission order"),
        (status = 404, description = "Bounty not found", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn list_applications(
    State(state): State<AppState>,
    Path(id): Path<BountyId>,
) -> Result<Json<Vec<Application>>, AppError> {
    state
        .bounties
        .get(&id)
        .map(|b| Json(b.applications))
        .ok_or_else(|| not_found(id))
}

/// PUT /v1/bounties/:id/accept/:application_id — Award the bounty to
/// one applicant.
///
/// Reserves the reward against the creator's wallet before committing.
/// The reservation is taken against a snapshot; if the bounty changed
/// in between, the reservation is refunded and the request fails with
/// `409 CONFLICT` (safe to retry).
#[utoipa::path(
    put,
    path = "/v1/bounties/{id}/accept/{application_id}",
    params(
        ("id" = String, Path, description = "Bounty ID"),
        ("application_id" = String, Path, description = "Application to accept"),
    ),
    responses(
        (status = 200, description = "Bounty awarded, reward held in escrow"),
        (status = 402, description = "Creator cannot fund the reward", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the creator", body = crate::error::ErrorBody),
        (status = 409, description = "Lost a concurrent race; retry", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn accept(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, application_id)): Path<(BountyId, ApplicationId)>,
) -> Result<Json<Bounty>, AppError> {
    let creator = require_user(&caller)?;
    let now = Utc::now();

    // Guard against a snapshot, fund, then commit with a version check.
    let snapshot = state.bounties.get(&id).ok_or_else(|| not_found(id))?;
    let plan = snapshot.prepare_award(creator, application_id)?;
    let snapshot_version = snapshot.version;

    let reservation = state.escrow.reserve(&plan.reward, creator)?;

    let committed = state.bounties.try_update(&id, |bounty| {
        if bounty.version != snapshot_version {
            return Err(AppError::Conflict(format!(
                "bounty {id} changed while the award was being funded"
            )));
        }
        bounty.commit_award(creator, application_id, reservation, now)?;
        Ok(bounty.clone())
    });

    match committed {
        Some(Ok(bounty)) => {
            tracing::info!(
                bounty_id = %id,
                assignee = %plan.applicant,
                reservation = %reservation,
                "bounty awarded"
            );
            Ok(Json(bounty))
        }
        Some(Err(err)) => {
            // Compensate: the reservation was taken but the commit lost.
            state.escrow.refund(reservation)?;
            Err(err)
        }
        None => {
            state.escrow.refund(reservation)?;
            Err(not_found(id))
        }
    }
}

/// POST /v1/bounties/:id/deliver — Submit the work product.
#[utoipa::path(
    post,
    path = "/v1/bounties/{id}/deliver",
    params(("id" = String, Path, description = "Bounty ID")),
    request_body = DeliverRequest,
    responses(
        (status = 200, description = "Delivery recorded, awaiting acceptance"),
        (status = 400, description = "Bounty is not in progress", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the assignee", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn deliver(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<BountyId>,
    body: Result<Json<DeliverRequest>, JsonRejection>,
) -> Result<Json<Bounty>, AppError> {
    let assignee = require_user(&caller)?;
    let req = extract_validated_json(body)?;

    let bounty = state
        .bounties
        .try_update(&id, |bounty| {
            bounty.deliver(
                assignee,
                req.deliverables,
                req.attachments,
                req.notes,
                Utc::now(),
            )?;
            Ok::<_, AppError>(bounty.clone())
        })
        .ok_or_else(|| not_found(id))??;

    tracing::info!(bounty_id = %id, assignee = %assignee, "work delivered");
    Ok(Json(bounty))
}

/// PUT /v1/bounties/:id/complete — Accept the delivery and pay out.
///
/// Guard, escrow release, and commit run under the bounty's lock.
#[utoipa::path(
    put,
    path = "/v1/bounties/{id}/complete",
    params(("id" = String, Path, description = "Bounty ID")),
    responses(
        (status = 200, description = "Reward released, bounty completed"),
        (status = 400, description = "Bounty is not delivered", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the creator", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn complete(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<BountyId>,
) -> Result<Json<Bounty>, AppError> {
    let creator = require_user(&caller)?;
    let now = Utc::now();

    let bounty = state
        .bounties
        .try_update(&id, |bounty| {
            let settlement = bounty.prepare_complete(creator)?;
            settle(&state, settlement)?;
            bounty.commit_complete(creator, now);
            Ok::<_, AppError>(bounty.clone())
        })
        .ok_or_else(|| not_found(id))??;

    tracing::info!(bounty_id = %id, "bounty completed, reward released");
    Ok(Json(bounty))
}

/// PUT /v1/bounties/:id/dispute — Contest the delivery.
///
/// No money moves; the reservation stays held for the arbiter.
#[utoipa::path(
    put,
    path = "/v1/bounties/{id}/dispute",
    params(("id" = String, Path, description = "Bounty ID")),
    request_body = DisputeRequest,
    responses(
        (status = 200, description = "Bounty disputed, awaiting an arbiter"),
        (status = 400, description = "Bounty is not delivered", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the creator", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn dispute(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<BountyId>,
    body: Result<Json<DisputeRequest>, JsonRejection>,
) -> Result<Json<Bounty>, AppError> {
    let creator = require_user(&caller)?;
    let req = extract_validated_json(body)?;

    let bounty = state
        .bounties
        .try_update(&id, |bounty| {
            bounty.dispute(creator, req.reason, Utc::now())?;
            Ok::<_, AppError>(bounty.clone())
        })
        .ok_or_else(|| not_found(id))??;

    tracing::info!(bounty_id = %id, "delivery disputed");
    Ok(Json(bounty))
}

/// PUT /v1/bounties/:id/resolve — Arbiter verdict on a dispute.
///
/// Requires the `arbiter` role. Releases or refunds the held reward
/// according to the verdict.
#[utoipa::path(
    put,
    path = "/v1/bounties/{id}/resolve",
    params(("id" = String, Path, description = "Bounty ID")),
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Dispute resolved, funds settled"),
        (status = 400, description = "Bounty is not disputed", body = crate::error::ErrorBody),
        (status = 403, description = "Caller lacks the arbiter role", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn resolve(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<BountyId>,
    body: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<Bounty>, AppError> {
    require_role(&caller, Role::Arbiter)?;
    let arbiter = require_user(&caller)?;
    let req = extract_validated_json(body)?;
    let outcome = req.outcome;
    let now = Utc::now();

    let bounty = state
        .bounties
        .try_update(&id, |bounty| {
            let settlement = bounty.prepare_resolve(outcome)?;
            settle(&state, settlement)?;
            bounty.commit_resolve(arbiter, outcome, req.resolution, now);
            Ok::<_, AppError>(bounty.clone())
        })
        .ok_or_else(|| not_found(id))??;

    tracing::info!(bounty_id = %id, outcome = ?outcome, "dispute resolved");
    Ok(Json(bounty))
}

/// PUT /v1/bounties/:id/cancel — Withdraw the bounty.
///
/// Refunds the held reward if the bounty was already awarded. Rejected
/// once work has been delivered.
#[utoipa::path(
    put,
    path = "/v1/bounties/{id}/cancel",
    params(("id" = String, Path, description = "Bounty ID")),
    responses(
        (status = 200, description = "Bounty cancelled, any held reward refunded"),
        (status = 400, description = "Bounty already delivered or terminal", body = crate::error::ErrorBody),
        (status = 403, description = "Caller is not the creator", body = crate::error::ErrorBody),
    ),
    tag = "bounties"
)]
pub(crate) async fn cancel(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<BountyId>,
) -> Result<Json<Bounty>, AppError> {
    let creator = require_user(&caller)?;
    let now = Utc::now();

    let bounty = state
        .bounties
        .try_update(&id, |bounty| {
            if let Some(settlement) = bounty.prepare_cancel(creator)? {
                settle(&state, settlement)?;
            }
            bounty.commit_cancel(creator, now);
            Ok::<_, AppError>(bounty.clone())
        })
        .ok_or_else(|| not_found(id))??;

    tracing::info!(bounty_id = %id, "bounty cancelled");
    Ok(Json(bounty))
}

// ── Helpers ─────────────────────────────────────────────────────────

fn not_found(id: BountyId) -> AppError {
    AppError::NotFound(format!("bounty {id} not found"))
}

/// Snapshot the store and keep the bounties matching `pred`, newest
/// first.
fn owned_by(state: &AppState, pred: impl Fn(&Bounty) -> bool) -> Vec<BountySummary> {
    let mut mine: Vec<Bounty> = state.bounties.list().into_iter().filter(|b| pred(b)).collect();
    mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    mine.into_iter().map(BountySummary::from).collect()
}

/// Execute a settlement plan against the escrow coordinator.
fn settle(state: &AppState, settlement: taskbounty_state::Settlement) -> Result<(), AppError> {
    match settlement.action {
        SettlementAction::Release { payee } => {
            state.escrow.release(settlement.reservation, payee)?
        }
        SettlementAction::Refund => state.escrow.refund(settlement.reservation)?,
    }
    Ok(())
}
