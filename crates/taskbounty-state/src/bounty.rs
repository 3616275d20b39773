//! # Bounty Lifecycle State Machine
//!
//! Models the lifecycle of a posted bounty from creation to payout or
//! cancellation.
//!
//! ## States
//!
//! ```text
//! OPEN ──award──▶ IN_PROGRESS ──deliver──▶ DELIVERED ──complete──▶ COMPLETED
//!   │                  │                       │
//!   │cancel            │cancel (refund)        │dispute
//!   ▼                  ▼                       ▼
//! CANCELLED        CANCELLED                DISPUTED ──resolve──▶ COMPLETED | CANCELLED
//! ```
//!
//! `COMPLETED` and `CANCELLED` are terminal; no transition is defined
//! out of them.
//!
//! ## Design Decision
//!
//! Transitions that move money are split into a `prepare_*` guard and a
//! `commit_*` mutation. The caller evaluates the guard, performs the
//! escrow call, and commits only on success — all under the repository's
//! per-bounty write lock, so a failed escrow call leaves the bounty and
//! its applications byte-for-byte unchanged. `prepare_*` methods take
//! `&self` and cannot mutate by construction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use taskbounty_core::{ApplicationId, BountyId, Money, ReservationId, UserId};

use crate::application::{Application, ApplicationStatus};
use crate::delivery::Delivery;
use crate::error::BountyError;

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of a bounty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BountyStatus {
    /// Accepting applications.
    Open,
    /// Awarded to one candidate; reward held in escrow.
    InProgress,
    /// Work submitted, awaiting the creator's acceptance.
    Delivered,
    /// Delivery contested by the creator, awaiting an arbiter.
    Disputed,
    /// Reward released to the assignee (terminal).
    Completed,
    /// Withdrawn by the creator or resolved against the assignee;
    /// any held reward refunded (terminal).
    Cancelled,
}

impl BountyStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Delivered => "DELIVERED",
            Self::Disputed => "DISPUTED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for BountyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Transition Log ──────────────────────────────────────────────────

/// Record of a single status transition, kept on the bounty as an
/// ordered audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Status before the transition.
    pub from_status: BountyStatus,
    /// Status after the transition.
    pub to_status: BountyStatus,
    /// The actor who triggered the transition.
    pub actor: UserId,
    /// When the transition occurred.
    pub at: DateTime<Utc>,
}

// ─── Settlement Plans ────────────────────────────────────────────────

/// What the escrow coordinator must do for a money-moving transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementAction {
    /// Move the held reward to the payee's available balance.
    Release {
        /// The assignee being paid.
        payee: UserId,
    },
    /// Return the held reward to the original payer.
    Refund,
}

/// A validated plan for settling an existing escrow reservation.
///
/// Produced by `prepare_complete` / `prepare_cancel` / `prepare_resolve`
/// once every guard has passed; consumed by the caller's escrow call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// The reservation taken at award time.
    pub reservation: ReservationId,
    /// Release to the assignee or refund to the creator.
    pub action: SettlementAction,
}

/// A validated plan for awarding the bounty.
///
/// Produced by [`Bounty::prepare_award`]; the caller reserves
/// `reward` against the creator's wallet, then commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardPlan {
    /// The candidate being awarded.
    pub applicant: UserId,
    /// The reward to reserve.
    pub reward: Money,
}

/// An arbiter's verdict on a disputed bounty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Release the reward to the assignee; the bounty completes.
    ReleaseToAssignee,
    /// Refund the reward to the creator; the bounty is cancelled.
    RefundToCreator,
}

// ─── Creation Parameters ─────────────────────────────────────────────

/// Parameters for creating a bounty. Field-length validation happens at
/// the API boundary; the aggregate enforces the temporal and financial
/// invariants that outlive any single request.
#[derive(Debug, Clone)]
pub struct NewBounty {
    /// The poster.
    pub creator_id: UserId,
    /// Short title.
    pub title: String,
    /// Full description of the task.
    pub description: String,
    /// Free-form category label.
    pub category: String,
    /// What the executor must satisfy.
    pub requirements: String,
    /// What the executor must hand over.
    pub deliverables: String,
    /// The reward, positive and at least 1.
    pub reward: Money,
    /// Completion deadline; must be in the future at creation.
    pub deadline: DateTime<Utc>,
}

// ─── Bounty ──────────────────────────────────────────────────────────

/// A posted, paid task awaiting a single executor.
///
/// The aggregate root: owns its applications and delivery, validates
/// every transition, and records each status change in the transition
/// log. Reward amount and currency are immutable after creation, as are
/// `creator_id` and (once set) `assignee_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    /// Unique bounty identifier.
    pub id: BountyId,
    /// The poster. Immutable.
    pub creator_id: UserId,
    /// The awarded candidate. Set exactly once, on award.
    pub assignee_id: Option<UserId>,
    /// Short title.
    pub title: String,
    /// Full description of the task.
    pub description: String,
    /// Free-form category label.
    pub category: String,
    /// What the executor must satisfy.
    pub requirements: String,
    /// What the executor must hand over.
    pub deliverables: String,
    /// The reward. Amount and currency immutable after creation.
    pub reward: Money,
    /// Escrow reservation handle, present from award until settlement.
    pub escrow_reservation: Option<ReservationId>,
    /// Current lifecycle status.
    pub status: BountyStatus,
    /// Applications in submission order.
    pub applications: Vec<Application>,
    /// The current delivery, if work has been submitted.
    pub delivery: Option<Delivery>,
    /// Creator's reason for contesting the delivery, if disputed.
    pub dispute_reason: Option<String>,
    /// Arbiter's resolution note, if the dispute was resolved.
    pub dispute_resolution: Option<String>,
    /// Completion deadline.
    pub deadline: DateTime<Utc>,
    /// When the bounty was created.
    pub created_at: DateTime<Utc>,
    /// Touched on every mutation.
    pub updated_at: DateTime<Utc>,
    /// Monotonic mutation counter for optimistic concurrency checks.
    pub version: u64,
    /// Ordered log of all status transitions.
    pub transition_log: Vec<TransitionRecord>,
}

impl Bounty {
    /// Create a new bounty in `OPEN` status.
    ///
    /// # Errors
    ///
    /// - [`BountyError::DeadlineNotFuture`] if `deadline <= now`.
    /// - [`BountyError::RewardBelowMinimum`] if the reward is below 1.
    pub fn create(params: NewBounty, now: DateTime<Utc>) -> Result<Self, BountyError> {
        if params.deadline <= now {
            return Err(BountyError::DeadlineNotFuture {
                deadline: params.deadline,
            });
        }
        if params.reward.amount < Decimal::ONE {
            return Err(BountyError::RewardBelowMinimum {
                amount: params.reward.amount.to_string(),
            });
        }

        Ok(Self {
            id: BountyId::new(),
            creator_id: params.creator_id,
            assignee_id: None,
            title: params.title,
            description: params.description,
            category: params.category,
            requirements: params.requirements,
            deliverables: params.deliverables,
            reward: params.reward,
            escrow_reservation: None,
            status: BountyStatus::Open,
            applications: Vec::new(),
            delivery: None,
            dispute_reason: None,
            dispute_resolution: None,
            deadline: params.deadline,
            created_at: now,
            updated_at: now,
            version: 0,
            transition_log: Vec::new(),
        })
    }

    // ── Application ledger ───────────────────────────────────────────

    /// Submit an application while the bounty is `OPEN`.
    ///
    /// The bounty stays `OPEN`; applications accumulate in submission
    /// order.
    ///
    /// # Errors
    ///
    /// - [`BountyError::InvalidTransition`] if the bounty is not `OPEN`.
    /// - [`BountyError::SelfApplication`] if the candidate is the creator.
    /// - [`BountyError::DuplicateApplication`] if the candidate already
    ///   applied, regardless of that application's status.
    /// - [`BountyError::EstimateOutOfRange`] unless 1 ≤ days ≤ 365.
    pub fn apply(
        &mut self,
        applicant: UserId,
        proposal: String,
        estimated_days: u16,
        now: DateTime<Utc>,
    ) -> Result<&Application, BountyError> {
        self.require_status(BountyStatus::Open, "apply")?;
        if applicant == self.creator_id {
            return Err(BountyError::SelfApplication { creator: applicant });
        }
        if self.applications.iter().any(|a| a.applicant_id == applicant) {
            return Err(BountyError::DuplicateApplication { applicant });
        }
        if estimated_days == 0 || estimated_days > 365 {
            return Err(BountyError::EstimateOutOfRange {
                days: estimated_days,
            });
        }

        self.applications
            .push(Application::new(applicant, proposal, estimated_days, now));
        self.touch(now);
        Ok(self.applications.last().expect("just pushed"))
    }

    /// Find an application by identifier.
    pub fn application(&self, id: ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == id)
    }

    // ── Award (OPEN → IN_PROGRESS) ───────────────────────────────────

    /// Validate an award without mutating.
    ///
    /// Returns the plan the caller must fund via the escrow coordinator
    /// before calling [`Bounty::commit_award`].
    ///
    /// # Errors
    ///
    /// - [`BountyError::NotCreator`] if the caller is not the poster.
    /// - [`BountyError::InvalidTransition`] if the bounty is not `OPEN`.
    /// - [`BountyError::ApplicationNotFound`] /
    ///   [`BountyError::ApplicationNotPending`] for a bad choice.
    pub fn prepare_award(
        &self,
        caller: UserId,
        application_id: ApplicationId,
    ) -> Result<AwardPlan, BountyError> {
        self.require_creator(caller, "award")?;
        self.require_status(BountyStatus::Open, "award")?;

        let application = self
            .application(application_id)
            .ok_or(BountyError::ApplicationNotFound { id: application_id })?;
        if application.status != ApplicationStatus::Pending {
            return Err(BountyError::ApplicationNotPending {
                id: application_id,
                status: application.status,
            });
        }

        Ok(AwardPlan {
            applicant: application.applicant_id,
            reward: self.reward.clone(),
        })
    }

    /// Apply a validated award: set the assignee, store the escrow
    /// reservation, accept the chosen application and reject every
    /// sibling, and move to `IN_PROGRESS`.
    ///
    /// Must be called with the same `application_id` that
    /// [`Bounty::prepare_award`] validated, after the reservation
    /// succeeded. Re-runs the guards so a stale commit cannot corrupt
    /// the ledger.
    pub fn commit_award(
        &mut self,
        caller: UserId,
        application_id: ApplicationId,
        reservation: ReservationId,
        now: DateTime<Utc>,
    ) -> Result<(), BountyError> {
        let plan = self.prepare_award(caller, application_id)?;

        for application in &mut self.applications {
            application.status = if application.id == application_id {
                ApplicationStatus::Accepted
            } else {
                ApplicationStatus::Rejected
            };
        }
        self.assignee_id = Some(plan.applicant);
        self.escrow_reservation = Some(reservation);
        self.transition(BountyStatus::InProgress, caller, now);
        Ok(())
    }

    // ── Deliver (IN_PROGRESS → DELIVERED) ────────────────────────────

    /// Submit the work product. Only the awarded assignee may deliver,
    /// and only while the bounty is `IN_PROGRESS`.
    pub fn deliver(
        &mut self,
        caller: UserId,
        deliverables: String,
        attachments: Vec<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), BountyError> {
        self.require_status(BountyStatus::InProgress, "deliver")?;
        self.require_assignee(caller, "deliver")?;

        self.delivery = Some(Delivery::new(caller, deliverables, attachments, notes, now));
        self.transition(BountyStatus::Delivered, caller, now);
        Ok(())
    }

    // ── Complete (DELIVERED → COMPLETED) ─────────────────────────────

    /// Validate acceptance of the delivery without mutating.
    ///
    /// Returns the release settlement the caller must execute before
    /// calling [`Bounty::commit_complete`].
    pub fn prepare_complete(&self, caller: UserId) -> Result<Settlement, BountyError> {
        self.require_creator(caller, "complete")?;
        self.require_status(BountyStatus::Delivered, "complete")?;
        Ok(self.release_settlement())
    }

    /// Apply a validated completion: the reward has been released to the
    /// assignee; the bounty reaches its terminal `COMPLETED` status.
    pub fn commit_complete(&mut self, caller: UserId, now: DateTime<Utc>) {
        self.transition(BountyStatus::Completed, caller, now);
    }

    // ── Dispute (DELIVERED → DISPUTED) ───────────────────────────────

    /// Contest the delivery. Only the creator, only from `DELIVERED`.
    /// No money moves; the reservation stays held for the arbiter.
    pub fn dispute(
        &mut self,
        caller: UserId,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<(), BountyError> {
        self.require_creator(caller, "dispute")?;
        self.require_status(BountyStatus::Delivered, "dispute")?;

        self.dispute_reason = Some(reason);
        self.transition(BountyStatus::Disputed, caller, now);
        Ok(())
    }

    // ── Resolve (DISPUTED → COMPLETED | CANCELLED) ───────────────────

    /// Validate an arbiter's verdict without mutating.
    ///
    /// Role authorization is the API layer's concern (the aggregate has
    /// no notion of arbiters); this guard only checks the status.
    pub fn prepare_resolve(&self, outcome: ResolutionOutcome) -> Result<Settlement, BountyError> {
        self.require_status(BountyStatus::Disputed, "resolve")?;
        Ok(match outcome {
            ResolutionOutcome::ReleaseToAssignee => self.release_settlement(),
            ResolutionOutcome::RefundToCreator => self.refund_settlement(),
        })
    }

    /// Apply a validated resolution after the settlement executed.
    pub fn commit_resolve(
        &mut self,
        arbiter: UserId,
        outcome: ResolutionOutcome,
        resolution: String,
        now: DateTime<Utc>,
    ) {
        self.dispute_resolution = Some(resolution);
        let to = match outcome {
            ResolutionOutcome::ReleaseToAssignee => BountyStatus::Completed,
            ResolutionOutcome::RefundToCreator => BountyStatus::Cancelled,
        };
        self.transition(to, arbiter, now);
    }

    // ── Cancel (OPEN | IN_PROGRESS → CANCELLED) ──────────────────────

    /// Validate a cancellation without mutating.
    ///
    /// Returns `None` when the bounty is still `OPEN` (no funds were
    /// ever reserved) or `Some(refund)` when it is `IN_PROGRESS`.
    /// Cancelling from `DELIVERED` or `DISPUTED` is rejected — once work
    /// is submitted, the creator must accept, dispute, or await the
    /// arbiter.
    pub fn prepare_cancel(&self, caller: UserId) -> Result<Option<Settlement>, BountyError> {
        self.require_creator(caller, "cancel")?;
        match self.status {
            BountyStatus::Open => Ok(None),
            BountyStatus::InProgress => Ok(Some(self.refund_settlement())),
            status if status.is_terminal() => Err(BountyError::Terminal { status }),
            status => Err(BountyError::InvalidTransition {
                status,
                action: "cancel",
            }),
        }
    }

    /// Apply a validated cancellation after any refund executed.
    pub fn commit_cancel(&mut self, caller: UserId, now: DateTime<Utc>) {
        self.transition(BountyStatus::Cancelled, caller, now);
    }

    // ── Guards & internals ───────────────────────────────────────────

    fn require_status(
        &self,
        expected: BountyStatus,
        action: &'static str,
    ) -> Result<(), BountyError> {
        if self.status.is_terminal() {
            return Err(BountyError::Terminal {
                status: self.status,
            });
        }
        if self.status != expected {
            return Err(BountyError::InvalidTransition {
                status: self.status,
                action,
            });
        }
        Ok(())
    }

    fn require_creator(&self, caller: UserId, action: &'static str) -> Result<(), BountyError> {
        if caller != self.creator_id {
            return Err(BountyError::NotCreator { caller, action });
        }
        Ok(())
    }

    fn require_assignee(&self, caller: UserId, action: &'static str) -> Result<(), BountyError> {
        match self.assignee_id {
            Some(assignee) if assignee == caller => Ok(()),
            _ => Err(BountyError::NotAssignee { caller, action }),
        }
    }

    /// The reservation taken at award time.
    ///
    /// Internal settlements are only constructed from states reachable
    /// after award, where the reservation is present by invariant.
    fn reservation(&self) -> ReservationId {
        self.escrow_reservation
            .expect("reservation present after award by invariant")
    }

    fn release_settlement(&self) -> Settlement {
        Settlement {
            reservation: self.reservation(),
            action: SettlementAction::Release {
                payee: self
                    .assignee_id
                    .expect("assignee present after award by invariant"),
            },
        }
    }

    fn refund_settlement(&self) -> Settlement {
        Settlement {
            reservation: self.reservation(),
            action: SettlementAction::Refund,
        }
    }

    /// Record a status transition and bump the mutation counter.
    fn transition(&mut self, to: BountyStatus, actor: UserId, now: DateTime<Utc>) {
        self.transition_log.push(TransitionRecord {
            from_status: self.status,
            to_status: to,
            actor,
            at: now,
        });
        self.status = to;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
