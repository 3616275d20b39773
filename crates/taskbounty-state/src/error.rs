//! # Lifecycle Errors
//!
//! Structured errors for bounty state transitions. Each variant carries
//! the state or actor context at the time of failure so that the API
//! layer can map it to the right HTTP class without string matching.

use chrono::{DateTime, Utc};
use thiserror::Error;

use taskbounty_core::{ApplicationId, UserId};

use crate::application::ApplicationStatus;
use crate::bounty::BountyStatus;

/// Errors that can occur during bounty lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BountyError {
    /// The bounty's current status does not permit the requested action.
    #[error("bounty is {status}: cannot {action}")]
    InvalidTransition {
        /// The bounty's current status.
        status: BountyStatus,
        /// The action that was attempted.
        action: &'static str,
    },

    /// The bounty is in a terminal status; no transition is defined out of it.
    #[error("bounty is {status} (terminal) and cannot transition")]
    Terminal {
        /// The terminal status.
        status: BountyStatus,
    },

    /// The caller is not the bounty's creator.
    #[error("caller {caller} is not the creator: cannot {action}")]
    NotCreator {
        /// The unauthorized caller.
        caller: UserId,
        /// The action that was attempted.
        action: &'static str,
    },

    /// The caller is not the awarded assignee.
    #[error("caller {caller} is not the assignee: cannot {action}")]
    NotAssignee {
        /// The unauthorized caller.
        caller: UserId,
        /// The action that was attempted.
        action: &'static str,
    },

    /// A creator attempted to apply to their own bounty.
    #[error("creator {creator} cannot apply to their own bounty")]
    SelfApplication {
        /// The creator / would-be applicant.
        creator: UserId,
    },

    /// The candidate already has an application on this bounty.
    #[error("candidate {applicant} has already applied to this bounty")]
    DuplicateApplication {
        /// The repeat applicant.
        applicant: UserId,
    },

    /// Estimated days fall outside the 1–365 range.
    #[error("estimated_days must be between 1 and 365, got {days}")]
    EstimateOutOfRange {
        /// The rejected estimate.
        days: u16,
    },

    /// No application with the given identifier exists on this bounty.
    #[error("application {id} not found on this bounty")]
    ApplicationNotFound {
        /// The missing application identifier.
        id: ApplicationId,
    },

    /// The chosen application is no longer pending.
    #[error("application {id} is {status}, not pending")]
    ApplicationNotPending {
        /// The application identifier.
        id: ApplicationId,
        /// Its current status.
        status: ApplicationStatus,
    },

    /// The deadline is not in the future at creation time.
    #[error("deadline {deadline} is not in the future")]
    DeadlineNotFuture {
        /// The rejected deadline.
        deadline: DateTime<Utc>,
    },

    /// The reward is below the marketplace minimum of 1.
    #[error("reward {amount} is below the minimum of 1")]
    RewardBelowMinimum {
        /// The rejected reward amount, rendered as a decimal string.
        amount: String,
    },
}
