//! # Application Ledger Records
//!
//! A candidate's bid on a bounty. Applications live embedded in their
//! parent [`Bounty`](crate::bounty::Bounty) in submission order; the
//! aggregate enforces the at-most-one-per-candidate and single-accept
//! invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskbounty_core::{ApplicationId, UserId};

/// The status of an application.
///
/// Exactly one application per bounty may ever reach `accepted`; the
/// award marks every sibling `rejected` in the same atomic unit, and no
/// application submitted afterwards can exist because the bounty has
/// left `OPEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting the creator's decision.
    Pending,
    /// Chosen by the creator at award time.
    Accepted,
    /// Passed over at award time. Permanent.
    Rejected,
}

impl ApplicationStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate's bid on a bounty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Unique application identifier.
    pub id: ApplicationId,
    /// The candidate who submitted the bid.
    pub applicant_id: UserId,
    /// Free-text proposal.
    pub proposal: String,
    /// Estimated days to complete (1–365, validated by the aggregate).
    pub estimated_days: u16,
    /// Current status.
    pub status: ApplicationStatus,
    /// When the application was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl Application {
    /// Create a pending application. Uniqueness and range checks belong
    /// to the owning bounty, which is the only construction path.
    pub(crate) fn new(
        applicant_id: UserId,
        proposal: String,
        estimated_days: u16,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            applicant_id,
            proposal,
            estimated_days,
            status: ApplicationStatus::Pending,
            submitted_at,
        }
    }
}
