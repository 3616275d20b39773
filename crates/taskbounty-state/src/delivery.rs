//! # Delivery Record
//!
//! The submitted work product awaiting creator acceptance. A bounty has
//! zero or one current delivery; resubmission after a dispute is not
//! part of the baseline workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskbounty_core::UserId;
use uuid::Uuid;

/// The work product submitted by the assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Unique delivery identifier.
    pub id: Uuid,
    /// The assignee who submitted the work.
    pub submitted_by: UserId,
    /// Description of the delivered work.
    pub deliverables: String,
    /// Attachment references (URLs or content digests).
    pub attachments: Vec<String>,
    /// Optional free-text notes for the creator.
    pub notes: Option<String>,
    /// When the work was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl Delivery {
    /// Create a delivery record. Status gating belongs to the owning
    /// bounty, which is the only construction path.
    pub(crate) fn new(
        submitted_by: UserId,
        deliverables: String,
        attachments: Vec<String>,
        notes: Option<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_by,
            deliverables,
            attachments,
            notes,
            submitted_at,
        }
    }
}
