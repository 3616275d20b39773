//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the workflow.
//! Each identifier is a distinct type — you cannot pass a [`BountyId`]
//! where an [`ApplicationId`] is expected.
//!
//! All four identifiers wrap a v4 UUID and are always valid by
//! construction. Generation belongs to the repository layer; handlers
//! never mint identifiers ad hoc.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id! {
    /// A unique identifier for a posted bounty.
    BountyId
}

uuid_id! {
    /// A unique identifier for a candidate's application to a bounty.
    ApplicationId
}

uuid_id! {
    /// A unique identifier for a marketplace participant.
    ///
    /// The API layer receives this already authenticated; the workflow
    /// never verifies identity itself.
    UserId
}

uuid_id! {
    /// A handle to an escrow reservation, stored on the bounty at award
    /// time and presented back to the coordinator at settlement.
    ReservationId
}
