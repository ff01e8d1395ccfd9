//! Error types for schedule operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::CastingDateId;

/// Which identity field collided with an existing reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityField {
    /// Same email (case-insensitive).
    Email,
    /// Same phone number (whitespace-insensitive).
    Phone,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Phone => f.write_str("phone"),
        }
    }
}

/// Errors produced by the schedule store and the components above it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The slot already holds the maximum number of candidates.
    #[error("slot full: {slot} on casting date {casting_date_id} already holds {max} candidates")]
    SlotFull {
        /// Casting date the slot belongs to.
        casting_date_id: CastingDateId,
        /// Slot label.
        slot: String,
        /// Configured capacity.
        max: u32,
    },
    /// Another reservation on the same date already uses this email or phone.
    #[error("duplicate identity: {field} already booked on casting date {casting_date_id}")]
    DuplicateIdentity {
        /// Casting date on which the identity is taken.
        casting_date_id: CastingDateId,
        /// Colliding field.
        field: IdentityField,
    },
    /// The targeted entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The request is malformed (unknown slot, blank field, inactive date).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Storage or network unavailability; safe to retry.
    #[error("transient store failure: {0}")]
    TransientStoreFailure(String),
}

impl ScheduleError {
    /// Whether a caller may retry the operation with backoff.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStoreFailure(_))
    }

    /// Whether the error is a business-rule rejection attributable to the user.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::SlotFull { .. }
                | Self::DuplicateIdentity { .. }
                | Self::NotFound(_)
                | Self::InvalidRequest(_)
        )
    }
}

/// Failure of the outbound confirmation collaborator. Never affects booking state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// The notification could not be delivered.
    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
