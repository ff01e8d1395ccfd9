//! Casting dates, reservations and the requests that create them.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

entity_id!(
    /// Store-assigned identifier of a casting date.
    CastingDateId
);

entity_id!(
    /// Store-assigned identifier of a reservation. Never supplied by clients.
    ReservationId
);

/// One scheduled event day partitioning slots and reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastingDate {
    /// Unique identifier.
    pub id: CastingDateId,
    /// Calendar date of the event.
    pub date: NaiveDate,
    /// Display title, e.g. "Dimanche 5 Octobre 2025".
    pub title: String,
    /// Only active dates are selectable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl CastingDate {
    /// ISO calendar label (`YYYY-MM-DD`).
    #[must_use]
    pub fn label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// An accepted booking of one candidate into one slot of one casting date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Store-assigned identifier.
    pub id: ReservationId,
    /// Slot label from the slot catalog.
    pub slot: String,
    /// Candidate name.
    pub name: String,
    /// Candidate email.
    pub email: String,
    /// Candidate phone.
    pub phone: String,
    /// Owning casting date.
    pub casting_date_id: CastingDateId,
    /// Acceptance timestamp.
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Whether this reservation uses the same email or phone as `email`/`phone`.
    #[must_use]
    pub fn shares_identity(&self, email: &str, phone: &str) -> bool {
        self.shared_identity_field(email, phone).is_some()
    }

    /// The first identity field this reservation shares with `email`/`phone`.
    #[must_use]
    pub fn shared_identity_field(
        &self,
        email: &str,
        phone: &str,
    ) -> Option<crate::core::IdentityField> {
        if normalize_email(&self.email) == normalize_email(email) {
            Some(crate::core::IdentityField::Email)
        } else if normalize_phone(&self.phone) == normalize_phone(phone) {
            Some(crate::core::IdentityField::Phone)
        } else {
            None
        }
    }
}

/// A client's intent to book a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Casting date to book on.
    pub casting_date_id: CastingDateId,
    /// Requested slot label.
    pub slot: String,
    /// Candidate name.
    pub name: String,
    /// Candidate email.
    pub email: String,
    /// Candidate phone.
    pub phone: String,
}

impl BookingRequest {
    /// Build a request, trimming surrounding whitespace from every field.
    #[must_use]
    pub fn new(
        casting_date_id: CastingDateId,
        slot: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            casting_date_id,
            slot: slot.into().trim().to_string(),
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            phone: phone.into().trim().to_string(),
        }
    }
}

/// New values for an authorized edit of an existing reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationUpdate {
    /// New slot label.
    pub slot: String,
    /// New candidate name.
    pub name: String,
    /// New candidate email.
    pub email: String,
    /// New candidate phone.
    pub phone: String,
}

impl ReservationUpdate {
    /// Build an update, trimming surrounding whitespace from every field.
    #[must_use]
    pub fn new(
        slot: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            slot: slot.into().trim().to_string(),
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            phone: phone.into().trim().to_string(),
        }
    }

    /// An update that keeps every field of `reservation` as is.
    #[must_use]
    pub fn unchanged(reservation: &Reservation) -> Self {
        Self {
            slot: reservation.slot.clone(),
            name: reservation.name.clone(),
            email: reservation.email.clone(),
            phone: reservation.phone.clone(),
        }
    }
}

/// Emails compare case-insensitively, ignoring surrounding whitespace.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Phones compare with all whitespace removed.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IdentityField;

    fn reservation(email: &str, phone: &str) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            slot: "10:00 - 10:30".into(),
            name: "Alice".into(),
            email: email.into(),
            phone: phone.into(),
            casting_date_id: CastingDateId::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_identity_comparison_is_normalized() {
        let r = reservation("Alice@Example.com", "06 12 34 56 78");
        assert_eq!(
            r.shared_identity_field(" alice@example.COM ", "000"),
            Some(IdentityField::Email)
        );
        assert_eq!(
            r.shared_identity_field("bob@example.com", "0612345678"),
            Some(IdentityField::Phone)
        );
        assert!(!r.shares_identity("bob@example.com", "0700000000"));
    }

    #[test]
    fn test_casting_date_label() {
        let date = CastingDate {
            id: CastingDateId::new(),
            date: NaiveDate::from_ymd_opt(2025, 10, 5).unwrap_or_default(),
            title: "Dimanche 5 Octobre 2025".into(),
            is_active: true,
            created_at: Utc::now(),
        };
        assert_eq!(date.label(), "2025-10-05");
    }

    #[test]
    fn test_booking_request_trims_fields() {
        let req = BookingRequest::new(CastingDateId::new(), " 08:00 - 08:30 ", " Alice ", "a@x.com ", " 111");
        assert_eq!(req.slot, "08:00 - 08:30");
        assert_eq!(req.name, "Alice");
        assert_eq!(req.email, "a@x.com");
        assert_eq!(req.phone, "111");
    }
}
