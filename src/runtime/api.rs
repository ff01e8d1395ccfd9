//! API-facing request/response models and the session-gated entry points.
//!
//! Authorization is decided here, from a capability the caller derived
//! outside the core. Nothing below this layer checks privileges.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    slot_catalog, AdmissionController, BookingRequest, CastingDate, CastingDateId, DateLifecycleManager,
    DateRemoval, ExportRecord, Observer, Reservation, ReservationId, ReservationUpdate,
    ScheduleError, ScheduleStore, Spawn, SubmissionOutcome,
};

/// Caller-held session state: capability and current date selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Whether lifecycle and reservation management are allowed.
    pub privileged: bool,
    /// Casting date the caller is looking at.
    pub selected_date: Option<CastingDateId>,
}

impl Session {
    /// Unprivileged session.
    #[must_use]
    pub const fn visitor() -> Self {
        Self {
            privileged: false,
            selected_date: None,
        }
    }

    /// Privileged session.
    #[must_use]
    pub const fn admin() -> Self {
        Self {
            privileged: true,
            selected_date: None,
        }
    }

    /// Derive the capability from a URL fragment; `#admin` grants privileges.
    #[must_use]
    pub fn from_fragment(fragment: &str) -> Self {
        Self {
            privileged: fragment.trim().trim_start_matches('#') == "admin",
            selected_date: None,
        }
    }

    /// Change the selected date.
    pub fn select(&mut self, casting_date_id: CastingDateId) {
        self.selected_date = Some(casting_date_id);
    }

    fn require_privilege(&self, action: &'static str) -> Result<(), ApiError> {
        if self.privileged {
            Ok(())
        } else {
            tracing::warn!(action, "unprivileged session refused");
            Err(ApiError::Forbidden(action))
        }
    }
}

/// Errors surfaced by the API layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The session lacks the privilege for this action.
    #[error("forbidden: {0} requires a privileged session")]
    Forbidden(&'static str),
    /// The operation reached the store and failed there.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Booking form contents. The date comes from the session's selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSubmission {
    /// Requested slot label.
    pub slot: String,
    /// Candidate name.
    pub name: String,
    /// Candidate email.
    pub email: String,
    /// Candidate phone.
    pub phone: String,
}

/// Outcome category of a booking submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Stored.
    Accepted,
    /// The slot has no seats left.
    SlotFull,
    /// The email or phone is already booked on this date.
    DuplicateIdentity,
    /// The casting date no longer exists.
    NotFound,
    /// Malformed submission.
    Invalid,
    /// The store could not be reached.
    Unavailable,
    /// No answer before the timeout; the booking may or may not exist.
    Unconfirmed,
}

/// Booking answer returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingResponse {
    /// Outcome category.
    pub status: BookingStatus,
    /// Stored record when accepted.
    pub reservation: Option<Reservation>,
    /// Message for the user.
    pub message: String,
}

impl BookingResponse {
    fn from_error(err: &ScheduleError) -> Self {
        let (status, message) = match err {
            ScheduleError::SlotFull { max, .. } => (
                BookingStatus::SlotFull,
                format!("This slot is full ({max} candidates maximum). Please choose another time."),
            ),
            ScheduleError::DuplicateIdentity { field, .. } => (
                BookingStatus::DuplicateIdentity,
                format!("This {field} is already booked for this casting date."),
            ),
            ScheduleError::NotFound(_) => (
                BookingStatus::NotFound,
                "This casting date is no longer available.".to_string(),
            ),
            ScheduleError::InvalidRequest(reason) => (BookingStatus::Invalid, reason.clone()),
            ScheduleError::TransientStoreFailure(_) => (
                BookingStatus::Unavailable,
                "The schedule is temporarily unavailable. Please try again.".to_string(),
            ),
        };
        Self {
            status,
            reservation: None,
            message,
        }
    }
}

/// Submit a booking for the session's selected date through `observer`.
///
/// The observer shows a placeholder until the answer arrives. If `timeout`
/// elapses first the status is `Unconfirmed`.
pub async fn submit_booking<S: Spawn>(
    observer: &Observer,
    controller: &AdmissionController<S>,
    session: &Session,
    submission: BookingSubmission,
    timeout: Duration,
) -> BookingResponse {
    let Some(casting_date_id) = session.selected_date else {
        return BookingResponse::from_error(&ScheduleError::InvalidRequest(
            "Select a casting date first.".into(),
        ));
    };
    let request = BookingRequest::new(
        casting_date_id,
        submission.slot,
        submission.name,
        submission.email,
        submission.phone,
    );
    match observer.submit_booking(controller, request, timeout).await {
        SubmissionOutcome::Accepted(reservation) => BookingResponse {
            status: BookingStatus::Accepted,
            message: format!("Booked {} successfully.", reservation.slot),
            reservation: Some(reservation),
        },
        SubmissionOutcome::Rejected(err) => BookingResponse::from_error(&err),
        SubmissionOutcome::Unconfirmed => BookingResponse {
            status: BookingStatus::Unconfirmed,
            reservation: None,
            message: "Your booking could not be confirmed in time. Check the schedule before trying again."
                .to_string(),
        },
    }
}

/// Edit a reservation. Privileged.
///
/// # Errors
///
/// `Forbidden` for visitors, otherwise the store's error.
pub async fn edit_reservation<S: Spawn>(
    controller: &AdmissionController<S>,
    session: &Session,
    id: ReservationId,
    update: ReservationUpdate,
) -> Result<Reservation, ApiError> {
    session.require_privilege("edit reservation")?;
    Ok(controller.edit(id, update).await?)
}

/// Cancel a reservation. Privileged.
///
/// # Errors
///
/// `Forbidden` for visitors, otherwise the store's error.
pub async fn cancel_reservation<S: Spawn>(
    controller: &AdmissionController<S>,
    session: &Session,
    id: ReservationId,
) -> Result<(), ApiError> {
    session.require_privilege("cancel reservation")?;
    Ok(controller.cancel(id).await?)
}

/// Add a casting date. Privileged. The selection is left unchanged.
///
/// # Errors
///
/// `Forbidden` for visitors, otherwise the store's error.
pub async fn add_date(
    lifecycle: &DateLifecycleManager,
    session: &Session,
    date: NaiveDate,
    title: &str,
) -> Result<CastingDate, ApiError> {
    session.require_privilege("add casting date")?;
    Ok(lifecycle.add_date(date, title).await?)
}

/// Hide a casting date from booking. Privileged.
///
/// # Errors
///
/// `Forbidden` for visitors, otherwise the store's error.
pub async fn deactivate_date(
    lifecycle: &DateLifecycleManager,
    session: &Session,
    id: CastingDateId,
) -> Result<CastingDate, ApiError> {
    session.require_privilege("deactivate casting date")?;
    Ok(lifecycle.deactivate_date(id).await?)
}

/// Remove a casting date with all its reservations, then move the session's
/// selection to the proposed next date. Privileged.
///
/// # Errors
///
/// `Forbidden` for visitors, otherwise the store's error.
pub async fn remove_date(
    lifecycle: &DateLifecycleManager,
    session: &mut Session,
    id: CastingDateId,
) -> Result<DateRemoval, ApiError> {
    session.require_privilege("remove casting date")?;
    let removal = lifecycle.remove_date(id, session.selected_date).await?;
    session.selected_date = removal.next_selection;
    Ok(removal)
}

/// Confirmed reservations of the selected date in export order. Privileged.
///
/// # Errors
///
/// `Forbidden` for visitors, `InvalidRequest` when no date is selected.
pub fn export_selected(observer: &Observer, session: &Session) -> Result<Vec<ExportRecord>, ApiError> {
    session.require_privilege("export reservations")?;
    let casting_date_id = session
        .selected_date
        .ok_or_else(|| ScheduleError::InvalidRequest("no casting date selected".into()))?;
    Ok(observer.with_projection(|p| p.export(casting_date_id)))
}

/// One row of the slot board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    /// Slot label.
    pub slot: String,
    /// Confirmed bookings.
    pub confirmed: usize,
    /// Bookings awaiting the store's answer.
    pub pending: usize,
    /// Seats still open as far as this observer knows.
    pub remaining: usize,
}

/// Availability of every catalog slot on `casting_date_id`, in catalog order.
#[must_use]
pub fn slot_availability(
    observer: &Observer,
    casting_date_id: CastingDateId,
    max_candidates: u32,
) -> Vec<SlotAvailability> {
    let occupancy = observer.with_projection(|p| p.occupancy(casting_date_id));
    slot_catalog()
        .iter()
        .map(|slot| {
            let counts = occupancy.get(slot).copied().unwrap_or_default();
            SlotAvailability {
                slot: slot.clone(),
                confirmed: counts.confirmed,
                pending: counts.pending,
                remaining: counts.remaining(max_candidates),
            }
        })
        .collect()
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Active casting dates.
    pub active_dates: usize,
    /// Stored reservations.
    pub reservations: usize,
}

/// Probe the store with two reads.
pub async fn health(store: &dyn ScheduleStore) -> Health {
    match (
        store.list_casting_dates(true).await,
        store.list_reservations().await,
    ) {
        (Ok(dates), Ok(reservations)) => Health {
            ok: true,
            active_dates: dates.len(),
            reservations: reservations.len(),
        },
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!(error = %err, "health probe failed");
            Health {
                ok: false,
                active_dates: 0,
                reservations: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IdentityField;

    #[test]
    fn test_fragment_grants_privilege() {
        assert!(Session::from_fragment("#admin").privileged);
        assert!(Session::from_fragment("admin").privileged);
        assert!(!Session::from_fragment("#administrator").privileged);
        assert!(!Session::from_fragment("").privileged);
    }

    #[test]
    fn test_error_messages_name_the_rule() {
        let full = BookingResponse::from_error(&ScheduleError::SlotFull {
            casting_date_id: CastingDateId::new(),
            slot: "08:00 - 08:30".into(),
            max: 3,
        });
        assert_eq!(full.status, BookingStatus::SlotFull);
        assert!(full.message.contains("full"));

        let dup = BookingResponse::from_error(&ScheduleError::DuplicateIdentity {
            casting_date_id: CastingDateId::new(),
            field: IdentityField::Phone,
        });
        assert_eq!(dup.status, BookingStatus::DuplicateIdentity);
        assert!(dup.message.contains("phone"));
    }
}
