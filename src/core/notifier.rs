//! Outbound confirmation collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::NotificationError;
use super::model::{CastingDate, Reservation};

/// Payload handed to the notifier after a booking is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    /// Candidate name.
    pub name: String,
    /// Candidate email, the delivery address.
    pub email: String,
    /// Candidate phone.
    pub phone: String,
    /// Booked slot label.
    pub slot: String,
    /// Calendar label of the casting date (`YYYY-MM-DD`).
    pub casting_date: String,
    /// Display title of the casting date.
    pub casting_title: String,
}

impl BookingConfirmation {
    /// Assemble the payload from an accepted reservation and its date.
    #[must_use]
    pub fn new(reservation: &Reservation, casting_date: &CastingDate) -> Self {
        Self {
            name: reservation.name.clone(),
            email: reservation.email.clone(),
            phone: reservation.phone.clone(),
            slot: reservation.slot.clone(),
            casting_date: casting_date.label(),
            casting_title: casting_date.title.clone(),
        }
    }
}

/// Delivers booking confirmations (email or otherwise).
///
/// Called fire-and-forget after acceptance. Implementations may fail; the
/// failure is logged by the caller and never touches reservation state.
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use casting_scheduler::core::{BookingConfirmation, BookingNotifier, NotificationError};
///
/// struct MailerNotifier { client: MailClient }
///
/// #[async_trait]
/// impl BookingNotifier for MailerNotifier {
///     async fn notify(&self, confirmation: BookingConfirmation) -> Result<(), NotificationError> {
///         self.client
///             .send(&confirmation.email, &confirmation.casting_title)
///             .await
///             .map_err(|e| NotificationError::DeliveryFailed(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    /// Deliver one confirmation.
    async fn notify(&self, confirmation: BookingConfirmation) -> Result<(), NotificationError>;
}
