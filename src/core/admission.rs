//! Admission controller: routes booking, edit and cancellation intents to
//! the store's atomic operations.
//!
//! The controller deliberately performs no capacity or identity checks of its
//! own. Those live only inside the store's critical section, so any number of
//! controllers (one per connected client) can run concurrently without racing
//! past a stale check.

use std::sync::Arc;

use super::error::ScheduleError;
use super::model::{BookingRequest, Reservation, ReservationId, ReservationUpdate};
use super::notifier::{BookingConfirmation, BookingNotifier};
use super::schedule_store::ScheduleStore;
use super::spawn::Spawn;

/// Turns client intents into store mutations and dispatches confirmations.
pub struct AdmissionController<S> {
    store: Arc<dyn ScheduleStore>,
    notifier: Arc<dyn BookingNotifier>,
    spawner: S,
}

impl<S> Clone for AdmissionController<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            spawner: self.spawner.clone(),
        }
    }
}

impl<S> AdmissionController<S>
where
    S: Spawn,
{
    /// Create a controller over a shared store.
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        notifier: Arc<dyn BookingNotifier>,
        spawner: S,
    ) -> Self {
        Self {
            store,
            notifier,
            spawner,
        }
    }

    /// The store this controller writes to.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ScheduleStore> {
        &self.store
    }

    /// Submit a booking.
    ///
    /// On acceptance the confirmation is spawned in the background and this
    /// call returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns the store's rejection unchanged: `SlotFull` and
    /// `DuplicateIdentity` remain distinct so the caller can say which rule
    /// failed. `TransientStoreFailure` must not be read as acceptance.
    pub async fn book(&self, request: BookingRequest) -> Result<Reservation, ScheduleError> {
        let casting_date_id = request.casting_date_id;
        let slot = request.slot.clone();
        match self.store.create_reservation(request).await {
            Ok(reservation) => {
                tracing::info!(
                    reservation_id = %reservation.id,
                    casting_date_id = %casting_date_id,
                    slot = %reservation.slot,
                    "booking accepted"
                );
                self.dispatch_confirmation(&reservation);
                Ok(reservation)
            }
            Err(err) => {
                if err.is_rejection() {
                    tracing::warn!(casting_date_id = %casting_date_id, slot = %slot, error = %err, "booking rejected");
                } else {
                    tracing::error!(casting_date_id = %casting_date_id, slot = %slot, error = %err, "booking failed");
                }
                Err(err)
            }
        }
    }

    /// Apply an authorized edit to an existing reservation.
    ///
    /// # Errors
    ///
    /// `NotFound`, `SlotFull`, `DuplicateIdentity`, `InvalidRequest` or
    /// `TransientStoreFailure` as reported by the store.
    pub async fn edit(
        &self,
        id: ReservationId,
        update: ReservationUpdate,
    ) -> Result<Reservation, ScheduleError> {
        let result = self.store.update_reservation(id, update).await;
        match &result {
            Ok(reservation) => {
                tracing::info!(reservation_id = %id, slot = %reservation.slot, "reservation updated");
            }
            Err(err) => tracing::warn!(reservation_id = %id, error = %err, "reservation update rejected"),
        }
        result
    }

    /// Cancel a reservation.
    ///
    /// # Errors
    ///
    /// `NotFound` when the reservation no longer exists.
    pub async fn cancel(&self, id: ReservationId) -> Result<(), ScheduleError> {
        let result = self.store.delete_reservation(id).await;
        match &result {
            Ok(()) => tracing::info!(reservation_id = %id, "reservation cancelled"),
            Err(err) => tracing::warn!(reservation_id = %id, error = %err, "cancellation rejected"),
        }
        result
    }

    fn dispatch_confirmation(&self, reservation: &Reservation) {
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        let reservation = reservation.clone();
        self.spawner.spawn(async move {
            let casting_date = match store.get_casting_date(reservation.casting_date_id).await {
                Ok(date) => date,
                Err(err) => {
                    tracing::warn!(
                        reservation_id = %reservation.id,
                        error = %err,
                        "confirmation skipped: casting date unavailable"
                    );
                    return;
                }
            };
            let confirmation = BookingConfirmation::new(&reservation, &casting_date);
            if let Err(err) = notifier.notify(confirmation).await {
                tracing::warn!(
                    reservation_id = %reservation.id,
                    error = %err,
                    "confirmation delivery failed (non-critical)"
                );
            } else {
                tracing::debug!(reservation_id = %reservation.id, "confirmation delivered");
            }
        });
    }
}
