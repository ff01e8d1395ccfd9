//! Store abstraction owning every schedule invariant, plus the journal seam
//! used to persist accepted mutations.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::change_feed::ChangeSubscription;
use super::error::ScheduleError;
use super::model::{
    BookingRequest, CastingDate, CastingDateId, Reservation, ReservationId, ReservationUpdate,
};

/// Authoritative schedule store.
///
/// Every mutating operation is atomic with respect to the capacity and
/// identity invariants: validation and write happen as one indivisible unit,
/// so concurrent callers can never jointly exceed a slot's capacity or reuse
/// an identity on the same date. Each accepted mutation is published on the
/// change feed returned by [`ScheduleStore::subscribe`].
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Accept a booking or reject it with `SlotFull`, `DuplicateIdentity`,
    /// `NotFound` (unknown date) or `InvalidRequest`.
    async fn create_reservation(&self, request: BookingRequest)
        -> Result<Reservation, ScheduleError>;

    /// Rewrite a reservation, re-validating capacity and identity against all
    /// other reservations on its date.
    async fn update_reservation(
        &self,
        id: ReservationId,
        update: ReservationUpdate,
    ) -> Result<Reservation, ScheduleError>;

    /// Remove a reservation.
    async fn delete_reservation(&self, id: ReservationId) -> Result<(), ScheduleError>;

    /// Create an active casting date.
    async fn create_casting_date(
        &self,
        date: NaiveDate,
        title: String,
    ) -> Result<CastingDate, ScheduleError>;

    /// Toggle whether a casting date is selectable.
    async fn set_casting_date_active(
        &self,
        id: CastingDateId,
        active: bool,
    ) -> Result<CastingDate, ScheduleError>;

    /// Delete a casting date and, atomically, all of its reservations.
    /// Returns the number of reservations removed.
    async fn delete_casting_date(&self, id: CastingDateId) -> Result<usize, ScheduleError>;

    /// Fetch one casting date.
    async fn get_casting_date(&self, id: CastingDateId) -> Result<CastingDate, ScheduleError>;

    /// Casting dates ordered by calendar date ascending.
    async fn list_casting_dates(&self, active_only: bool)
        -> Result<Vec<CastingDate>, ScheduleError>;

    /// Every reservation, in no particular order.
    async fn list_reservations(&self) -> Result<Vec<Reservation>, ScheduleError>;

    /// Every reservation, tagged with the sequence of the last change it reflects.
    async fn reservation_snapshot(&self) -> Result<Snapshot<Reservation>, ScheduleError>;

    /// Active casting dates, tagged with the sequence of the last change they reflect.
    async fn casting_date_snapshot(&self) -> Result<Snapshot<CastingDate>, ScheduleError>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> ChangeSubscription;

    /// Capacity of every slot.
    fn max_candidates(&self) -> u32;
}

/// A collection read together with the store's change sequence at the time
/// of the read.
///
/// `seq` equals the `seq` of the last [`ChangeEvent`](super::change_feed::ChangeEvent)
/// published before the read, or 0 if none was. Two snapshots of the same
/// collection are ordered by `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    /// Change sequence watermark.
    pub seq: u64,
    /// The records.
    pub items: Vec<T>,
}

/// Durable record of one accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalEntry {
    /// A booking was accepted.
    ReservationCreated {
        /// The stored reservation.
        reservation: Reservation,
    },
    /// A reservation was edited.
    ReservationUpdated {
        /// The reservation after the edit.
        reservation: Reservation,
    },
    /// A reservation was removed.
    ReservationDeleted {
        /// Removed reservation.
        id: ReservationId,
    },
    /// A casting date was created.
    CastingDateCreated {
        /// The stored casting date.
        casting_date: CastingDate,
    },
    /// A casting date changed (activation flag).
    CastingDateUpdated {
        /// The casting date after the change.
        casting_date: CastingDate,
    },
    /// A casting date and all of its reservations were removed.
    CastingDateDeleted {
        /// Removed casting date.
        id: CastingDateId,
    },
}

/// Append-only persistence for journal entries.
///
/// The store appends before applying a mutation; a failed append leaves the
/// in-memory state untouched and surfaces as `TransientStoreFailure`.
pub trait Journal: Send {
    /// Durably record an entry.
    ///
    /// # Errors
    ///
    /// Returns `TransientStoreFailure` when the backend cannot be written.
    fn append(&mut self, entry: &JournalEntry) -> Result<(), ScheduleError>;

    /// Every entry recorded so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `TransientStoreFailure` when the backend cannot be read or an
    /// entry cannot be decoded.
    fn replay(&self) -> Result<Vec<JournalEntry>, ScheduleError>;
}
