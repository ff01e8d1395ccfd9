//! Observer-local projection of the schedule with optimistic placeholders.
//!
//! A placeholder moves through an explicit state machine:
//!
//! ```text
//! insert_placeholder ──> Pending ──confirm──> Confirmed(real id)
//!                          │  └──resync finds counterpart──> Confirmed(real id)
//!                          └──reject──> Rejected(reason)
//! ```
//!
//! Only `Pending` placeholders are visible in the projection. Resolved
//! placeholders stay queryable until the next reservation resync, then they
//! are dropped.
//!
//! Snapshots are applied only if they are at least as new as the last one
//! applied for the same collection, so a slow read finishing late cannot
//! roll the projection back.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::ScheduleError;
use super::export::{sequence_for_export, ExportRecord};
use super::model::{BookingRequest, CastingDate, CastingDateId, Reservation, ReservationId};
use super::schedule_store::Snapshot;

/// Locally generated identifier of an unconfirmed booking. Never sent to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderId(Uuid);

impl PlaceholderId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "temp-{}", self.0)
    }
}

/// A booking shown locally before the store has answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Local identifier.
    pub id: PlaceholderId,
    /// The submitted request.
    pub request: BookingRequest,
    /// When the booking was submitted.
    pub submitted_at: DateTime<Utc>,
}

/// Lifecycle of a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderState {
    /// Awaiting the store's answer; visible in the projection.
    Pending,
    /// Superseded by the authoritative record.
    Confirmed(ReservationId),
    /// Refused by the store; removed from the projection.
    Rejected(ScheduleError),
}

#[derive(Debug, Clone)]
struct PendingBooking {
    placeholder: Placeholder,
    state: PlaceholderState,
}

/// Occupancy of one slot as seen by this observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotOccupancy {
    /// Confirmed reservations.
    pub confirmed: usize,
    /// Pending placeholders.
    pub pending: usize,
}

impl SlotOccupancy {
    /// Confirmed plus pending.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.confirmed + self.pending
    }

    /// Seats left for `max_candidates`, never negative.
    #[must_use]
    pub fn remaining(&self, max_candidates: u32) -> usize {
        usize::try_from(max_candidates)
            .unwrap_or(usize::MAX)
            .saturating_sub(self.total())
    }
}

/// Eventually consistent copy of the store held by one observer.
#[derive(Debug, Clone, Default)]
pub struct LocalProjection {
    reservations: HashMap<ReservationId, Reservation>,
    casting_dates: Vec<CastingDate>,
    pending: HashMap<PlaceholderId, PendingBooking>,
    reservations_seq: u64,
    casting_dates_seq: u64,
}

impl LocalProjection {
    /// Empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a booking immediately, before the store confirms it.
    pub fn insert_placeholder(&mut self, request: BookingRequest) -> PlaceholderId {
        let id = PlaceholderId::new();
        self.pending.insert(
            id,
            PendingBooking {
                placeholder: Placeholder {
                    id,
                    request,
                    submitted_at: Utc::now(),
                },
                state: PlaceholderState::Pending,
            },
        );
        id
    }

    /// The store accepted the booking: the real record replaces the placeholder.
    pub fn confirm(&mut self, id: PlaceholderId, reservation: Reservation) {
        if let Some(booking) = self.pending.get_mut(&id) {
            booking.state = PlaceholderState::Confirmed(reservation.id);
        }
        self.reservations.insert(reservation.id, reservation);
    }

    /// The store refused the booking: the placeholder disappears at once.
    pub fn reject(&mut self, id: PlaceholderId, reason: ScheduleError) {
        if let Some(booking) = self.pending.get_mut(&id) {
            booking.state = PlaceholderState::Rejected(reason);
        }
    }

    /// Current state of a placeholder, if it has not been pruned yet.
    #[must_use]
    pub fn placeholder_state(&self, id: PlaceholderId) -> Option<&PlaceholderState> {
        self.pending.get(&id).map(|b| &b.state)
    }

    /// Replace confirmed reservations with an authoritative snapshot.
    ///
    /// Previously resolved placeholders are pruned; pending placeholders whose
    /// real counterpart (same date, slot and identity) is in the snapshot are
    /// marked confirmed and stop being shown. Returns `false`, changing
    /// nothing, if the snapshot is older than the one last applied.
    pub fn replace_reservations(&mut self, snapshot: Snapshot<Reservation>) -> bool {
        if snapshot.seq < self.reservations_seq {
            return false;
        }
        self.reservations_seq = snapshot.seq;
        self.reservations = snapshot.items.into_iter().map(|r| (r.id, r)).collect();
        self.pending
            .retain(|_, b| matches!(b.state, PlaceholderState::Pending));
        for booking in self.pending.values_mut() {
            let request = &booking.placeholder.request;
            if let Some(real) = self.reservations.values().find(|r| {
                r.casting_date_id == request.casting_date_id
                    && r.slot == request.slot
                    && r.shares_identity(&request.email, &request.phone)
            }) {
                booking.state = PlaceholderState::Confirmed(real.id);
            }
        }
        true
    }

    /// Replace the selectable casting dates with an authoritative snapshot.
    /// Returns `false`, changing nothing, for a snapshot older than the last.
    pub fn replace_casting_dates(&mut self, snapshot: Snapshot<CastingDate>) -> bool {
        if snapshot.seq < self.casting_dates_seq {
            return false;
        }
        let mut dates = snapshot.items;
        dates.retain(|d| d.is_active);
        dates.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        self.casting_dates_seq = snapshot.seq;
        self.casting_dates = dates;
        true
    }

    /// Active casting dates, earliest first.
    #[must_use]
    pub fn casting_dates(&self) -> &[CastingDate] {
        &self.casting_dates
    }

    /// Confirmed reservations of one date.
    #[must_use]
    pub fn reservations_for(&self, casting_date_id: CastingDateId) -> Vec<&Reservation> {
        self.reservations
            .values()
            .filter(|r| r.casting_date_id == casting_date_id)
            .collect()
    }

    /// Every confirmed reservation.
    #[must_use]
    pub fn reservations(&self) -> Vec<&Reservation> {
        self.reservations.values().collect()
    }

    /// Pending placeholders of one date, oldest first.
    #[must_use]
    pub fn placeholders_for(&self, casting_date_id: CastingDateId) -> Vec<&Placeholder> {
        let mut visible: Vec<&Placeholder> = self
            .pending
            .values()
            .filter(|b| {
                b.state == PlaceholderState::Pending
                    && b.placeholder.request.casting_date_id == casting_date_id
            })
            .map(|b| &b.placeholder)
            .collect();
        visible.sort_by_key(|p| p.submitted_at);
        visible
    }

    /// Occupancy per slot of one date, counting pending placeholders.
    #[must_use]
    pub fn occupancy(&self, casting_date_id: CastingDateId) -> HashMap<String, SlotOccupancy> {
        let mut counts: HashMap<String, SlotOccupancy> = HashMap::new();
        for reservation in self.reservations_for(casting_date_id) {
            counts
                .entry(reservation.slot.clone())
                .or_default()
                .confirmed += 1;
        }
        for placeholder in self.placeholders_for(casting_date_id) {
            counts
                .entry(placeholder.request.slot.clone())
                .or_default()
                .pending += 1;
        }
        counts
    }

    /// Confirmed reservations of one date in export order.
    #[must_use]
    pub fn export(&self, casting_date_id: CastingDateId) -> Vec<ExportRecord> {
        sequence_for_export(self.reservations.values(), casting_date_id)
    }
}
