//! Canonical schedule state and the admission rules evaluated against it.
//!
//! `ScheduleState` is plain data: it is only ever mutated through
//! [`ScheduleState::apply`], which replays a [`JournalEntry`]. Stores wrap it
//! in a lock so that [`ScheduleState::check_admission`] and the subsequent
//! `apply` form one critical section.

use std::collections::HashMap;

use uuid::Uuid;

use super::change_feed::{ChangeOp, EntityKind};
use super::error::ScheduleError;
use super::model::{CastingDate, CastingDateId, Reservation, ReservationId};
use super::schedule_store::JournalEntry;
use super::slots::is_catalog_slot;

/// Describes one entity touched by an applied journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedChange {
    /// Entity kind.
    pub entity: EntityKind,
    /// Operation kind.
    pub op: ChangeOp,
    /// Entity identifier.
    pub entity_id: Uuid,
    /// Owning casting date.
    pub casting_date_id: CastingDateId,
}

/// Candidate fields evaluated by the admission rules.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Target casting date.
    pub casting_date_id: CastingDateId,
    /// Target slot.
    pub slot: &'a str,
    /// Candidate name.
    pub name: &'a str,
    /// Candidate email.
    pub email: &'a str,
    /// Candidate phone.
    pub phone: &'a str,
}

/// In-memory canonical state of casting dates and reservations.
#[derive(Debug, Clone, Default)]
pub struct ScheduleState {
    casting_dates: HashMap<CastingDateId, CastingDate>,
    reservations: HashMap<ReservationId, Reservation>,
}

impl ScheduleState {
    /// Rebuild state by replaying journal entries in order.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a JournalEntry>) -> Self {
        let mut state = Self::default();
        for entry in entries {
            state.apply(entry);
        }
        state
    }

    /// Look up a casting date.
    #[must_use]
    pub fn casting_date(&self, id: CastingDateId) -> Option<&CastingDate> {
        self.casting_dates.get(&id)
    }

    /// Look up a reservation.
    #[must_use]
    pub fn reservation(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.get(&id)
    }

    /// Casting dates ordered by calendar date, then creation time.
    #[must_use]
    pub fn casting_dates(&self, active_only: bool) -> Vec<CastingDate> {
        let mut dates: Vec<CastingDate> = self
            .casting_dates
            .values()
            .filter(|d| !active_only || d.is_active)
            .cloned()
            .collect();
        dates.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        dates
    }

    /// Every reservation, unordered.
    #[must_use]
    pub fn reservations(&self) -> Vec<Reservation> {
        self.reservations.values().cloned().collect()
    }

    /// Reservations belonging to one casting date.
    pub fn reservations_for(
        &self,
        casting_date_id: CastingDateId,
    ) -> impl Iterator<Item = &Reservation> {
        self.reservations
            .values()
            .filter(move |r| r.casting_date_id == casting_date_id)
    }

    /// Number of reservations currently held in a slot.
    #[must_use]
    pub fn slot_count(&self, casting_date_id: CastingDateId, slot: &str) -> usize {
        self.reservations_for(casting_date_id)
            .filter(|r| r.slot == slot)
            .count()
    }

    /// Evaluate every admission rule for `candidate`, ignoring the
    /// reservation `exclude` (the record being edited, if any).
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for blank fields or a slot outside the catalog,
    /// `NotFound` for an unknown casting date, `SlotFull` when the slot would
    /// exceed `max_candidates`, `DuplicateIdentity` when another reservation
    /// on the date shares the email or phone.
    pub fn check_admission(
        &self,
        candidate: &Candidate<'_>,
        max_candidates: u32,
        exclude: Option<ReservationId>,
    ) -> Result<(), ScheduleError> {
        for (field, value) in [
            ("name", candidate.name),
            ("email", candidate.email),
            ("phone", candidate.phone),
        ] {
            if value.trim().is_empty() {
                return Err(ScheduleError::InvalidRequest(format!("{field} is required")));
            }
        }
        if !is_catalog_slot(candidate.slot) {
            return Err(ScheduleError::InvalidRequest(format!(
                "unknown slot `{}`",
                candidate.slot
            )));
        }
        if !self.casting_dates.contains_key(&candidate.casting_date_id) {
            return Err(ScheduleError::NotFound(format!(
                "casting date {}",
                candidate.casting_date_id
            )));
        }

        let others = self
            .reservations_for(candidate.casting_date_id)
            .filter(|r| Some(r.id) != exclude);

        let mut occupied = 0usize;
        let mut collision = None;
        for other in others {
            if other.slot == candidate.slot {
                occupied += 1;
            }
            if collision.is_none() {
                collision = other.shared_identity_field(candidate.email, candidate.phone);
            }
        }

        if occupied >= usize::try_from(max_candidates).unwrap_or(usize::MAX) {
            return Err(ScheduleError::SlotFull {
                casting_date_id: candidate.casting_date_id,
                slot: candidate.slot.to_string(),
                max: max_candidates,
            });
        }
        if let Some(field) = collision {
            return Err(ScheduleError::DuplicateIdentity {
                casting_date_id: candidate.casting_date_id,
                field,
            });
        }
        Ok(())
    }

    /// Apply a journal entry and describe the entities it touched, in the
    /// order their notifications must be published. Entries that refer to
    /// missing entities touch nothing.
    pub fn apply(&mut self, entry: &JournalEntry) -> Vec<AppliedChange> {
        match entry {
            JournalEntry::ReservationCreated { reservation }
            | JournalEntry::ReservationUpdated { reservation } => {
                let op = if self
                    .reservations
                    .insert(reservation.id, reservation.clone())
                    .is_some()
                {
                    ChangeOp::Updated
                } else {
                    ChangeOp::Created
                };
                vec![AppliedChange {
                    entity: EntityKind::Reservation,
                    op,
                    entity_id: *reservation.id.as_uuid(),
                    casting_date_id: reservation.casting_date_id,
                }]
            }
            JournalEntry::ReservationDeleted { id } => self
                .reservations
                .remove(id)
                .map(|removed| AppliedChange {
                    entity: EntityKind::Reservation,
                    op: ChangeOp::Deleted,
                    entity_id: *removed.id.as_uuid(),
                    casting_date_id: removed.casting_date_id,
                })
                .into_iter()
                .collect(),
            JournalEntry::CastingDateCreated { casting_date }
            | JournalEntry::CastingDateUpdated { casting_date } => {
                let op = if self
                    .casting_dates
                    .insert(casting_date.id, casting_date.clone())
                    .is_some()
                {
                    ChangeOp::Updated
                } else {
                    ChangeOp::Created
                };
                vec![AppliedChange {
                    entity: EntityKind::CastingDate,
                    op,
                    entity_id: *casting_date.id.as_uuid(),
                    casting_date_id: casting_date.id,
                }]
            }
            JournalEntry::CastingDateDeleted { id } => {
                if self.casting_dates.remove(id).is_none() {
                    return Vec::new();
                }
                let mut cascaded: Vec<Reservation> = Vec::new();
                self.reservations.retain(|_, r| {
                    if r.casting_date_id == *id {
                        cascaded.push(r.clone());
                        false
                    } else {
                        true
                    }
                });
                cascaded.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                let mut changes: Vec<AppliedChange> = cascaded
                    .iter()
                    .map(|r| AppliedChange {
                        entity: EntityKind::Reservation,
                        op: ChangeOp::Deleted,
                        entity_id: *r.id.as_uuid(),
                        casting_date_id: *id,
                    })
                    .collect();
                changes.push(AppliedChange {
                    entity: EntityKind::CastingDate,
                    op: ChangeOp::Deleted,
                    entity_id: *id.as_uuid(),
                    casting_date_id: *id,
                });
                changes
            }
        }
    }
}
