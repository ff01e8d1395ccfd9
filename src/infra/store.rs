//! Journaled schedule store.
//!
//! One lock guards the canonical state, the journal and the sequence counter.
//! Every mutation validates, appends, applies and publishes inside that lock,
//! so admission checks can never observe a state that is about to change.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::core::{
    BookingRequest, Candidate, CastingDate, CastingDateId, ChangeEvent, ChangeFeed,
    ChangeSubscription, Journal, JournalEntry, Reservation, ReservationId, ReservationUpdate,
    ScheduleError, ScheduleState, ScheduleStore, Snapshot,
};
use crate::infra::journal::MemoryJournal;
use crate::util::clock::now;

struct Inner<J> {
    state: ScheduleState,
    journal: J,
    seq: u64,
}

/// Store backed by any [`Journal`]; state is rebuilt from the journal on open.
pub struct JournaledStore<J> {
    inner: Mutex<Inner<J>>,
    feed: ChangeFeed,
    max_candidates: u32,
}

/// Store that keeps its journal in memory.
pub type InMemoryScheduleStore = JournaledStore<MemoryJournal>;

impl JournaledStore<MemoryJournal> {
    /// Empty in-memory store.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for a zero capacity.
    pub fn in_memory(max_candidates: u32, feed_capacity: usize) -> Result<Self, ScheduleError> {
        Self::open(MemoryJournal::new(), max_candidates, feed_capacity)
    }
}

impl<J> JournaledStore<J>
where
    J: Journal,
{
    /// Replay `journal` and open a store over the resulting state.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for a zero capacity, or the journal's replay error.
    pub fn open(
        journal: J,
        max_candidates: u32,
        feed_capacity: usize,
    ) -> Result<Self, ScheduleError> {
        if max_candidates == 0 {
            return Err(ScheduleError::InvalidRequest(
                "max_candidates must be at least 1".into(),
            ));
        }
        let entries = journal.replay()?;
        let state = ScheduleState::from_entries(&entries);
        tracing::info!(
            entries = entries.len(),
            max_candidates,
            "schedule store opened"
        );
        Ok(Self::from_state(state, journal, max_candidates, feed_capacity))
    }

    fn from_state(state: ScheduleState, journal: J, max_candidates: u32, feed_capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state,
                journal,
                seq: 0,
            }),
            feed: ChangeFeed::new(feed_capacity),
            max_candidates,
        }
    }

    /// Validate against the current state, then journal, apply and publish
    /// the resulting entry without releasing the lock.
    fn commit<T>(
        &self,
        build: impl FnOnce(&ScheduleState) -> Result<(JournalEntry, T), ScheduleError>,
    ) -> Result<T, ScheduleError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let (entry, value) = build(&inner.state)?;

        if let Err(err) = inner.journal.append(&entry) {
            tracing::error!(error = %err, "journal append failed, mutation discarded");
            return Err(match err {
                ScheduleError::TransientStoreFailure(_) => err,
                other => ScheduleError::TransientStoreFailure(other.to_string()),
            });
        }

        let at = now();
        for change in inner.state.apply(&entry) {
            inner.seq += 1;
            self.feed.publish(ChangeEvent {
                seq: inner.seq,
                entity: change.entity,
                op: change.op,
                entity_id: change.entity_id,
                casting_date_id: change.casting_date_id,
                at,
            });
        }
        Ok(value)
    }

    fn read<T>(&self, f: impl FnOnce(&ScheduleState) -> T) -> T {
        f(&self.inner.lock().state)
    }

    fn snapshot<T>(&self, f: impl FnOnce(&ScheduleState) -> Vec<T>) -> Snapshot<T> {
        let inner = self.inner.lock();
        Snapshot {
            seq: inner.seq,
            items: f(&inner.state),
        }
    }
}

#[async_trait]
impl<J> ScheduleStore for JournaledStore<J>
where
    J: Journal + 'static,
{
    async fn create_reservation(
        &self,
        request: BookingRequest,
    ) -> Result<Reservation, ScheduleError> {
        let max = self.max_candidates;
        self.commit(|state| {
            if let Some(date) = state.casting_date(request.casting_date_id) {
                if !date.is_active {
                    return Err(ScheduleError::InvalidRequest(format!(
                        "casting date {} is not accepting bookings",
                        date.id
                    )));
                }
            }
            state.check_admission(
                &Candidate {
                    casting_date_id: request.casting_date_id,
                    slot: &request.slot,
                    name: &request.name,
                    email: &request.email,
                    phone: &request.phone,
                },
                max,
                None,
            )?;
            let reservation = Reservation {
                id: ReservationId::new(),
                slot: request.slot,
                name: request.name,
                email: request.email,
                phone: request.phone,
                casting_date_id: request.casting_date_id,
                created_at: now(),
            };
            Ok((
                JournalEntry::ReservationCreated {
                    reservation: reservation.clone(),
                },
                reservation,
            ))
        })
    }

    async fn update_reservation(
        &self,
        id: ReservationId,
        update: ReservationUpdate,
    ) -> Result<Reservation, ScheduleError> {
        let max = self.max_candidates;
        self.commit(|state| {
            let current = state
                .reservation(id)
                .ok_or_else(|| ScheduleError::NotFound(format!("reservation {id}")))?;
            state.check_admission(
                &Candidate {
                    casting_date_id: current.casting_date_id,
                    slot: &update.slot,
                    name: &update.name,
                    email: &update.email,
                    phone: &update.phone,
                },
                max,
                Some(id),
            )?;
            let reservation = Reservation {
                slot: update.slot,
                name: update.name,
                email: update.email,
                phone: update.phone,
                ..current.clone()
            };
            Ok((
                JournalEntry::ReservationUpdated {
                    reservation: reservation.clone(),
                },
                reservation,
            ))
        })
    }

    async fn delete_reservation(&self, id: ReservationId) -> Result<(), ScheduleError> {
        self.commit(|state| {
            if state.reservation(id).is_none() {
                return Err(ScheduleError::NotFound(format!("reservation {id}")));
            }
            Ok((JournalEntry::ReservationDeleted { id }, ()))
        })
    }

    async fn create_casting_date(
        &self,
        date: NaiveDate,
        title: String,
    ) -> Result<CastingDate, ScheduleError> {
        self.commit(|_| {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ScheduleError::InvalidRequest(
                    "casting date title must not be blank".into(),
                ));
            }
            let casting_date = CastingDate {
                id: CastingDateId::new(),
                date,
                title,
                is_active: true,
                created_at: now(),
            };
            Ok((
                JournalEntry::CastingDateCreated {
                    casting_date: casting_date.clone(),
                },
                casting_date,
            ))
        })
    }

    async fn set_casting_date_active(
        &self,
        id: CastingDateId,
        active: bool,
    ) -> Result<CastingDate, ScheduleError> {
        self.commit(|state| {
            let current = state
                .casting_date(id)
                .ok_or_else(|| ScheduleError::NotFound(format!("casting date {id}")))?;
            let casting_date = CastingDate {
                is_active: active,
                ..current.clone()
            };
            Ok((
                JournalEntry::CastingDateUpdated {
                    casting_date: casting_date.clone(),
                },
                casting_date,
            ))
        })
    }

    async fn delete_casting_date(&self, id: CastingDateId) -> Result<usize, ScheduleError> {
        self.commit(|state| {
            if state.casting_date(id).is_none() {
                return Err(ScheduleError::NotFound(format!("casting date {id}")));
            }
            let cascaded = state.reservations_for(id).count();
            Ok((JournalEntry::CastingDateDeleted { id }, cascaded))
        })
    }

    async fn get_casting_date(&self, id: CastingDateId) -> Result<CastingDate, ScheduleError> {
        self.read(|state| state.casting_date(id).cloned())
            .ok_or_else(|| ScheduleError::NotFound(format!("casting date {id}")))
    }

    async fn list_casting_dates(
        &self,
        active_only: bool,
    ) -> Result<Vec<CastingDate>, ScheduleError> {
        Ok(self.read(|state| state.casting_dates(active_only)))
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, ScheduleError> {
        Ok(self.read(ScheduleState::reservations))
    }

    async fn reservation_snapshot(&self) -> Result<Snapshot<Reservation>, ScheduleError> {
        Ok(self.snapshot(ScheduleState::reservations))
    }

    async fn casting_date_snapshot(&self) -> Result<Snapshot<CastingDate>, ScheduleError> {
        Ok(self.snapshot(|state| state.casting_dates(true)))
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.feed.subscribe()
    }

    fn max_candidates(&self) -> u32 {
        self.max_candidates
    }
}
