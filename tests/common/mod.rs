//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use casting_scheduler::core::{
    AdmissionController, BookingNotifier, BookingRequest, CastingDate, CastingDateId,
    ChangeSubscription, Reservation, ReservationId, ReservationUpdate, ScheduleError,
    ScheduleStore, Snapshot,
};
use casting_scheduler::infra::{InMemoryNotifier, InMemoryScheduleStore};
use casting_scheduler::runtime::TokioSpawner;
use chrono::NaiveDate;

pub const SLOT: &str = "10:00 - 10:30";

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
}

pub fn store(max_candidates: u32) -> Arc<dyn ScheduleStore> {
    Arc::new(InMemoryScheduleStore::in_memory(max_candidates, 64).unwrap())
}

pub fn controller(
    store: &Arc<dyn ScheduleStore>,
    notifier: Arc<dyn BookingNotifier>,
) -> AdmissionController<TokioSpawner> {
    AdmissionController::new(
        Arc::clone(store),
        notifier,
        TokioSpawner::current().unwrap(),
    )
}

pub fn quiet_controller(store: &Arc<dyn ScheduleStore>) -> AdmissionController<TokioSpawner> {
    controller(store, Arc::new(InMemoryNotifier::new()))
}

/// Booking with an identity unique to `n`.
pub fn candidate(date: CastingDateId, slot: &str, n: usize) -> BookingRequest {
    BookingRequest::new(
        date,
        slot,
        format!("Candidate {n}"),
        format!("candidate{n}@example.com"),
        format!("555-{n:04}"),
    )
}

/// Poll `condition` until it holds or roughly two seconds pass.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Store wrapper that delays booking writes, or the replies of a number of
/// reservation snapshot reads.
pub struct SlowStore {
    inner: Arc<dyn ScheduleStore>,
    write_delay: Duration,
    read_delay: Duration,
    slow_reads: Arc<AtomicUsize>,
}

impl SlowStore {
    pub fn wrap(inner: Arc<dyn ScheduleStore>, delay: Duration) -> Arc<dyn ScheduleStore> {
        Arc::new(Self {
            inner,
            write_delay: delay,
            read_delay: Duration::ZERO,
            slow_reads: Arc::default(),
        })
    }

    /// Writes pass straight through. The returned counter holds how many
    /// upcoming reservation snapshots are read at once but answered `delay` later.
    pub fn with_slow_reads(
        inner: Arc<dyn ScheduleStore>,
        delay: Duration,
    ) -> (Arc<dyn ScheduleStore>, Arc<AtomicUsize>) {
        let slow_reads = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(Self {
            inner,
            write_delay: Duration::ZERO,
            read_delay: delay,
            slow_reads: Arc::clone(&slow_reads),
        });
        (store, slow_reads)
    }
}

#[async_trait]
impl ScheduleStore for SlowStore {
    async fn create_reservation(
        &self,
        request: BookingRequest,
    ) -> Result<Reservation, ScheduleError> {
        tokio::time::sleep(self.write_delay).await;
        self.inner.create_reservation(request).await
    }

    async fn update_reservation(
        &self,
        id: ReservationId,
        update: ReservationUpdate,
    ) -> Result<Reservation, ScheduleError> {
        self.inner.update_reservation(id, update).await
    }

    async fn delete_reservation(&self, id: ReservationId) -> Result<(), ScheduleError> {
        self.inner.delete_reservation(id).await
    }

    async fn create_casting_date(
        &self,
        date: NaiveDate,
        title: String,
    ) -> Result<CastingDate, ScheduleError> {
        self.inner.create_casting_date(date, title).await
    }

    async fn set_casting_date_active(
        &self,
        id: CastingDateId,
        active: bool,
    ) -> Result<CastingDate, ScheduleError> {
        self.inner.set_casting_date_active(id, active).await
    }

    async fn delete_casting_date(&self, id: CastingDateId) -> Result<usize, ScheduleError> {
        self.inner.delete_casting_date(id).await
    }

    async fn get_casting_date(&self, id: CastingDateId) -> Result<CastingDate, ScheduleError> {
        self.inner.get_casting_date(id).await
    }

    async fn list_casting_dates(
        &self,
        active_only: bool,
    ) -> Result<Vec<CastingDate>, ScheduleError> {
        self.inner.list_casting_dates(active_only).await
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, ScheduleError> {
        self.inner.list_reservations().await
    }

    async fn reservation_snapshot(&self) -> Result<Snapshot<Reservation>, ScheduleError> {
        let snapshot = self.inner.reservation_snapshot().await?;
        let delayed = self
            .slow_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if delayed {
            tokio::time::sleep(self.read_delay).await;
        }
        Ok(snapshot)
    }

    async fn casting_date_snapshot(&self) -> Result<Snapshot<CastingDate>, ScheduleError> {
        self.inner.casting_date_snapshot().await
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.inner.subscribe()
    }

    fn max_candidates(&self) -> u32 {
        self.inner.max_candidates()
    }
}
