//! Change-feed reconciler: keeps one observer's projection converged with the store.
//!
//! Each observer listens to the reservation and casting date channels
//! independently. Any notification (or a lag report) triggers one full
//! resynchronization read of the affected collection; notifications already
//! queued behind it are folded into the same read. Bookings submitted through
//! the observer are shown immediately as placeholders and resolved from the
//! controller's answer without waiting for the feed.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};

use super::admission::AdmissionController;
use super::change_feed::{ChangeEvent, ChangeSubscription, EntityKind};
use super::error::ScheduleError;
use super::model::{BookingRequest, Reservation};
use super::projection::LocalProjection;
use super::schedule_store::ScheduleStore;
use super::spawn::Spawn;
use crate::util::retry::{retry_with_backoff, RetryPolicy};

/// Result of a booking submitted through an observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The store accepted the booking.
    Accepted(Reservation),
    /// The store refused the booking.
    Rejected(ScheduleError),
    /// No answer arrived in time. The booking may or may not exist; the
    /// projection has been resynchronized and the feed will tell.
    Unconfirmed,
}

/// One connected client's view of the schedule.
pub struct Observer {
    store: Arc<dyn ScheduleStore>,
    projection: Arc<Mutex<LocalProjection>>,
    retry: RetryPolicy,
    subscription: Mutex<Option<ChangeSubscription>>,
    shutdown: watch::Sender<bool>,
}

impl Observer {
    /// Subscribe to the feed, then load both collections.
    ///
    /// Subscribing first guarantees that no mutation accepted after the
    /// initial read goes unnoticed once [`Observer::start`] is called.
    ///
    /// # Errors
    ///
    /// Returns the store error if the initial reads fail after retries.
    pub async fn connect(
        store: Arc<dyn ScheduleStore>,
        retry: RetryPolicy,
    ) -> Result<Self, ScheduleError> {
        let subscription = store.subscribe();
        let (shutdown, _) = watch::channel(false);
        let observer = Self {
            store,
            projection: Arc::new(Mutex::new(LocalProjection::new())),
            retry,
            subscription: Mutex::new(Some(subscription)),
            shutdown,
        };
        observer.resync_reservations().await?;
        observer.resync_casting_dates().await?;
        Ok(observer)
    }

    /// Spawn the two feed listeners. Returns `false` if already started.
    pub fn start<S: Spawn>(&self, spawner: &S) -> bool {
        let Some(subscription) = self.subscription.lock().take() else {
            tracing::warn!("observer listeners already started");
            return false;
        };
        let ChangeSubscription {
            reservations,
            casting_dates,
        } = subscription;
        for (kind, receiver) in [
            (EntityKind::Reservation, reservations),
            (EntityKind::CastingDate, casting_dates),
        ] {
            spawner.spawn(listen(
                kind,
                receiver,
                Arc::clone(&self.store),
                Arc::clone(&self.projection),
                self.retry.clone(),
                self.shutdown.subscribe(),
            ));
        }
        true
    }

    /// Stop the feed listeners. Dropping the observer has the same effect.
    /// Listeners started after a stop exit immediately.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Re-read every reservation and replace the projection's confirmed set.
    ///
    /// # Errors
    ///
    /// Returns the store error once retries are exhausted.
    pub async fn resync_reservations(&self) -> Result<(), ScheduleError> {
        resync(
            EntityKind::Reservation,
            self.store.as_ref(),
            &self.projection,
            &self.retry,
        )
        .await
    }

    /// Re-read the active casting dates.
    ///
    /// # Errors
    ///
    /// Returns the store error once retries are exhausted.
    pub async fn resync_casting_dates(&self) -> Result<(), ScheduleError> {
        resync(
            EntityKind::CastingDate,
            self.store.as_ref(),
            &self.projection,
            &self.retry,
        )
        .await
    }

    /// Book through `controller`, showing a placeholder until the answer arrives.
    ///
    /// Acceptance replaces the placeholder with the real record; rejection
    /// removes it at once. If `limit` elapses first the placeholder is
    /// withdrawn, the reservations are re-read, and the outcome is
    /// [`SubmissionOutcome::Unconfirmed`], never acceptance.
    pub async fn submit_booking<S: Spawn>(
        &self,
        controller: &AdmissionController<S>,
        request: BookingRequest,
        limit: Duration,
    ) -> SubmissionOutcome {
        let placeholder = self.projection.lock().insert_placeholder(request.clone());
        tracing::debug!(placeholder = %placeholder, slot = %request.slot, "placeholder inserted");

        match tokio::time::timeout(limit, controller.book(request)).await {
            Ok(Ok(reservation)) => {
                self.projection
                    .lock()
                    .confirm(placeholder, reservation.clone());
                SubmissionOutcome::Accepted(reservation)
            }
            Ok(Err(err)) => {
                self.projection.lock().reject(placeholder, err.clone());
                SubmissionOutcome::Rejected(err)
            }
            Err(_) => {
                tracing::warn!(
                    placeholder = %placeholder,
                    timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    "booking unanswered before timeout"
                );
                self.projection.lock().reject(
                    placeholder,
                    ScheduleError::TransientStoreFailure("no answer before timeout".into()),
                );
                if let Err(err) = self.resync_reservations().await {
                    tracing::error!(error = %err, "resync after timeout failed");
                }
                SubmissionOutcome::Unconfirmed
            }
        }
    }

    /// Run `f` against the current projection under its lock.
    pub fn with_projection<R>(&self, f: impl FnOnce(&LocalProjection) -> R) -> R {
        f(&self.projection.lock())
    }

    /// Copy of the current projection.
    #[must_use]
    pub fn snapshot(&self) -> LocalProjection {
        self.projection.lock().clone()
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn resync(
    kind: EntityKind,
    store: &dyn ScheduleStore,
    projection: &Mutex<LocalProjection>,
    retry: &RetryPolicy,
) -> Result<(), ScheduleError> {
    let (seq, count, applied) = match kind {
        EntityKind::Reservation => {
            let snapshot = retry_with_backoff(
                retry,
                move || store.reservation_snapshot(),
                ScheduleError::is_retryable,
            )
            .await?;
            let (seq, count) = (snapshot.seq, snapshot.items.len());
            (seq, count, projection.lock().replace_reservations(snapshot))
        }
        EntityKind::CastingDate => {
            let snapshot = retry_with_backoff(
                retry,
                move || store.casting_date_snapshot(),
                ScheduleError::is_retryable,
            )
            .await?;
            let (seq, count) = (snapshot.seq, snapshot.items.len());
            (seq, count, projection.lock().replace_casting_dates(snapshot))
        }
    };
    if applied {
        tracing::debug!(entity = ?kind, seq, count, "resynchronized");
    } else {
        tracing::debug!(entity = ?kind, seq, "snapshot superseded by a newer one, dropped");
    }
    Ok(())
}

async fn listen(
    kind: EntityKind,
    mut receiver: broadcast::Receiver<ChangeEvent>,
    store: Arc<dyn ScheduleStore>,
    projection: Arc<Mutex<LocalProjection>>,
    retry: RetryPolicy,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        // A stop issued before the listener subscribed is never reported by `changed`.
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = shutdown.changed() => break,
            received = receiver.recv() => match received {
                Ok(event) => {
                    tracing::debug!(entity = ?kind, seq = event.seq, op = ?event.op, "change received");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(entity = ?kind, skipped, "change feed lagged, resynchronizing");
                }
                Err(RecvError::Closed) => break,
            },
        }

        let mut folded = 0usize;
        loop {
            match receiver.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => folded += 1,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if folded > 0 {
            tracing::debug!(entity = ?kind, folded, "folded queued changes into one resync");
        }

        if let Err(err) = resync(kind, store.as_ref(), &projection, &retry).await {
            tracing::error!(entity = ?kind, error = %err, "resync failed, projection may be stale");
        }
    }
    tracing::debug!(entity = ?kind, "feed listener stopped");
}
