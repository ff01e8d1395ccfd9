//! Casting date lifecycle: creation, deactivation and cascading removal.

use std::sync::Arc;

use chrono::NaiveDate;

use super::error::ScheduleError;
use super::model::{CastingDate, CastingDateId};
use super::schedule_store::ScheduleStore;

/// Outcome of removing a casting date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRemoval {
    /// Reservations removed together with the date.
    pub removed_reservations: usize,
    /// Date the caller should select next, if any remain.
    pub next_selection: Option<CastingDateId>,
}

/// Privileged operations on casting dates.
#[derive(Clone)]
pub struct DateLifecycleManager {
    store: Arc<dyn ScheduleStore>,
}

impl DateLifecycleManager {
    /// Create a manager over a shared store.
    #[must_use]
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    /// Add an active casting date.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for a blank title, or the store's error.
    pub async fn add_date(
        &self,
        date: NaiveDate,
        title: &str,
    ) -> Result<CastingDate, ScheduleError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ScheduleError::InvalidRequest(
                "casting date title must not be blank".into(),
            ));
        }
        let created = self.store.create_casting_date(date, title.to_owned()).await?;
        tracing::info!(casting_date_id = %created.id, date = %created.label(), "casting date added");
        Ok(created)
    }

    /// Hide a casting date from booking without deleting its reservations.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown date, or the store's error.
    pub async fn deactivate_date(&self, id: CastingDateId) -> Result<CastingDate, ScheduleError> {
        let updated = self.store.set_casting_date_active(id, false).await?;
        tracing::info!(casting_date_id = %id, "casting date deactivated");
        Ok(updated)
    }

    /// Make a previously deactivated date bookable again.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown date, or the store's error.
    pub async fn reactivate_date(&self, id: CastingDateId) -> Result<CastingDate, ScheduleError> {
        let updated = self.store.set_casting_date_active(id, true).await?;
        tracing::info!(casting_date_id = %id, "casting date reactivated");
        Ok(updated)
    }

    /// Delete a date and every reservation on it as one atomic operation.
    ///
    /// `current` is the caller's selected date. When it is the one removed,
    /// or nothing was selected, the earliest remaining active date is
    /// proposed; otherwise the current selection is kept.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown date. On error no reservation was removed.
    pub async fn remove_date(
        &self,
        id: CastingDateId,
        current: Option<CastingDateId>,
    ) -> Result<DateRemoval, ScheduleError> {
        let removed_reservations = self.store.delete_casting_date(id).await?;
        tracing::info!(casting_date_id = %id, removed_reservations, "casting date removed");

        let next_selection = match current {
            Some(selected) if selected != id => Some(selected),
            _ => match self.store.list_casting_dates(true).await {
                Ok(remaining) => next_selection(&remaining, id),
                Err(err) => {
                    tracing::warn!(error = %err, "could not list dates for reselection");
                    None
                }
            },
        };

        Ok(DateRemoval {
            removed_reservations,
            next_selection,
        })
    }
}

/// Earliest active date other than `removed`. Expects `dates` sorted ascending.
fn next_selection(dates: &[CastingDate], removed: CastingDateId) -> Option<CastingDateId> {
    dates
        .iter()
        .find(|d| d.is_active && d.id != removed)
        .map(|d| d.id)
}
