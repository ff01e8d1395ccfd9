//! Builders for the store and the components layered on it.

use std::sync::Arc;

use anyhow::{anyhow, Context};

use crate::config::{ScheduleConfig, StoreBackendConfig};
use crate::core::{
    AdmissionController, AppResult, BookingNotifier, DateLifecycleManager, Observer, ScheduleStore,
    Spawn,
};
use crate::infra::{FileJournal, InMemoryScheduleStore, JournaledStore};

/// Build the store selected by `cfg`, replaying its journal when file-backed.
///
/// # Errors
///
/// Invalid configuration, or a journal that cannot be opened or replayed.
pub fn build_store(cfg: &ScheduleConfig) -> AppResult<Arc<dyn ScheduleStore>> {
    cfg.validate().map_err(|e| anyhow!("config invalid: {e}"))?;
    let store: Arc<dyn ScheduleStore> = match &cfg.store {
        StoreBackendConfig::InMemory => Arc::new(
            InMemoryScheduleStore::in_memory(cfg.max_candidates, cfg.change_feed_capacity)
                .context("creating in-memory store")?,
        ),
        StoreBackendConfig::File { path, stream } => {
            let journal = FileJournal::open(path, stream.as_str())
                .with_context(|| format!("opening journal `{stream}` in {}", path.display()))?;
            Arc::new(
                JournaledStore::open(journal, cfg.max_candidates, cfg.change_feed_capacity)
                    .context("replaying journal")?,
            )
        }
    };
    Ok(store)
}

/// Components sharing one store.
pub struct Scheduler<S> {
    /// The authoritative store.
    pub store: Arc<dyn ScheduleStore>,
    /// Booking, edit and cancel entry point.
    pub admission: AdmissionController<S>,
    /// Casting date lifecycle operations.
    pub lifecycle: DateLifecycleManager,
    /// Configuration the components were built from.
    pub config: ScheduleConfig,
}

impl<S> Scheduler<S>
where
    S: Spawn,
{
    /// Connect a new observer to the store and start its feed listeners.
    ///
    /// # Errors
    ///
    /// The initial reads failed after retries.
    pub async fn connect_observer(&self, spawner: &S) -> AppResult<Observer> {
        let observer = Observer::connect(Arc::clone(&self.store), self.config.retry.policy())
            .await
            .context("initial observer sync")?;
        observer.start(spawner);
        Ok(observer)
    }
}

/// Build a store plus the admission controller and lifecycle manager over it.
///
/// # Errors
///
/// See [`build_store`].
pub fn build_scheduler<S>(
    cfg: &ScheduleConfig,
    notifier: Arc<dyn BookingNotifier>,
    spawner: S,
) -> AppResult<Scheduler<S>>
where
    S: Spawn,
{
    let store = build_store(cfg)?;
    tracing::info!(
        max_candidates = cfg.max_candidates,
        backend = ?cfg.store,
        "scheduler built"
    );
    Ok(Scheduler {
        admission: AdmissionController::new(Arc::clone(&store), notifier, spawner),
        lifecycle: DateLifecycleManager::new(Arc::clone(&store)),
        store,
        config: cfg.clone(),
    })
}
