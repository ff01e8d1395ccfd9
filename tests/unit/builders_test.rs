//! Tests for builder modules

use std::sync::Arc;

use casting_scheduler::builders::{build_scheduler, build_store};
use casting_scheduler::config::{ScheduleConfig, StoreBackendConfig};
use casting_scheduler::core::ScheduleStore;
use casting_scheduler::infra::TracingNotifier;
use casting_scheduler::runtime::TokioSpawner;

#[test]
fn test_build_store_uses_configured_capacity() {
    let cfg = ScheduleConfig {
        max_candidates: 5,
        ..ScheduleConfig::default()
    };
    let store = build_store(&cfg).unwrap();
    assert_eq!(store.max_candidates(), 5);
}

#[test]
fn test_build_store_rejects_invalid_config() {
    let cfg = ScheduleConfig {
        change_feed_capacity: 0,
        ..ScheduleConfig::default()
    };
    assert!(build_store(&cfg).is_err());
}

#[test]
fn test_build_store_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ScheduleConfig {
        store: StoreBackendConfig::File {
            path: dir.path().join("journal"),
            stream: "builder".into(),
        },
        ..ScheduleConfig::default()
    };
    build_store(&cfg).unwrap();
    assert!(dir.path().join("journal").join("builder_journal.jsonl").exists());
}

#[tokio::test]
async fn test_build_scheduler_shares_store() {
    let scheduler = build_scheduler(
        &ScheduleConfig::default(),
        Arc::new(TracingNotifier),
        TokioSpawner::current().unwrap(),
    )
    .unwrap();
    let date = scheduler
        .lifecycle
        .add_date(chrono::NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(), "Shared")
        .await
        .unwrap();
    assert_eq!(
        scheduler.admission.store().get_casting_date(date.id).await.unwrap(),
        date
    );
}
