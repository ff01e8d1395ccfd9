//! Tests for tokio spawner utilities

use casting_scheduler::core::Spawn;
use casting_scheduler::runtime::api::Session;
use casting_scheduler::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_spawner_requires_runtime() {
    assert!(TokioSpawner::current().is_err());
}

#[test]
fn test_owned_runtime_outlives_builder() {
    let spawner = TokioSpawner::with_worker_threads(1).unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    spawner.spawn(async move {
        tx.send("ran").unwrap();
    });
    assert_eq!(
        rx.recv_timeout(std::time::Duration::from_secs(2)).unwrap(),
        "ran"
    );
}

#[test]
fn test_session_serializes() {
    let session = Session::admin();
    let json = serde_json::to_string(&session).unwrap();
    assert_eq!(json, r#"{"privileged":true,"selected_date":null}"#);
}
