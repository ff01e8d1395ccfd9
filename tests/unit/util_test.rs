//! Tests for utility functions

use std::time::Duration;

use casting_scheduler::core::slot_catalog;
use casting_scheduler::util::{now, retry_with_backoff, RetryPolicy};

#[test]
fn test_slot_catalog_bounds() {
    let slots = slot_catalog();
    assert_eq!(slots.len(), 24);
    assert_eq!(slots[0], "08:00 - 08:30");
    assert_eq!(slots[23], "19:30 - 20:00");
}

#[test]
fn test_clock_moves_forward() {
    let earlier = now();
    assert!(now() >= earlier);
}

#[test]
fn test_retry_delay_is_capped() {
    let policy = RetryPolicy {
        max_retries: 10,
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(250),
        multiplier: 2.0,
    };
    assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
    assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(250));
}

#[tokio::test]
async fn test_retry_gives_up_on_terminal_error() {
    let attempts = std::sync::atomic::AtomicUsize::new(0);
    let counter = &attempts;
    let result: Result<(), String> = retry_with_backoff(
        &RetryPolicy::default(),
        move || async move {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err("slot full".to_string())
        },
        |err: &String| err.contains("unavailable"),
    )
    .await;
    assert!(result.is_err());
    assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn test_init_tracing_is_idempotent() {
    casting_scheduler::util::init_tracing();
    casting_scheduler::util::init_tracing();
    tracing::info!("tracing initialized twice without panicking");
}
