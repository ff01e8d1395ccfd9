//! Tests for configuration validation

use std::path::PathBuf;

use casting_scheduler::config::{RetrySettings, ScheduleConfig, StoreBackendConfig};

#[test]
fn test_schedule_config_validation() {
    assert!(ScheduleConfig::default().validate().is_ok());
}

#[test]
fn test_schedule_config_invalid_capacity() {
    let invalid = ScheduleConfig {
        max_candidates: 0,
        ..ScheduleConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_schedule_config_invalid_timeout() {
    let invalid = ScheduleConfig {
        request_timeout_ms: 0,
        ..ScheduleConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_schedule_config_invalid_retry_bounds() {
    let invalid = ScheduleConfig {
        retry: RetrySettings {
            max_retries: 2,
            initial_delay_ms: 5_000,
            max_delay_ms: 100,
        },
        ..ScheduleConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_schedule_config_from_json() {
    let json = r#"{
        "max_candidates": 4,
        "store": { "file": { "path": "/tmp/casting", "stream": "spring" } },
        "request_timeout_ms": 2500
    }"#;
    let cfg = ScheduleConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.max_candidates, 4);
    assert_eq!(cfg.change_feed_capacity, 64);
    assert_eq!(cfg.request_timeout().as_millis(), 2500);
    assert_eq!(
        cfg.store,
        StoreBackendConfig::File {
            path: PathBuf::from("/tmp/casting"),
            stream: "spring".into(),
        }
    );
}

#[test]
fn test_schedule_config_from_json_rejects_invalid() {
    assert!(ScheduleConfig::from_json_str(r#"{ "max_candidates": 0 }"#).is_err());
    assert!(ScheduleConfig::from_json_str("not json").is_err());
}

#[test]
fn test_blank_stream_rejected() {
    let invalid = ScheduleConfig {
        store: StoreBackendConfig::File {
            path: PathBuf::from("/tmp"),
            stream: " ".into(),
        },
        ..ScheduleConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_retry_settings_policy() {
    let policy = RetrySettings::default().policy();
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.initial_delay.as_millis(), 50);
}
