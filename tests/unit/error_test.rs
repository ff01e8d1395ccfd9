//! Tests for error types

use casting_scheduler::core::{CastingDateId, IdentityField, NotificationError, ScheduleError};
use casting_scheduler::runtime::ApiError;

#[test]
fn test_slot_full_error() {
    let err = ScheduleError::SlotFull {
        casting_date_id: CastingDateId::new(),
        slot: "10:00 - 10:30".to_string(),
        max: 3,
    };
    let text = format!("{err}");
    assert!(text.starts_with("slot full: 10:00 - 10:30"));
    assert!(text.ends_with("already holds 3 candidates"));
    assert!(err.is_rejection());
    assert!(!err.is_retryable());
}

#[test]
fn test_duplicate_identity_error() {
    let err = ScheduleError::DuplicateIdentity {
        casting_date_id: CastingDateId::new(),
        field: IdentityField::Phone,
    };
    assert!(format!("{err}").starts_with("duplicate identity: phone already booked"));
    assert!(err.is_rejection());
}

#[test]
fn test_transient_error_is_retryable() {
    let err = ScheduleError::TransientStoreFailure("connection reset".to_string());
    assert_eq!(format!("{err}"), "transient store failure: connection reset");
    assert!(err.is_retryable());
    assert!(!err.is_rejection());
}

#[test]
fn test_not_found_and_invalid() {
    assert_eq!(
        format!("{}", ScheduleError::NotFound("casting date x".into())),
        "not found: casting date x"
    );
    assert_eq!(
        format!("{}", ScheduleError::InvalidRequest("name is required".into())),
        "invalid request: name is required"
    );
}

#[test]
fn test_notification_error() {
    let err = NotificationError::DeliveryFailed("smtp timeout".to_string());
    assert_eq!(format!("{err}"), "notification delivery failed: smtp timeout");
}

#[test]
fn test_api_error_wraps_schedule_error() {
    let api: ApiError = ScheduleError::NotFound("reservation y".into()).into();
    assert_eq!(format!("{api}"), "not found: reservation y");
    assert_eq!(
        format!("{}", ApiError::Forbidden("remove casting date")),
        "forbidden: remove casting date requires a privileged session"
    );
}

#[test]
fn test_identity_field_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&IdentityField::Email).unwrap(), "\"email\"");
}
