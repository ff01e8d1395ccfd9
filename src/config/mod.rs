//! Configuration models for the store backend, capacity and timeouts.

pub mod schedule;

pub use schedule::{RetrySettings, ScheduleConfig, StoreBackendConfig};
