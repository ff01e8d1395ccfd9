//! Builders to construct scheduler components from configuration.

pub mod store_builder;

pub use store_builder::{build_scheduler, build_store, Scheduler};
