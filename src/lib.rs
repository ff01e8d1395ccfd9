//! # Casting Scheduler
//!
//! Admission control and consistency for casting-interview slot booking.
//!
//! A casting day is split into 24 fixed half-hour slots. Each slot holds at
//! most `max_candidates` people (3 by default), and a person (identified by
//! email or phone) may hold only one reservation per casting date. Many
//! clients book concurrently; the store is the single arbiter of both rules.
//!
//! ## Key Features
//!
//! - **Atomic Admission**: capacity and identity checks run in the same
//!   critical section as the write, so the last seat is granted exactly once
//! - **Change Feed**: every accepted mutation is broadcast per entity kind
//! - **Reconciling Observers**: each client keeps a projection converged by
//!   full resyncs, with optimistic placeholders for its own submissions
//! - **Cascading Lifecycle**: deleting a casting date removes its reservations
//!   in the same operation
//! - **Deterministic Export**: slot, then name ordering for reports
//! - **Journaled Storage**: in-memory or JSON-lines file journal, replayed on open
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use casting_scheduler::builders::build_scheduler;
//! use casting_scheduler::config::ScheduleConfig;
//! use casting_scheduler::core::BookingRequest;
//! use casting_scheduler::infra::TracingNotifier;
//! use casting_scheduler::runtime::TokioSpawner;
//!
//! let spawner = TokioSpawner::current()?;
//! let scheduler = build_scheduler(&ScheduleConfig::from_env()?, Arc::new(TracingNotifier), spawner.clone())?;
//! let date = scheduler.lifecycle.add_date(day, "Spring casting").await?;
//! let observer = scheduler.connect_observer(&spawner).await?;
//!
//! let request = BookingRequest::new(date.id, "10:00 - 10:30", "Alice", "a@x.com", "111");
//! let outcome = observer
//!     .submit_booking(&scheduler.admission, request, scheduler.config.request_timeout())
//!     .await;
//! ```
//!
//! For complete scenarios, see `tests/admission_test.rs` and
//! `tests/reconciler_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: model, admission rules, feed and projection.
pub mod core;
/// Configuration models for the store backend, capacity and timeouts.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Infrastructure adapters for journals, stores and notifiers.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
