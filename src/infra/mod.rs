//! Infrastructure adapters: journals, stores and notifiers.

pub mod journal;
pub mod notifier;
pub mod store;

pub use journal::{FileJournal, MemoryJournal};
pub use notifier::{InMemoryNotifier, TracingNotifier};
pub use store::{InMemoryScheduleStore, JournaledStore};
