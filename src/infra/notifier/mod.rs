//! Confirmation notifier adapters.

pub mod log;
pub mod memory;

pub use self::log::TracingNotifier;
pub use self::memory::InMemoryNotifier;
