//! In-memory notifier for development and tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{BookingConfirmation, BookingNotifier, NotificationError};

/// Records every confirmation it is asked to deliver.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    delivered: Mutex<Vec<BookingConfirmation>>,
    failing: AtomicBool,
}

impl InMemoryNotifier {
    /// Create a notifier that accepts every confirmation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a notifier whose deliveries always fail.
    #[must_use]
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    /// Toggle delivery failures.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Confirmations delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<BookingConfirmation> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl BookingNotifier for InMemoryNotifier {
    async fn notify(&self, confirmation: BookingConfirmation) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::DeliveryFailed(format!(
                "mail relay refused {}",
                confirmation.email
            )));
        }
        self.delivered.lock().push(confirmation);
        Ok(())
    }
}
