//! Notifier that only logs confirmations. Default when no mailer is wired in.

use async_trait::async_trait;

use crate::core::{BookingConfirmation, BookingNotifier, NotificationError};

/// Emits each confirmation as an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl BookingNotifier for TracingNotifier {
    async fn notify(&self, confirmation: BookingConfirmation) -> Result<(), NotificationError> {
        tracing::info!(
            email = %confirmation.email,
            slot = %confirmation.slot,
            casting_date = %confirmation.casting_date,
            casting_title = %confirmation.casting_title,
            "booking confirmation"
        );
        Ok(())
    }
}
