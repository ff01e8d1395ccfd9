//! Runtime adapters and API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{
    submit_booking, ApiError, BookingResponse, BookingStatus, BookingSubmission, Health, Session,
    SlotAvailability,
};
pub use tokio_spawner::TokioSpawner;
