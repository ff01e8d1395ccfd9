//! Core scheduling abstractions: domain model, admission rules and the
//! client-side consistency machinery.

pub mod admission;
pub mod change_feed;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod model;
pub mod notifier;
pub mod projection;
pub mod reconciler;
pub mod schedule_store;
pub mod slots;
pub mod spawn;
pub mod state;

pub use admission::AdmissionController;
pub use change_feed::{ChangeEvent, ChangeFeed, ChangeOp, ChangeSubscription, EntityKind};
pub use error::{AppResult, IdentityField, NotificationError, ScheduleError};
pub use export::{export_order, sequence_for_export, ExportRecord};
pub use lifecycle::{DateLifecycleManager, DateRemoval};
pub use model::{
    normalize_email, normalize_phone, BookingRequest, CastingDate, CastingDateId, Reservation,
    ReservationId, ReservationUpdate,
};
pub use notifier::{BookingConfirmation, BookingNotifier};
pub use projection::{LocalProjection, Placeholder, PlaceholderId, PlaceholderState, SlotOccupancy};
pub use reconciler::{Observer, SubmissionOutcome};
pub use schedule_store::{Journal, JournalEntry, ScheduleStore, Snapshot};
pub use slots::{is_catalog_slot, slot_catalog, slot_index, SLOT_COUNT};
pub use spawn::Spawn;
pub use state::{AppliedChange, Candidate, ScheduleState};
