//! Deterministic ordering of reservations for reporting.
//!
//! Formatting (CSV, TXT, ...) belongs to external writers; this module only
//! guarantees that the same set of reservations always yields the same
//! sequence.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::model::{CastingDateId, Reservation};

/// Fields handed to an export writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Slot label.
    pub slot: String,
    /// Candidate name.
    pub name: String,
    /// Candidate email.
    pub email: String,
    /// Candidate phone.
    pub phone: String,
}

impl From<&Reservation> for ExportRecord {
    fn from(reservation: &Reservation) -> Self {
        Self {
            slot: reservation.slot.clone(),
            name: reservation.name.clone(),
            email: reservation.email.clone(),
            phone: reservation.phone.clone(),
        }
    }
}

/// Export order: slot label (chronological thanks to the zero-padded
/// format), then name. Email and phone break the remaining ties so the order
/// is total.
#[must_use]
pub fn export_order(a: &ExportRecord, b: &ExportRecord) -> Ordering {
    a.slot
        .cmp(&b.slot)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.email.cmp(&b.email))
        .then_with(|| a.phone.cmp(&b.phone))
}

/// Records of one casting date in export order.
pub fn sequence_for_export<'a>(
    reservations: impl IntoIterator<Item = &'a Reservation>,
    casting_date_id: CastingDateId,
) -> Vec<ExportRecord> {
    let mut records: Vec<ExportRecord> = reservations
        .into_iter()
        .filter(|r| r.casting_date_id == casting_date_id)
        .map(ExportRecord::from)
        .collect();
    records.sort_by(export_order);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReservationId;
    use chrono::Utc;

    fn reservation(date: CastingDateId, slot: &str, name: &str) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            slot: slot.into(),
            name: name.into(),
            email: format!("{name}@x.com"),
            phone: "000".into(),
            casting_date_id: date,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_orders_by_slot_then_name() {
        let date = CastingDateId::new();
        let input = vec![
            reservation(date, "14:00 - 14:30", "Bob"),
            reservation(date, "08:30 - 09:00", "Zoe"),
            reservation(date, "14:00 - 14:30", "Alice"),
            reservation(date, "08:30 - 09:00", "Adam"),
            reservation(CastingDateId::new(), "08:00 - 08:30", "Other"),
        ];
        let names: Vec<String> = sequence_for_export(&input, date)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Adam", "Zoe", "Alice", "Bob"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(sequence_for_export(&Vec::<Reservation>::new(), CastingDateId::new()).is_empty());
    }
}
