//! Tests for export sequencing

use casting_scheduler::core::{
    sequence_for_export, slot_catalog, CastingDateId, Reservation, ReservationId,
};
use chrono::Utc;
use rand::seq::SliceRandom;

fn reservation(date: CastingDateId, slot: &str, name: &str, email: &str) -> Reservation {
    Reservation {
        id: ReservationId::new(),
        slot: slot.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: "0".to_string(),
        casting_date_id: date,
        created_at: Utc::now(),
    }
}

#[test]
fn test_export_order_independent_of_input_order() {
    let date = CastingDateId::new();
    let slots = slot_catalog();
    let mut input: Vec<Reservation> = Vec::new();
    for (i, slot) in slots.iter().enumerate().step_by(3) {
        for name in ["Noah", "Ava", "Liam"] {
            input.push(reservation(date, slot, name, &format!("{name}{i}@x.com")));
        }
    }
    input.push(reservation(date, &slots[0], "Ava", "ava-second@x.com"));

    let expected = sequence_for_export(&input, date);
    let mut rng = rand::rng();
    for _ in 0..10 {
        input.shuffle(&mut rng);
        assert_eq!(sequence_for_export(&input, date), expected);
    }

    assert_eq!(expected[0].name, "Ava");
    assert_eq!(expected[0].email, "Ava0@x.com");
    assert_eq!(expected[1].email, "ava-second@x.com");
    assert!(expected.windows(2).all(|w| w[0].slot <= w[1].slot));
}

#[test]
fn test_export_is_idempotent() {
    let date = CastingDateId::new();
    let input = vec![
        reservation(date, "09:00 - 09:30", "B", "b@x.com"),
        reservation(date, "08:00 - 08:30", "A", "a@x.com"),
    ];
    let once = sequence_for_export(&input, date);
    let rebuilt: Vec<Reservation> = once
        .iter()
        .map(|r| reservation(date, &r.slot, &r.name, &r.email))
        .collect();
    assert_eq!(sequence_for_export(&rebuilt, date), once);
}
