//! The fixed half-hour interview grid.
//!
//! Every observer derives the same catalog locally; it is never fetched from
//! the store and is not configurable.

use std::sync::LazyLock;

/// First bookable hour of the day.
pub const DAY_START_HOUR: u32 = 8;
/// Hour at which the last slot ends (exclusive bound for slot starts).
pub const DAY_END_HOUR: u32 = 20;
/// Length of one slot in minutes.
pub const SLOT_MINUTES: u32 = 30;
/// Number of slots in one day.
pub const SLOT_COUNT: usize = ((DAY_END_HOUR - DAY_START_HOUR) * 60 / SLOT_MINUTES) as usize;

static SLOT_CATALOG: LazyLock<Vec<String>> = LazyLock::new(|| {
    (0..SLOT_COUNT)
        .map(|index| {
            let minutes = u32::try_from(index).unwrap_or(u32::MAX) * SLOT_MINUTES;
            let start = DAY_START_HOUR * 60 + minutes;
            format_slot(start, start + SLOT_MINUTES)
        })
        .collect()
});

fn format_slot(start: u32, end: u32) -> String {
    format!(
        "{:02}:{:02} - {:02}:{:02}",
        start / 60,
        start % 60,
        end / 60,
        end % 60
    )
}

/// Ordered slot labels, `"08:00 - 08:30"` through `"19:30 - 20:00"`.
#[must_use]
pub fn slot_catalog() -> &'static [String] {
    &SLOT_CATALOG
}

/// Whether `label` is one of the catalog's slots.
#[must_use]
pub fn is_catalog_slot(label: &str) -> bool {
    slot_index(label).is_some()
}

/// Position of `label` in the catalog.
#[must_use]
pub fn slot_index(label: &str) -> Option<usize> {
    SLOT_CATALOG.iter().position(|slot| slot == label)
}
