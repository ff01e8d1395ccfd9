//! In-memory journal backend.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::{Journal, JournalEntry, ScheduleError};

/// Journal kept in a vector. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Vec<JournalEntry>,
    fail_appends: Arc<AtomicBool>,
}

impl MemoryJournal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded so far.
    #[must_use]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Switch that makes every append fail while set. Used to simulate an
    /// unreachable backend.
    #[must_use]
    pub fn fail_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_appends)
    }
}

impl Journal for MemoryJournal {
    fn append(&mut self, entry: &JournalEntry) -> Result<(), ScheduleError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(ScheduleError::TransientStoreFailure(
                "journal unavailable".into(),
            ));
        }
        self.entries.push(entry.clone());
        Ok(())
    }

    fn replay(&self) -> Result<Vec<JournalEntry>, ScheduleError> {
        Ok(self.entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CastingDateId;

    #[test]
    fn test_fail_switch_blocks_appends() {
        let mut journal = MemoryJournal::new();
        let switch = journal.fail_switch();
        let entry = JournalEntry::CastingDateDeleted {
            id: CastingDateId::new(),
        };

        journal.append(&entry).unwrap();
        switch.store(true, Ordering::SeqCst);
        assert!(journal.append(&entry).unwrap_err().is_retryable());
        switch.store(false, Ordering::SeqCst);
        journal.append(&entry).unwrap();

        assert_eq!(journal.entries().len(), 2);
    }
}
