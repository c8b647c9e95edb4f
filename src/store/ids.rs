use std::collections::HashSet;

use chrono::Utc;

use crate::entity::NoteId;

/// Hands out note ids from the wall clock, in milliseconds.
///
/// Every id is strictly greater than any id issued or observed before it, so
/// two notes created within the same millisecond still get distinct ids.
/// Once that sequence would pass `i64::MAX`, the smallest positive id not yet
/// seen is used instead.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: i64,
    seen: HashSet<NoteId>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an id that already exists so it is never issued again.
    pub fn observe(&mut self, id: NoteId) {
        self.last = self.last.max(id.0);
        self.seen.insert(id);
    }

    pub fn next_id(&mut self) -> NoteId {
        let id = match self.last.checked_add(1) {
            Some(next) => {
                self.last = Utc::now().timestamp_millis().max(next);
                NoteId(self.last)
            }
            None => self.lowest_unseen(),
        };
        self.seen.insert(id);
        id
    }

    fn lowest_unseen(&self) -> NoteId {
        (1..=i64::MAX)
            .map(NoteId)
            .find(|id| !self.seen.contains(id))
            .unwrap_or(NoteId(0))
    }
}
