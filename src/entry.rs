use serde::{Deserialize, Serialize};

/// Cached outcome of a canonical position.
///
/// The outcome is stored relative to the side to move so one entry serves
/// both the maximizing and the minimizing turn.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub(super) struct Entry {
    mover_wins: bool,
    hits: u32,
}

impl Entry {
    pub fn new(mover_wins: bool) -> Entry {
        Entry {
            mover_wins,
            hits: 0,
        }
    }

    pub fn mover_wins(&self) -> bool {
        self.mover_wins
    }

    pub fn record_hit(&mut self) {
        self.hits = self.hits.saturating_add(1);
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }
}
