//! Append-only log of completed rolls. Newest entry last.

use serde::{Deserialize, Serialize};

/// One creature's line in a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledCreature {
    pub name: String,
    pub initiative: i32,
}

/// Snapshot of the turn order produced by one roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Completion time in milliseconds since the Unix epoch. Unique within a
    /// log; doubles as the display key.
    pub timestamp: u64,
    pub order: Vec<RolledCreature>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. A timestamp that does not move past the previous
    /// entry is bumped to `previous + 1` so keys stay unique and ordered.
    pub fn append(&mut self, mut entry: HistoryEntry) {
        if let Some(last) = self.entries.last() {
            if entry.timestamp <= last.timestamp {
                entry.timestamp = last.timestamp.saturating_add(1);
            }
        }
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }
}
