//! Spin history log
//!
//! Newest first, bounded to the most recent `MAX_HISTORY_ENTRIES` spins.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HISTORY_ENTRIES;
use crate::sim::Segment;

/// A single completed spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Monotonic id (never reused within a log)
    pub id: u64,
    pub prize_name: String,
    pub prize_color: String,
    /// Unix timestamp (ms) when the spin finished
    pub timestamp: f64,
}

/// Append-only record of completed spins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpinHistoryLog {
    entries: Vec<HistoryEntry>,
}

impl SpinHistoryLog {
    /// Create empty log
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Prepend an entry; the oldest entries beyond the cap are dropped
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_ENTRIES);
    }

    /// Record the winner of a finished spin under the next free id
    pub fn record_spin(&mut self, segment: &Segment, timestamp: f64) -> HistoryEntry {
        let entry = HistoryEntry {
            id: self.next_id(),
            prize_name: segment.name.clone(),
            prize_color: segment.color.clone(),
            timestamp,
        };
        self.record(entry.clone());
        entry
    }

    /// All entries, newest first
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The `n` most recent entries
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry (if any)
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    /// Id for the next entry
    pub fn next_id(&self) -> u64 {
        self.entries.iter().map(|e| e.id).max().map_or(1, |id| id + 1)
    }

    /// Enforce the cap on logs read from storage
    pub(crate) fn enforce_bound(&mut self) {
        if self.entries.len() > MAX_HISTORY_ENTRIES {
            log::warn!(
                "Stored history had {} entries, keeping newest {}",
                self.entries.len(),
                MAX_HISTORY_ENTRIES
            );
            self.entries.truncate(MAX_HISTORY_ENTRIES);
        }
    }
}
