//! In-process inspection history.
//!
//! Append-only record of completed capture cycles, newest last. The history
//! lives for the lifetime of the daemon process: no capacity bound, no
//! deduplication, no persistence across restarts. Failed cycles never
//! append.

use crate::classify::Verdict;

/// One completed capture cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Wall-clock time of the run, formatted `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub verdict: Verdict,
}

/// Append-only session history.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed cycle. Called exactly once per successful run.
    pub fn append(&mut self, timestamp: String, verdict: Verdict) {
        self.entries.push(HistoryEntry { timestamp, verdict });
    }

    /// Entries in insertion order (oldest first).
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
