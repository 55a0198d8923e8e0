//! Client-side cache of saved analyses
//!
//! Mirrors the server's list, never the other way around: loads replace the
//! whole list, deletions remove an entry only after the server confirmed.
//! A failed load keeps the previous entries visible behind the error banner.

use visage_common::api::HistoryEntry;

/// Cached history of saved analyses
#[derive(Debug, Clone, Default)]
pub struct HistoryList {
    /// Entries as of the last successful load
    pub entries: Vec<HistoryEntry>,
    /// Whether a load is in flight
    pub loading: bool,
    /// Error banner from the last failed load or delete
    pub error: Option<String>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a load as started, keeping the current entries visible
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Replace the list wholesale after a successful load
    pub fn apply_loaded(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries;
        self.loading = false;
        self.error = None;
    }

    /// Record a failed load, leaving the previous entries untouched
    pub fn apply_load_failure(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Remove one entry after the server confirmed its deletion
    ///
    /// Returns whether an entry with that id was present.
    pub fn remove_entry(&mut self, analysis_id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != analysis_id);
        self.entries.len() != before
    }

    /// Whether an entry with this id is cached
    pub fn contains(&self, analysis_id: i64) -> bool {
        self.entries.iter().any(|entry| entry.id == analysis_id)
    }
}
