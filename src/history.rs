//! Per-user translation history.
//!
//! A bounded most-recently-used list of translations the user picked, kept so
//! they can be shown again without querying the service. The list itself is
//! owned by the user's session; [`HistoryStore`] is a pure transformation over
//! it.

use crate::translation::TranslationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_TRANSLATION_HISTORY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub translation: TranslationResult,
    /// When the translation was last produced or selected
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(translation: TranslationResult) -> Self {
        Self {
            translation,
            recorded_at: Utc::now(),
        }
    }

    /// Case-insensitive identity of an entry: `(source text, translated text)`
    fn matches(&self, other: &TranslationResult) -> bool {
        same_text(&self.translation.source_text, &other.source_text)
            && same_text(&self.translation.translated_text, &other.translated_text)
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a == b || a.to_uppercase() == b.to_uppercase()
}

#[derive(Debug, Clone, Copy)]
pub struct HistoryStore {
    max_entries: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(MAX_TRANSLATION_HISTORY)
    }
}

impl HistoryStore {
    /// `max_entries` of zero is raised to one so the latest entry is always kept.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Record `result` as the most recent entry of `history` and return the
    /// updated list, newest first.
    ///
    /// An existing entry with the same source and translated text (ignoring
    /// case) is moved to the front instead of duplicated; beyond the bound the
    /// oldest entries are dropped.
    pub fn record_and_get(
        &self,
        mut history: Vec<HistoryEntry>,
        result: TranslationResult,
    ) -> Vec<HistoryEntry> {
        // Every variant goes, so a restored history with duplicates is repaired
        history.retain(|entry| !entry.matches(&result));

        history.insert(0, HistoryEntry::new(result));
        history.truncate(self.max_entries);
        history
    }

    /// The history as stored, newest first.
    pub fn list_recent(history: &[HistoryEntry]) -> &[HistoryEntry] {
        history
    }
}
