//! Persisted date-keyed record store (`daily.json`).
//!
//! The store is a single JSON object mapping `YYYY-MM-DD` date strings to
//! that date's entry set (paper id → formatted code entry). It is grown by
//! the pipeline's fetch step, read wholesale by the digest renderer, and
//! never pruned. `BTreeMap` keeps both levels sorted so every save is
//! human-diffable.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use arxivcode_shared::{ArxivCodeError, DateEntries, Result};

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// The accumulated fetch history: date string → entry set for that date.
///
/// A date key mapping to an empty set is meaningful — the date was processed
/// and no code was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    entries: BTreeMap<String, DateEntries>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of date keys in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no date keys at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry set for one date, if that date was ever processed.
    pub fn get(&self, date: &str) -> Option<&DateEntries> {
        self.entries.get(date)
    }

    /// Record one date's entry set, replacing any previous set for that date.
    pub fn insert(&mut self, date: String, entries: DateEntries) {
        self.entries.insert(date, entries);
    }

    /// Date keys in descending (most recent first) order. Lexicographic
    /// order is chronological for `YYYY-MM-DD` keys.
    pub fn dates_desc(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().rev().map(String::as_str)
    }

    /// Merge new per-date results into the store.
    ///
    /// Each date key present in `new_entries` fully replaces that date's
    /// existing set (last write wins at date granularity, no merging of
    /// individual entries); all other dates are untouched.
    pub fn merge(&mut self, new_entries: BTreeMap<String, DateEntries>) {
        for (date, entries) in new_entries {
            self.entries.insert(date, entries);
        }
    }
}

impl FromIterator<(String, DateEntries)> for RecordStore {
    fn from_iter<I: IntoIterator<Item = (String, DateEntries)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load the store from disk.
///
/// A missing or empty file is a fresh start and yields an empty store. A
/// file that exists but does not parse is fatal: silently discarding the
/// accumulated history would be worse than stopping the run.
pub fn load(path: &Path) -> Result<RecordStore> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "store file not found, starting empty");
            return Ok(RecordStore::new());
        }
        Err(e) => return Err(ArxivCodeError::io(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(RecordStore::new());
    }

    let store: RecordStore = serde_json::from_str(&content)
        .map_err(|e| ArxivCodeError::Store(format!("corrupt store at {}: {e}", path.display())))?;

    debug!(?path, dates = store.len(), "store loaded");
    Ok(store)
}

/// Save the store, fully overwriting the target file.
///
/// Writes pretty-printed JSON to a temp file in the same directory and
/// renames it over the target, so a failed run cannot leave a truncated
/// store behind.
pub fn save(path: &Path, store: &RecordStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store)
        .map_err(|e| ArxivCodeError::Store(format!("serialize store: {e}")))?;

    // The temp file must live on the same filesystem as the target for the
    // rename to stay atomic, so it goes in the target's directory.
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| ArxivCodeError::io(parent, e))?;
    std::fs::write(tmp.path(), &json).map_err(|e| ArxivCodeError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| ArxivCodeError::io(path, e.error))?;

    info!(?path, dates = store.len(), "store saved");
    Ok(())
}
