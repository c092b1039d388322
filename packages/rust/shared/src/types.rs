//! Core domain types for the arxivcode pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Entries discovered for one calendar date: paper id → formatted code entry.
///
/// A `BTreeMap` keeps paper ids in stable order so the persisted store stays
/// human-diffable across runs.
pub type DateEntries = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// PaperMeta
// ---------------------------------------------------------------------------

/// Metadata for a single paper returned by the arXiv feed.
///
/// Transient: produced by the fetcher, consumed by the enricher, never
/// persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMeta {
    /// arXiv identifier (e.g., `2401.01234`), unique within a fetch.
    pub id: String,
    /// Paper title, whitespace-normalized.
    pub title: String,
    /// Abstract page URL (`https://arxiv.org/abs/{id}`).
    pub url: String,
}

// ---------------------------------------------------------------------------
// CategorySpec
// ---------------------------------------------------------------------------

/// Static mapping from category group (e.g., `cs`) to the sub-categories
/// used to scope every fetch. Loaded once, immutable for the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySpec(pub BTreeMap<String, Vec<String>>);

impl CategorySpec {
    /// Iterate configured groups with their sub-category filters.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(g, subs)| (g.as_str(), subs.as_slice()))
    }

    /// All sub-category identifiers, flattened in group order.
    pub fn sub_categories(&self) -> Vec<&str> {
        self.0
            .values()
            .flat_map(|subs| subs.iter().map(String::as_str))
            .collect()
    }
}

impl Default for CategorySpec {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(
            "cs".to_string(),
            vec![
                "cs.AI".to_string(),
                "cs.NI".to_string(),
                "cs.SY".to_string(),
                "cs.IT".to_string(),
            ],
        );
        map.insert("eess".to_string(), vec!["eess.SP".to_string()]);
        Self(map)
    }
}
