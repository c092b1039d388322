//! Markdown digest rendering from the record store.
//!
//! Reads the store wholesale, selects the N most recent date keys, and emits
//! the full `README.md` document: fixed header, configured category list,
//! and one table row per code entry. The output file is regenerated in full
//! on every run.

use std::path::Path;

use tracing::{info, instrument};

use arxivcode_shared::{ArxivCodeError, CategorySpec, Result};
use arxivcode_store::RecordStore;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the digest document for the `days` most recent dates in the store.
///
/// Dates with an empty entry set contribute no rows but still consume a slot
/// in the window. If the whole window yields no rows, a single placeholder
/// row is emitted instead.
#[instrument(skip_all, fields(dates = store.len(), days))]
pub fn render(store: &RecordStore, categories: &CategorySpec, days: usize) -> String {
    let mut doc = String::new();

    doc.push_str("# Daily ArXiv Papers with Code\n\n");
    doc.push_str(&format!(
        "A curated list of arXiv papers with open-source implementations, \
         focusing on the following categories: **{}**. Updated daily.\n\n",
        categories.sub_categories().join(", ")
    ));

    doc.push_str(&format!("## Latest Updates (Last {days} Days)\n"));
    doc.push_str("| Date | Paper Title | Code Repository |\n");
    doc.push_str("|---|---|---|\n");

    let mut rows = 0usize;
    for date in store.dates_desc().take(days) {
        let Some(entries) = store.get(date) else {
            continue;
        };
        for entry in entries.values() {
            doc.push_str(&format!("| {date} | {entry}\n"));
            rows += 1;
        }
    }

    if rows == 0 {
        doc.push_str(&format!(
            "| | No new papers with code found in the last {days} days. | |\n"
        ));
    }

    info!(rows, "digest rendered");
    doc
}

/// Write the digest, fully overwriting any previous document.
pub fn write(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| ArxivCodeError::io(path, e))?;
    info!(?path, bytes = content.len(), "digest written");
    Ok(())
}
