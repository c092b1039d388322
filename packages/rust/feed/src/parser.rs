//! OAI-PMH `ListRecords` response parsing.
//!
//! The arXiv bulk-metadata interface returns an XML envelope; we lean on
//! `scraper`'s lenient parser and CSS selectors rather than a strict XML
//! stack, since we only need three fields per record.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use arxivcode_shared::{ArxivCodeError, Result};

static RECORD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("record").unwrap());
static ID: LazyLock<Selector> = LazyLock::new(|| Selector::parse("metadata id").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("metadata title").unwrap());
static CATEGORIES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("metadata categories").unwrap());
static ERROR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("error").unwrap());

/// One raw record from a `ListRecords` response, before category filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRecord {
    /// arXiv identifier from the record metadata.
    pub id: String,
    /// Title, whitespace-normalized.
    pub title: String,
    /// Space-separated category list, split into tokens.
    pub categories: Vec<String>,
}

impl FeedRecord {
    /// Whether this record carries at least one of the wanted sub-categories.
    pub fn matches(&self, sub_cats: &[String]) -> bool {
        self.categories
            .iter()
            .any(|c| sub_cats.iter().any(|want| want.eq_ignore_ascii_case(c)))
    }
}

/// Parse the records out of an OAI-PMH `ListRecords` response body.
///
/// An `<error code="noRecordsMatch">` envelope is a normal empty day and
/// yields `Ok(vec![])`; any other OAI error code is an `Err` for this group.
/// Records missing an id or title (e.g., deletion stubs) are skipped.
pub fn parse_list_records(body: &str) -> Result<Vec<FeedRecord>> {
    let doc = Html::parse_document(body);

    if let Some(err) = doc.select(&ERROR).next() {
        let code = err.value().attr("code").unwrap_or("unknown");
        if code == "noRecordsMatch" {
            return Ok(Vec::new());
        }
        let detail = collect_text(&err);
        return Err(ArxivCodeError::feed(format!("OAI error {code}: {detail}")));
    }

    let mut records = Vec::new();
    for record in doc.select(&RECORD) {
        let Some(id) = record.select(&ID).next().map(|el| collect_text(&el)) else {
            continue;
        };
        let Some(title) = record.select(&TITLE).next().map(|el| collect_text(&el)) else {
            continue;
        };
        if id.is_empty() || title.is_empty() {
            continue;
        }

        let categories = record
            .select(&CATEGORIES)
            .next()
            .map(|el| collect_text(&el))
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        records.push(FeedRecord {
            id,
            title,
            categories,
        });
    }

    Ok(records)
}

/// Concatenate an element's text nodes with normalized whitespace.
fn collect_text(el: &scraper::ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_RECORDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <responseDate>2026-08-29T00:00:00Z</responseDate>
  <ListRecords>
    <record>
      <header>
        <identifier>oai:arXiv.org:2401.01234</identifier>
        <datestamp>2026-08-28</datestamp>
        <setSpec>cs</setSpec>
      </header>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">
          <id>2401.01234</id>
          <created>2026-08-28</created>
          <title>Deep   Packet
            Scheduling</title>
          <categories>cs.NI cs.AI</categories>
        </arXiv>
      </metadata>
    </record>
    <record>
      <header>
        <identifier>oai:arXiv.org:2401.05678</identifier>
      </header>
      <metadata>
        <arXiv xmlns="http://arxiv.org/OAI/arXiv/">
          <id>2401.05678</id>
          <title>Implicit Neural Codecs</title>
          <categories>cs.CV</categories>
        </arXiv>
      </metadata>
    </record>
  </ListRecords>
</OAI-PMH>"#;

    #[test]
    fn parses_records_and_normalizes_titles() {
        let records = parse_list_records(LIST_RECORDS).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "2401.01234");
        assert_eq!(records[0].title, "Deep Packet Scheduling");
        assert_eq!(records[0].categories, vec!["cs.NI", "cs.AI"]);
        assert_eq!(records[1].id, "2401.05678");
    }

    #[test]
    fn category_matching_is_case_insensitive() {
        let records = parse_list_records(LIST_RECORDS).expect("parse");
        let wanted = vec!["CS.ai".to_string()];
        assert!(records[0].matches(&wanted));
        assert!(!records[1].matches(&wanted));
    }

    #[test]
    fn no_records_match_is_an_empty_day() {
        let body = r#"<?xml version="1.0"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
  <error code="noRecordsMatch">no items found</error>
</OAI-PMH>"#;
        let records = parse_list_records(body).expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn other_oai_errors_propagate() {
        let body = r#"<OAI-PMH><error code="badArgument">from is invalid</error></OAI-PMH>"#;
        let err = parse_list_records(body).unwrap_err();
        assert!(err.to_string().contains("badArgument"));
    }

    #[test]
    fn records_without_metadata_are_skipped() {
        let body = r#"<OAI-PMH><ListRecords>
  <record><header status="deleted"><identifier>oai:arXiv.org:gone</identifier></header></record>
</ListRecords></OAI-PMH>"#;
        let records = parse_list_records(body).expect("parse");
        assert!(records.is_empty());
    }
}
