//! arXiv metadata fetching for the daily pipeline.
//!
//! For a given date, queries the arXiv OAI-PMH interface once per configured
//! category group and collapses the results into a single id-keyed map.
//! One group failing (network error, malformed envelope) never aborts the
//! others: partial results are expected and acceptable at this layer.

mod parser;

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use arxivcode_shared::{ArxivCodeError, CategorySpec, FeedConfig, PaperMeta, Result};

pub use parser::{FeedRecord, parse_list_records};

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("arxivcode/", env!("CARGO_PKG_VERSION"));

/// Abstract-page URL prefix used to build paper links from ids.
const ABS_URL_PREFIX: &str = "https://arxiv.org/abs/";

// ---------------------------------------------------------------------------
// ArxivClient
// ---------------------------------------------------------------------------

/// Client for the arXiv bulk-metadata interface.
pub struct ArxivClient {
    client: Client,
    base_url: String,
    pause: Duration,
}

impl ArxivClient {
    /// Create a new feed client from config.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ArxivCodeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            pause: Duration::from_millis(config.pause_ms),
        })
    }

    /// Fetch one category group for one date.
    ///
    /// Returns every record published on `date` in `group` whose category
    /// list intersects `sub_cats`. A non-2xx response or an unparseable
    /// envelope is an `Err` scoped to this group.
    #[instrument(skip_all, fields(group = %group, date = %date))]
    pub async fn fetch_group(
        &self,
        group: &str,
        date: NaiveDate,
        sub_cats: &[String],
    ) -> Result<Vec<PaperMeta>> {
        let date_str = date.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("verb", "ListRecords"),
                ("metadataPrefix", "arXiv"),
                ("set", group),
                ("from", date_str.as_str()),
                ("until", date_str.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ArxivCodeError::Network(format!("{group}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArxivCodeError::Network(format!("{group}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ArxivCodeError::Network(format!("{group}: failed to read body: {e}")))?;

        let records = parse_list_records(&body)?;
        let total = records.len();

        let papers: Vec<PaperMeta> = records
            .into_iter()
            .filter(|r| r.matches(sub_cats))
            .map(|r| PaperMeta {
                url: format!("{ABS_URL_PREFIX}{}", r.id),
                id: r.id,
                title: r.title,
            })
            .collect();

        debug!(total, matched = papers.len(), "group fetch parsed");
        Ok(papers)
    }

    /// Fetch every configured group for one date, deduplicated by paper id
    /// (first-seen wins).
    ///
    /// Per-group failures are logged and swallowed; if every group fails the
    /// result is simply empty. Callers cannot distinguish "no papers" from
    /// "fetch partially failed", by design. A fixed pause separates group
    /// fetches out of courtesy to the upstream service.
    #[instrument(skip_all, fields(date = %date))]
    pub async fn fetch_day(
        &self,
        date: NaiveDate,
        categories: &CategorySpec,
    ) -> HashMap<String, PaperMeta> {
        let mut papers: HashMap<String, PaperMeta> = HashMap::new();
        let mut first = true;

        for (group, sub_cats) in categories.groups() {
            if !first {
                tokio::time::sleep(self.pause).await;
            }
            first = false;

            match self.fetch_group(group, date, sub_cats).await {
                Ok(found) => {
                    for paper in found {
                        papers.entry(paper.id.clone()).or_insert(paper);
                    }
                }
                Err(e) => {
                    warn!(group, %date, error = %e, "group fetch failed, continuing");
                }
            }
        }

        info!(%date, papers = papers.len(), "day fetch complete");
        papers
    }
}
