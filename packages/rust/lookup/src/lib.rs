//! Code-repository lookup against the paperswithcode papers API.
//!
//! For each fetched paper, issues one GET keyed by paper id and classifies
//! the outcome explicitly: most papers have no code, so a failed or empty
//! lookup is the quiet common case, while a 2xx response we cannot decode
//! is worth a warning.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use arxivcode_shared::{ArxivCodeError, DateEntries, LookupConfig, PaperMeta, Result};

/// User-Agent string for lookup requests.
const USER_AGENT: &str = concat!("arxivcode/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// LookupOutcome
// ---------------------------------------------------------------------------

/// Outcome of a single code lookup, kept explicit so callers (and tests)
/// can tell absence, transport trouble, and malformed responses apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The service reports an official repository for this paper.
    Found {
        /// Repository URL from the `official.url` field.
        repo_url: String,
    },
    /// No code known: 404, transport error, or a body without `official.url`.
    NotFound,
    /// A 2xx response whose body could not be decoded as JSON.
    Malformed {
        /// Decode failure detail, for the warning log.
        reason: String,
    },
}

/// Shape of the papers API response; everything beyond `official.url`
/// is ignored.
#[derive(Debug, Deserialize)]
struct PapersResponse {
    #[serde(default)]
    official: Option<OfficialRepo>,
}

#[derive(Debug, Deserialize)]
struct OfficialRepo {
    #[serde(default)]
    url: Option<String>,
}

// ---------------------------------------------------------------------------
// LookupClient
// ---------------------------------------------------------------------------

/// Client for the paperswithcode papers API.
pub struct LookupClient {
    client: Client,
    base_url: String,
}

impl LookupClient {
    /// Create a new lookup client from config.
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ArxivCodeError::Network(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    /// Look up the official repository for one paper id.
    ///
    /// Never returns `Err`: transport failures and non-2xx statuses collapse
    /// into [`LookupOutcome::NotFound`], since absence of code is the
    /// expected common case and retrying is out of scope.
    pub async fn lookup(&self, paper_id: &str) -> LookupOutcome {
        let url = format!("{}{paper_id}", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(paper_id, error = %e, "lookup request failed");
                return LookupOutcome::NotFound;
            }
        };

        if !response.status().is_success() {
            return LookupOutcome::NotFound;
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                debug!(paper_id, error = %e, "lookup body read failed");
                return LookupOutcome::NotFound;
            }
        };

        let parsed: PapersResponse = match serde_json::from_str(&body) {
            Ok(p) => p,
            Err(e) => {
                return LookupOutcome::Malformed {
                    reason: e.to_string(),
                };
            }
        };

        match parsed.official.and_then(|o| o.url) {
            Some(repo_url) if !repo_url.is_empty() => LookupOutcome::Found { repo_url },
            _ => LookupOutcome::NotFound,
        }
    }

    /// Enrich a day's papers, keeping only those with an official repository.
    ///
    /// Returns the formatted entry set for the date; papers without code are
    /// skipped silently, malformed responses are logged once and skipped.
    #[instrument(skip_all, fields(papers = papers.len()))]
    pub async fn enrich(&self, papers: &HashMap<String, PaperMeta>) -> DateEntries {
        let mut entries = DateEntries::new();

        for (paper_id, paper) in papers {
            match self.lookup(paper_id).await {
                LookupOutcome::Found { repo_url } => {
                    entries.insert(paper_id.clone(), format_entry(paper, &repo_url));
                }
                LookupOutcome::NotFound => {}
                LookupOutcome::Malformed { reason } => {
                    warn!(paper_id, reason, "could not decode lookup response, skipping");
                }
            }
        }

        info!(found = entries.len(), "enrichment complete");
        entries
    }
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

/// Format one persisted code entry as a markdown-table-row fragment:
/// `[title](paper_url)|[repo_name](repo_url)|`.
pub fn format_entry(paper: &PaperMeta, repo_url: &str) -> String {
    let repo_name = repo_name_from_url(repo_url);
    format!("[{}]({})|[{repo_name}]({repo_url})|", paper.title, paper.url)
}

/// Derive a repository name from the final path segment of its URL.
fn repo_name_from_url(repo_url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(repo_url) {
        if let Some(segments) = parsed.path_segments() {
            if let Some(last) = segments.filter(|s| !s.is_empty()).next_back() {
                return last.to_string();
            }
        }
    }
    // Not an absolute URL; fall back to splitting on '/'.
    repo_url
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(repo_url)
        .to_string()
}
