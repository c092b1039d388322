//! End-to-end run orchestration: fetch → enrich → merge → render.
//!
//! Strictly sequential: one date at a time, one category group at a time,
//! one lookup at a time. The only deliberate delay is the feed client's
//! inter-group pause; nothing is retried.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

use arxivcode_feed::ArxivClient;
use arxivcode_lookup::LookupClient;
use arxivcode_shared::{AppConfig, DateEntries, Result};
use arxivcode_store::RecordStore;

use crate::schedule::{RunMode, backfill_dates, yesterday};

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting run status to the user.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after one date has been fetched and enriched.
    fn date_done(&self, date: &str, current: usize, total: usize, with_code: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn date_done(&self, _date: &str, _current: usize, _total: usize, _with_code: usize) {}
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Outcome of a completed run, for the CLI's closing summary.
#[derive(Debug)]
pub struct RunSummary {
    /// Mode the run executed in.
    pub mode: RunMode,
    /// Dates fetched and enriched during this run.
    pub dates_processed: usize,
    /// Code entries found during this run (not the store total).
    pub entries_found: usize,
    /// Date keys in the store after saving.
    pub store_dates: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The assembled pipeline: config plus both remote collaborators.
pub struct Pipeline {
    config: AppConfig,
    feed: ArxivClient,
    lookup: LookupClient,
}

impl Pipeline {
    /// Build the pipeline from config, constructing both HTTP clients.
    pub fn new(config: AppConfig) -> Result<Self> {
        let feed = ArxivClient::new(&config.feed)?;
        let lookup = LookupClient::new(&config.lookup)?;
        Ok(Self {
            config,
            feed,
            lookup,
        })
    }

    /// Execute one full run in the given mode, then render the digest.
    ///
    /// The digest is rendered unconditionally at the end, even when the
    /// fetch step yielded nothing: the document always reflects the best
    /// currently-available store state.
    #[instrument(skip_all, fields(mode = %mode))]
    pub async fn run(&self, mode: RunMode, progress: &dyn ProgressReporter) -> Result<RunSummary> {
        let start = Instant::now();
        let today = Local::now().date_naive();

        let (store, dates_processed, entries_found) = match mode {
            RunMode::Backfill => self.run_backfill(today, progress).await?,
            RunMode::Daily => self.run_daily(today, progress).await?,
        };

        progress.phase("Rendering digest");
        let doc = arxivcode_digest::render(
            &store,
            &self.config.categories,
            self.config.output.digest_days,
        );
        arxivcode_digest::write(&self.config.output.digest_path, &doc)?;

        let summary = RunSummary {
            mode,
            dates_processed,
            entries_found,
            store_dates: store.len(),
            elapsed: start.elapsed(),
        };

        info!(
            mode = %summary.mode,
            dates_processed = summary.dates_processed,
            entries_found = summary.entries_found,
            store_dates = summary.store_dates,
            elapsed_ms = summary.elapsed.as_millis(),
            "run complete"
        );

        Ok(summary)
    }

    /// Backfill: fetch the whole window, accumulate in memory, and write the
    /// store in one full overwrite. Deliberately bypasses load/merge — this
    /// path establishes the store from scratch.
    async fn run_backfill(
        &self,
        today: NaiveDate,
        progress: &dyn ProgressReporter,
    ) -> Result<(RecordStore, usize, usize)> {
        let dates = backfill_dates(today, self.config.output.backfill_days);
        let total = dates.len();
        info!(days = total, "starting backfill run");

        let mut accumulated: BTreeMap<String, DateEntries> = BTreeMap::new();
        let mut entries_found = 0usize;

        for (i, date) in dates.iter().enumerate() {
            progress.phase(&format!("Fetching papers for {date}"));
            let entries = self.fetch_and_enrich(*date).await;
            entries_found += entries.len();
            progress.date_done(&date.to_string(), i + 1, total, entries.len());
            accumulated.insert(date.to_string(), entries);
        }

        let store: RecordStore = accumulated.into_iter().collect();
        arxivcode_store::save(&self.config.output.store_path, &store)?;

        Ok((store, total, entries_found))
    }

    /// Daily: fetch yesterday only and merge it into the existing store.
    /// A corrupt existing store aborts the run before anything is written.
    async fn run_daily(
        &self,
        today: NaiveDate,
        progress: &dyn ProgressReporter,
    ) -> Result<(RecordStore, usize, usize)> {
        let date = yesterday(today);
        info!(%date, "starting daily run");

        progress.phase(&format!("Fetching papers for {date}"));
        let entries = self.fetch_and_enrich(date).await;
        let entries_found = entries.len();
        progress.date_done(&date.to_string(), 1, 1, entries_found);

        let mut store = arxivcode_store::load(&self.config.output.store_path)?;
        let new_entries: BTreeMap<String, DateEntries> =
            [(date.to_string(), entries)].into_iter().collect();
        store.merge(new_entries);
        arxivcode_store::save(&self.config.output.store_path, &store)?;

        Ok((store, 1, entries_found))
    }

    /// Fetch one date across all groups, then look up code for each paper.
    /// Infallible by design: a bad day produces an empty entry set.
    async fn fetch_and_enrich(&self, date: NaiveDate) -> DateEntries {
        let papers = self.feed.fetch_day(date, &self.config.categories).await;
        if papers.is_empty() {
            return DateEntries::new();
        }
        self.lookup.enrich(&papers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arxivcode_shared::{FeedConfig, LookupConfig, OutputConfig};
    use wiremock::matchers::{method, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMPTY_DAY: &str =
        r#"<OAI-PMH><error code="noRecordsMatch">no items found</error></OAI-PMH>"#;

    fn test_config(server: &MockServer, dir: &std::path::Path, backfill_days: usize) -> AppConfig {
        AppConfig {
            categories: arxivcode_shared::CategorySpec::default(),
            feed: FeedConfig {
                base_url: format!("{}/oai2", server.uri()),
                timeout_secs: 5,
                pause_ms: 0,
            },
            lookup: LookupConfig {
                base_url: format!("{}/api/v0/papers", server.uri()),
                timeout_secs: 5,
            },
            output: OutputConfig {
                store_path: dir.join("daily.json"),
                digest_path: dir.join("README.md"),
                digest_days: 30,
                backfill_days,
            },
        }
    }

    async fn mount_empty_feed(server: &MockServer) {
        Mock::given(method("GET"))
            .and(wiremock::matchers::path("/oai2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_DAY))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn daily_run_merges_yesterday_and_renders_digest() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().expect("tempdir");

        // One paper yesterday, in every group response; lookup finds code.
        let feed_body = "<OAI-PMH><ListRecords><record><header>\
            <identifier>oai:arXiv.org:2408.00001</identifier></header>\
            <metadata><arXiv><id>2408.00001</id><title>Deep Packet Scheduling</title>\
            <categories>cs.AI</categories></arXiv></metadata></record>\
            </ListRecords></OAI-PMH>";
        Mock::given(method("GET"))
            .and(wiremock::matchers::path("/oai2"))
            .and(query_param("set", "cs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed_body))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::path("/oai2"))
            .and(query_param("set", "eess"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_DAY))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/v0/papers/.*$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "official": { "url": "https://github.com/acme/dps" },
            })))
            .mount(&server)
            .await;

        // Pre-existing store with an unrelated date that must survive.
        std::fs::write(
            dir.path().join("daily.json"),
            r#"{ "2025-01-01": { "old.paper": "[old](u)|[r](v)|" } }"#,
        )
        .expect("seed store");

        let config = test_config(&server, dir.path(), 365);
        let pipeline = Pipeline::new(config).expect("pipeline");
        let summary = pipeline.run(RunMode::Daily, &SilentProgress).await.expect("run");

        assert_eq!(summary.dates_processed, 1);
        assert_eq!(summary.entries_found, 1);
        assert_eq!(summary.store_dates, 2);

        let expected_date = yesterday(Local::now().date_naive()).to_string();
        let store = arxivcode_store::load(&dir.path().join("daily.json")).expect("load");
        assert!(store.get("2025-01-01").is_some());
        assert!(store.get(&expected_date).unwrap().contains_key("2408.00001"));

        let digest = std::fs::read_to_string(dir.path().join("README.md")).expect("digest");
        assert!(digest.contains("Deep Packet Scheduling"));
    }

    #[tokio::test]
    async fn daily_run_aborts_on_corrupt_store_before_writing() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        mount_empty_feed(&server).await;

        let store_path = dir.path().join("daily.json");
        std::fs::write(&store_path, "{ definitely not json").expect("seed corrupt store");

        let config = test_config(&server, dir.path(), 365);
        let pipeline = Pipeline::new(config).expect("pipeline");
        let err = pipeline.run(RunMode::Daily, &SilentProgress).await.unwrap_err();

        assert!(err.to_string().contains("corrupt store"));
        // The corrupt file is left exactly as it was; no digest was written.
        assert_eq!(
            std::fs::read_to_string(&store_path).expect("read"),
            "{ definitely not json"
        );
        assert!(!dir.path().join("README.md").exists());
    }

    #[tokio::test]
    async fn unrecognized_mode_fails_before_touching_store() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().expect("tempdir");

        let store_path = dir.path().join("daily.json");
        let seeded = r#"{ "2025-01-01": { "old.paper": "[old](u)|[r](v)|" } }"#;
        std::fs::write(&store_path, seeded).expect("seed store");

        let config = test_config(&server, dir.path(), 365);

        // Mirrors the CLI dispatch: the mode string is validated before the
        // pipeline is even constructed, so a bad mode can run nothing.
        let result = async {
            let mode = "weekly_run".parse::<RunMode>()?;
            Pipeline::new(config)?.run(mode, &SilentProgress).await
        }
        .await;

        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(&store_path).expect("read"),
            seeded,
            "store must be byte-for-byte unchanged"
        );
        assert!(!dir.path().join("README.md").exists());
    }

    #[tokio::test]
    async fn backfill_overwrites_store_with_full_window() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().expect("tempdir");
        mount_empty_feed(&server).await;

        // A pre-existing store is ignored and fully replaced by backfill.
        std::fs::write(
            dir.path().join("daily.json"),
            r#"{ "2020-05-05": { "stale": "[s](u)|[r](v)|" } }"#,
        )
        .expect("seed store");

        let config = test_config(&server, dir.path(), 3);
        let pipeline = Pipeline::new(config).expect("pipeline");
        let summary = pipeline
            .run(RunMode::Backfill, &SilentProgress)
            .await
            .expect("run");

        assert_eq!(summary.dates_processed, 3);
        assert_eq!(summary.store_dates, 3);

        let store = arxivcode_store::load(&dir.path().join("daily.json")).expect("load");
        assert_eq!(store.len(), 3);
        assert!(store.get("2020-05-05").is_none());

        // Empty days still render a digest with the placeholder row.
        let digest = std::fs::read_to_string(dir.path().join("README.md")).expect("digest");
        assert!(digest.contains("No new papers with code"));
    }
}
