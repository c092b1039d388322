//! Application configuration for arxivcode.
//!
//! Config lives at `arxivcode.toml` in the working directory (the pipeline
//! runs from the repository it updates). A missing file means built-in
//! defaults: the standard category groups, `daily.json`, and `README.md`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArxivCodeError, Result};
use crate::types::CategorySpec;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "arxivcode.toml";

// ---------------------------------------------------------------------------
// Config structs (matching arxivcode.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Category groups and their sub-category filters.
    #[serde(default)]
    pub categories: CategorySpec,

    /// arXiv feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// paperswithcode lookup settings.
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Store and digest output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[feed]` section — the arXiv metadata collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// OAI-PMH endpoint base URL.
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_feed_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between category-group fetches, in milliseconds. Not a backoff;
    /// a courtesy delay toward the upstream service.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            timeout_secs: default_feed_timeout_secs(),
            pause_ms: default_pause_ms(),
        }
    }
}

fn default_feed_base_url() -> String {
    "https://export.arxiv.org/oai2".into()
}
fn default_feed_timeout_secs() -> u64 {
    30
}
fn default_pause_ms() -> u64 {
    2000
}

/// `[lookup]` section — the paperswithcode collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Papers API base URL; the paper id is appended as the final segment.
    #[serde(default = "default_lookup_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_lookup_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_lookup_base_url(),
            timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

fn default_lookup_base_url() -> String {
    "https://arxiv.paperswithcode.com/api/v0/papers/".into()
}
fn default_lookup_timeout_secs() -> u64 {
    10
}

/// `[output]` section — persisted store and rendered digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the date-keyed JSON record store.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Path of the rendered markdown digest.
    #[serde(default = "default_digest_path")]
    pub digest_path: PathBuf,

    /// How many recent dates the digest covers.
    #[serde(default = "default_digest_days")]
    pub digest_days: usize,

    /// How many calendar days a backfill run covers, ending today.
    #[serde(default = "default_backfill_days")]
    pub backfill_days: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            digest_path: default_digest_path(),
            digest_days: default_digest_days(),
            backfill_days: default_backfill_days(),
        }
    }
}

fn default_store_path() -> PathBuf {
    "daily.json".into()
}
fn default_digest_path() -> PathBuf {
    "README.md".into()
}
fn default_digest_days() -> usize {
    30
}
fn default_backfill_days() -> usize {
    365
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config from the working directory.
/// Returns defaults if `arxivcode.toml` does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ArxivCodeError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ArxivCodeError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file to the working directory.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ArxivCodeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ArxivCodeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
