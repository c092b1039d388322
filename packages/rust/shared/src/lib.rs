//! Shared types, error model, and configuration for arxivcode.
//!
//! This crate is the foundation depended on by all other arxivcode crates.
//! It provides:
//! - [`ArxivCodeError`] — the unified error type
//! - Domain types ([`PaperMeta`], [`CategorySpec`], [`DateEntries`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, FeedConfig, LookupConfig, OutputConfig, init_config, load_config,
    load_config_from,
};
pub use error::{ArxivCodeError, Result};
pub use types::{CategorySpec, DateEntries, PaperMeta};
