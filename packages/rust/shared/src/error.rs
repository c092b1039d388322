//! Error types for arxivcode.
//!
//! Library crates use [`ArxivCodeError`] via `thiserror`.
//! The CLI binary wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all arxivcode operations.
#[derive(Debug, thiserror::Error)]
pub enum ArxivCodeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to a remote collaborator.
    #[error("network error: {0}")]
    Network(String),

    /// Feed response parsing error (OAI envelope, record fields).
    #[error("feed error: {message}")]
    Feed { message: String },

    /// Record store error (corrupt file, serialization failure).
    #[error("store error: {0}")]
    Store(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ArxivCodeError>;

impl ArxivCodeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a feed error from any displayable message.
    pub fn feed(msg: impl Into<String>) -> Self {
        Self::Feed {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ArxivCodeError::config("unknown run mode 'weekly_run'");
        assert_eq!(err.to_string(), "config error: unknown run mode 'weekly_run'");

        let err = ArxivCodeError::Store("daily.json is not a JSON object".into());
        assert!(err.to_string().contains("daily.json"));
    }
}
