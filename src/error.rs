//! Error types for ipfs-batch-dl
//!
//! This module provides error handling for the library, including:
//! - A top-level [`Error`] covering configuration, I/O, and pipeline failures
//! - A per-fetch [`FetchError`] classifying individual retrieval outcomes
//! - A `Result` alias used throughout the crate

use thiserror::Error;

/// Result type alias for ipfs-batch-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ipfs-batch-dl
///
/// This is the primary error type surfaced by the library facade. Row-level
/// retrieval failures are *not* represented here — those are accounted for
/// inside a [`crate::types::BatchSession`] as failure counts and log lines.
/// `Error` covers the conditions that prevent a run from being set up or
/// that the caller must handle directly (unreadable manifest, bad config).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "gateway_base")
        key: Option<String>,
    },

    /// CSV manifest could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or transport error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Archive write error
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Classification of a single gateway fetch attempt
///
/// Exactly one of these is produced per failed retrieval. None of them is
/// retried automatically; a failed fetch is wholly discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Gateway responded with a non-200 status
    #[error("HTTP {status}")]
    Http {
        /// The HTTP status code returned by the gateway
        status: u16,
    },

    /// Wall-clock timeout elapsed before the response completed
    #[error("timed out")]
    Timeout,

    /// Transport-level failure (DNS, connect, TLS, truncated body, ...)
    #[error("network failure: {0}")]
    Network(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display() {
        assert_eq!(FetchError::Http { status: 404 }.to_string(), "HTTP 404");
        assert_eq!(FetchError::Timeout.to_string(), "timed out");
        assert_eq!(
            FetchError::Network("connection refused".to_string()).to_string(),
            "network failure: connection refused"
        );
    }

    #[test]
    fn config_error_display() {
        let err = Error::Config {
            message: "gateway base must be an http(s) URL".to_string(),
            key: Some("gateway_base".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "configuration error: gateway base must be an http(s) URL"
        );
    }
}
