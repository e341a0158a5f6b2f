//! Single-payload gateway retrieval
//!
//! One HTTP GET per payload with a wall-clock timeout, classifying the
//! outcome into [`FetchError`] variants. No retries, no partial-content
//! resume: a failed fetch is discarded wholly.

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use reqwest::StatusCode;

/// Gateway fetch client
///
/// Wraps a shared [`reqwest::Client`] whose timeout is fixed at
/// construction. Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher from the fetch configuration
    ///
    /// Fails only if the HTTP client itself cannot be constructed (e.g. TLS
    /// backend initialization).
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client })
    }

    /// Fetch a resolved gateway URL, returning the payload bytes
    ///
    /// Exactly HTTP 200 counts as success; any other status is
    /// [`FetchError::Http`]. Transport timeouts map to
    /// [`FetchError::Timeout`], everything else transport-level to
    /// [`FetchError::Network`]. The returned bytes are owned by the caller;
    /// the fetcher retains no reference to them.
    pub async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(classify_transport_error)?;
        Ok(body.to_vec())
    }
}

/// Map a reqwest transport error onto the fetch taxonomy
///
/// Body-read timeouts surface here too, not just connect timeouts.
fn classify_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}
