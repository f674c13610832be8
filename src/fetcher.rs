//! Single-attempt HTTP fetch of the catalog query response.
//!
//! One GET per call, fixed timeouts, no retry or backoff: the load cycle that
//! drives a fetch issues exactly one attempt and reports the outcome. All
//! failure modes come back as [`Error`] values; nothing is raised past this
//! boundary.

use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};

/// Connect timeout for the catalog request
const CONNECT_TIMEOUT_MS: u64 = 15_000;

/// Read (whole-request) timeout once connected
const READ_TIMEOUT_MS: u64 = 10_000;

/// Executes catalog queries over HTTP.
///
/// Cheap to clone; the underlying `reqwest::Client` holds the connection pool
/// and releases connections on every exit path, success or failure.
#[derive(Clone)]
pub struct Fetcher {
    http_client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher with the fixed connect/read timeouts.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_millis(CONNECT_TIMEOUT_MS))
            .timeout(std::time::Duration::from_millis(READ_TIMEOUT_MS))
            .user_agent("quake-feed catalog client")
            .build()?;

        Ok(Self { http_client })
    }

    /// Perform one GET against `url` and return the response body as text.
    ///
    /// Any status other than 200 is an error and the body is not read. I/O
    /// failures (DNS, connection reset, timeout) surface as
    /// [`Error::Network`].
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "fetching catalog query");

        let response = self.http_client.get(url.as_str()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "catalog query returned non-200 status");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "catalog query body received");
        Ok(body)
    }
}
