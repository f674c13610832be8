//! Error types for quake-feed
//!
//! Every failure in the acquisition pipeline is represented here. Nothing in
//! this crate panics on a bad response: transport and decode failures are
//! returned as values and ultimately collapsed into the two-state
//! `Delivered`/`Failed` signal the [`LoadCoordinator`](crate::LoadCoordinator)
//! broadcasts to consumers.

use thiserror::Error;

/// Result type alias for quake-feed operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for quake-feed
#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure during the catalog request (DNS, connection
    /// reset, connect/read timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The catalog endpoint answered with a non-200 status; the response body
    /// is not read in this case
    #[error("unexpected HTTP status: {status}")]
    HttpStatus {
        /// The status code the server returned
        status: u16,
    },

    /// The response body could not be decoded as a catalog payload. Internal
    /// only: [`decode`](crate::decoder::decode) collapses this to an empty
    /// record sequence before it reaches a consumer.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A query URL could not be built from the configured endpoint
    #[error("invalid query URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A load was started without a query URL configured
    #[error("no query URL configured")]
    NoQueryUrl,
}

impl Error {
    /// Returns the HTTP status code for non-200 responses, if that is what
    /// this error represents.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }
}
