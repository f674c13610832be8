//! Configuration types for quake-feed

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Response format requested from the catalog (fixed)
pub const QUERY_FORMAT: &str = "geojson";

/// Maximum number of events requested per query (fixed, no pagination)
pub const QUERY_LIMIT: u32 = 10;

/// Query configuration for the earthquake-catalog endpoint
///
/// The endpoint plus the two preference-driven parameters are supplied by the
/// embedding application; `format` and `limit` are fixed constants of the
/// query protocol. The minimum-magnitude and order-by values are opaque to
/// this crate — they come from the consumer's own settings store and are
/// passed through to the query string verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Base query endpoint (default: the USGS fdsnws event query URL)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Minimum magnitude filter, passed verbatim as `minmag` (default: "6")
    #[serde(default = "default_min_magnitude")]
    pub min_magnitude: String,

    /// Sort order, passed verbatim as `orderby` (default: "time")
    #[serde(default = "default_order_by")]
    pub order_by: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            min_magnitude: default_min_magnitude(),
            order_by: default_order_by(),
        }
    }
}

impl QueryConfig {
    /// Build the full query URL:
    /// `<endpoint>?format=geojson&limit=10&minmag=<m>&orderby=<o>`
    ///
    /// # Errors
    /// Returns an error if the configured endpoint is not a valid absolute
    /// URL.
    pub fn query_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("format", QUERY_FORMAT)
            .append_pair("limit", &QUERY_LIMIT.to_string())
            .append_pair("minmag", &self.min_magnitude)
            .append_pair("orderby", &self.order_by);
        Ok(url)
    }
}

fn default_endpoint() -> String {
    "https://earthquake.usgs.gov/fdsnws/event/1/query".to_string()
}

fn default_min_magnitude() -> String {
    "6".to_string()
}

fn default_order_by() -> String {
    "time".to_string()
}
