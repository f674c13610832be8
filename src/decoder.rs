//! GeoJSON catalog response decoding.
//!
//! The catalog answers with a feature collection; only the `features` array
//! and four properties per feature (`mag`, `place`, `time`, `url`) are
//! consumed. Decoding is fail-closed over the whole batch: either every
//! feature is well-formed and the full sequence comes back in response order,
//! or the caller receives an empty sequence. There is no per-record
//! skip-and-continue — a single malformed feature empties the result, the
//! same as a malformed top-level document.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::EventRecord;

/// Consumed subset of the catalog's feature-collection schema. Unknown fields
/// at any level are ignored.
#[derive(Debug, Deserialize)]
struct Catalog {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    mag: f64,
    place: String,
    time: i64,
    url: String,
}

impl From<Properties> for EventRecord {
    fn from(p: Properties) -> Self {
        EventRecord {
            magnitude: p.mag,
            location: p.place,
            occurred_at_millis: p.time,
            detail_url: p.url,
        }
    }
}

/// Decode catalog response text into event records.
///
/// Never fails the caller: empty or blank input yields an empty sequence
/// immediately, and any structural or type error anywhere in the payload
/// collapses to an empty sequence as well. A consumer cannot distinguish a
/// malformed batch from a legitimately empty one through this function — use
/// the [`LoadState`](crate::types::LoadState) signal for failed-versus-empty,
/// and [`decode_strict`] when the underlying error matters.
pub fn decode(text: &str) -> Vec<EventRecord> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match decode_strict(text) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "malformed catalog payload, returning no records");
            Vec::new()
        }
    }
}

/// Decode catalog response text, surfacing the decode error instead of
/// collapsing it.
///
/// Same whole-batch semantics as [`decode`]; empty/blank input is still an
/// empty `Ok` result, not an error.
///
/// # Errors
/// Returns [`Error::Decode`](crate::Error::Decode) when the payload is not a
/// well-formed feature collection or any feature is missing a required
/// property.
pub fn decode_strict(text: &str) -> Result<Vec<EventRecord>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let catalog: Catalog = serde_json::from_str(text)?;
    let records: Vec<EventRecord> = catalog
        .features
        .into_iter()
        .map(|feature| feature.properties.into())
        .collect();

    debug!(count = records.len(), "decoded catalog features");
    Ok(records)
}
