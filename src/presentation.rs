//! Deterministic presentation rules for decoded events.
//!
//! These rules encode edge-case policy the row renderer depends on: the
//! magnitude bucket used for coloring, the one-decimal magnitude text, the
//! offset/primary location split, and the date/time display strings.

use chrono::{DateTime, Utc};

use crate::types::EventRecord;

/// Fixed phrase used as the location offset when the place string carries no
/// offset of its own.
pub const NO_OFFSET_PHRASE: &str = "Near the";

/// Separator the catalog uses between the offset phrase and the primary
/// place name. Matched as a bare substring, first occurrence, anywhere in
/// the string; a place name that happens to contain "of" splits too. That
/// behavior is load-bearing for existing consumers and is kept as is.
const OFFSET_SEPARATOR: &str = "of";

/// Discrete magnitude classification for presentation coloring.
///
/// `floor(magnitude)` drives the bucket: floors 0 and 1 share a bucket,
/// 2 through 9 map one-to-one, and everything else, including negative
/// floors, lands in the 10-plus bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MagnitudeBucket {
    /// Floor 0 or 1
    M0To1,
    /// Floor 2
    M2,
    /// Floor 3
    M3,
    /// Floor 4
    M4,
    /// Floor 5
    M5,
    /// Floor 6
    M6,
    /// Floor 7
    M7,
    /// Floor 8
    M8,
    /// Floor 9
    M9,
    /// Floor 10 and above, and negative floors
    M10Plus,
}

impl MagnitudeBucket {
    /// Classify a magnitude into its presentation bucket.
    pub fn from_magnitude(magnitude: f64) -> Self {
        match magnitude.floor() as i64 {
            0 | 1 => MagnitudeBucket::M0To1,
            2 => MagnitudeBucket::M2,
            3 => MagnitudeBucket::M3,
            4 => MagnitudeBucket::M4,
            5 => MagnitudeBucket::M5,
            6 => MagnitudeBucket::M6,
            7 => MagnitudeBucket::M7,
            8 => MagnitudeBucket::M8,
            9 => MagnitudeBucket::M9,
            _ => MagnitudeBucket::M10Plus,
        }
    }
}

impl EventRecord {
    /// Presentation bucket for this event's magnitude.
    pub fn magnitude_bucket(&self) -> MagnitudeBucket {
        MagnitudeBucket::from_magnitude(self.magnitude)
    }
}

/// A place string split into its offset phrase and primary location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationParts {
    /// Offset phrase up to and including the separator, e.g. `"5km N of"`,
    /// or [`NO_OFFSET_PHRASE`] when the place string has no separator
    pub offset: String,
    /// Primary place name, e.g. `"Springfield"`
    pub primary: String,
}

/// Render a magnitude with exactly one digit after the decimal point.
pub fn format_magnitude(magnitude: f64) -> String {
    format!("{magnitude:.1}")
}

/// Split a place string on the first occurrence of the offset separator.
///
/// `"5km N of Springfield"` becomes offset `"5km N of"` and primary
/// `"Springfield"`; a string without the separator keeps the whole place as
/// primary with the fixed [`NO_OFFSET_PHRASE`] offset.
pub fn split_location(location: &str) -> LocationParts {
    match location.find(OFFSET_SEPARATOR) {
        Some(idx) => {
            let end = idx + OFFSET_SEPARATOR.len();
            let rest = &location[end..];
            LocationParts {
                offset: location[..end].to_string(),
                primary: rest.strip_prefix(' ').unwrap_or(rest).to_string(),
            }
        }
        None => LocationParts {
            offset: NO_OFFSET_PHRASE.to_string(),
            primary: location.to_string(),
        },
    }
}

/// Format an event timestamp as a display date, e.g. `"Jan 30, 2016"` (UTC).
///
/// A timestamp outside the representable range renders as an empty string.
pub fn format_event_date(occurred_at_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(occurred_at_millis)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Format an event timestamp as a display time, e.g. `"3:25 AM"` (UTC).
///
/// A timestamp outside the representable range renders as an empty string.
pub fn format_event_time(occurred_at_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(occurred_at_millis)
        .map(|dt| dt.format("%-I:%M %p").to_string())
        .unwrap_or_default()
}
