//! Core types for quake-feed

use serde::{Deserialize, Serialize};

/// One decoded earthquake entry from the catalog response.
///
/// Records are created only by the [`decoder`](crate::decoder): a record is
/// fully populated or not constructed at all. A feature missing any of the
/// four required properties aborts the whole batch rather than producing a
/// record with substituted defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event magnitude. Finite, may be negative for micro-events; no upper
    /// bound enforced.
    pub magnitude: f64,

    /// Human-readable place string as reported by the catalog, e.g.
    /// `"5km N of Springfield"`. May or may not contain an offset phrase.
    pub location: String,

    /// Event time in milliseconds since the Unix epoch. Non-negative in
    /// practice but not validated at decode time.
    pub occurred_at_millis: i64,

    /// Catalog detail page for this event. Intended to be an absolute URI;
    /// not validated at decode time.
    pub detail_url: String,
}

/// Load lifecycle state of a [`LoadCoordinator`](crate::LoadCoordinator).
///
/// `Idle -> Loading -> {Delivered, Failed}`, with `reset()` returning to
/// `Idle` from any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// No load started and nothing cached
    Idle,
    /// A background fetch+decode is in flight
    Loading,
    /// The most recent load completed and its records (possibly zero) were
    /// delivered to subscribers
    Delivered,
    /// The most recent load failed in transport, or no query URL was
    /// configured; no records were delivered
    Failed,
}

/// Result signal broadcast to coordinator subscribers on load completion.
///
/// The two variants let a consumer distinguish "legitimately zero results"
/// (`Delivered` with an empty vec) from "failed to load" (`Failed`) without
/// inspecting the record count.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadEvent {
    /// Fetch and decode completed; carries the decoded records in server
    /// response order
    Delivered(Vec<EventRecord>),
    /// Transport failure or missing query URL; no data
    Failed,
}
