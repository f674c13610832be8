//! # quake-feed
//!
//! Backend library for earthquake-catalog feed applications.
//!
//! quake-feed owns the data-acquisition pipeline for a "recent earthquakes"
//! list: it builds the catalog query URL, performs a single-attempt HTTP GET,
//! decodes the GeoJSON response into typed [`EventRecord`]s, and coordinates
//! when a (re)fetch happens relative to the consuming UI's lifecycle. The
//! consumer renders rows and owns its preference store; this crate exposes a
//! plain sequence of decoded records plus a two-state delivered/failed
//! signal.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to load events, no polling required
//! - **Fail-soft** - Transport and decode failures come back as values, never panics
//! - **Single-flight** - One in-flight load per coordinator, deliveries never interleave
//!
//! ## Quick Start
//!
//! ```no_run
//! use quake_feed::{Fetcher, LoadCoordinator, LoadEvent, QueryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QueryConfig {
//!         min_magnitude: "5".to_string(),
//!         order_by: "time".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let coordinator = LoadCoordinator::new(Fetcher::new()?);
//!     let mut events = coordinator.subscribe();
//!
//!     coordinator.start(Some(config.query_url()?)).await;
//!
//!     match events.recv().await? {
//!         LoadEvent::Delivered(records) => {
//!             for record in records {
//!                 println!("{} {}", record.magnitude, record.location);
//!             }
//!         }
//!         LoadEvent::Failed => eprintln!("could not load earthquake data"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Query configuration and URL construction
pub mod config;
/// Lifecycle-aware load coordination
pub mod coordinator;
/// GeoJSON catalog response decoding
pub mod decoder;
/// Error types
pub mod error;
/// Single-attempt HTTP fetch
pub mod fetcher;
/// Magnitude classification and display formatting
pub mod presentation;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{QUERY_FORMAT, QUERY_LIMIT, QueryConfig};
pub use coordinator::LoadCoordinator;
pub use decoder::{decode, decode_strict};
pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use presentation::{
    LocationParts, MagnitudeBucket, NO_OFFSET_PHRASE, format_event_date, format_event_time,
    format_magnitude, split_location,
};
pub use types::{EventRecord, LoadEvent, LoadState};
