//! # Room Scan
//!
//! This crate detects newly available UR rooms inside the area of interest.
//! It fetches the current listings, diffs them against the cached snapshot
//! from the previous run and sends an email when rooms were added.

/// Listing, snapshot and error types
mod scan_types;
pub use scan_types::*;

/// Comparison of two snapshots restricted to the search area
mod diff;
pub use diff::*;

/// Client for the UR map marker API
mod ur_client;
pub use ur_client::*;

/// Monitor configuration loaded from the environment
mod config;
pub use config::*;

/// Email content describing new rooms
mod notification;
pub use notification::*;

/// Run orchestration: load, fetch, diff, notify, persist
mod executor;
pub use executor::*;
