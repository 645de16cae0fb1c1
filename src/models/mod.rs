// src/models/mod.rs

//! Domain models for the deadline tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod acceptance;
mod calendar;
mod conference;
mod config;
mod deadline;

// Re-export all public types
pub use acceptance::{AcceptanceRecord, YearlyRate, lookup_rate};
pub use calendar::CalendarConference;
pub use conference::{ConferenceInstance, ConferenceSeries, RankInfo, TimelineEntry};
pub use config::{CacheConfig, Config, FeedConfig, RefreshConfig, VendorConfig};
pub use deadline::DeadlineInfo;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Combined result of a data read, best-effort and never an `Err`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConferenceData {
    pub conferences: Vec<ConferenceSeries>,
    pub acceptances: Vec<AcceptanceRecord>,
    /// Set only when a kind has no cached copy at all after a failed fetch.
    pub error: Option<String>,
}

/// Outcome of a server-side refresh run.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub success: bool,
    pub message: String,
    pub metadata: Option<CacheMetadata>,
}

/// Metadata for the content-hashed feed store.
///
/// A refresh only rewrites stored files and this metadata when at least one
/// content hash changed versus the previous run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// SHA-256 hex digest of the conference feed text
    pub conference_hash: String,

    /// SHA-256 hex digest of the acceptance feed text
    pub acceptance_hash: String,

    /// Timestamp of the last write
    pub last_update: DateTime<Utc>,
}
