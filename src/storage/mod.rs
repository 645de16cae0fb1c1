//! Storage layers for feed data and client state.
//!
//! Two tiers exist over the same data directory:
//! - `SnapshotStore`: timestamped, TTL-checked snapshots of decoded feed
//!   payloads, one JSON blob per data kind.
//! - `FeedStore`: raw feed text plus content hashes; a refresh only
//!   rewrites files when a hash changed.
//!
//! `SettingsStore` persists client-side state (histories, view settings).
//!
//! ## Directory Structure
//!
//! ```text
//! {data_dir}/
//! ├── config.toml               # Application configuration
//! ├── cache/
//! │   ├── conferences.json      # Snapshot: decoded conference series
//! │   └── acceptances.json      # Snapshot: decoded acceptance records
//! ├── feeds/
//! │   ├── conferences.yml       # Raw conference feed text
//! │   ├── acceptances.yml       # Raw acceptance feed text
//! │   └── metadata.json         # Content hashes + last update
//! └── settings/
//!     ├── view_settings.json
//!     ├── search_history.json
//!     └── recognition_history.json
//! ```

pub mod feed_store;
pub mod settings;
pub mod snapshot;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export for convenience
pub use feed_store::{FeedStore, StoreOutcome};
pub use settings::{RecognitionEntry, SettingsStore, ViewSettings};
pub use snapshot::SnapshotStore;

/// The data kinds the caches distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Conferences,
    Acceptances,
}

impl DataKind {
    /// Stable identifier used in file names and record ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Conferences => "conferences",
            DataKind::Acceptances => "acceptances",
        }
    }
}

/// A timestamped snapshot record for one data kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord<T> {
    /// Data kind identifier
    pub id: String,

    /// The cached payload
    pub payload: T,

    /// When the snapshot was written
    pub timestamp: DateTime<Utc>,

    /// Serialized payload size estimate in bytes
    pub byte_size: usize,
}
