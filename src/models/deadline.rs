//! Derived deadline entries.
//!
//! `DeadlineInfo` is a pure projection over cached feed data. It is computed
//! fresh on every read and never persisted.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// One deadline milestone, normalized to the UTC+8 reference timezone.
#[derive(Debug, Clone, Serialize)]
pub struct DeadlineInfo {
    /// Series title (e.g. "AAAI")
    pub title: String,

    /// Full conference name
    pub description: String,

    /// Edition year
    pub year: i32,

    /// CCF rank letter, if ranked
    pub ccf_rank: Option<String>,

    /// Research sub-area
    pub sub_area: String,

    /// Deadline instant in UTC+8
    pub deadline: DateTime<FixedOffset>,

    /// Instance homepage
    pub link: String,

    /// Milestone label
    pub comment: String,

    /// Signed milliseconds until the deadline, at derivation time
    pub remaining_ms: i64,
}

impl DeadlineInfo {
    /// Whether the deadline was still in the future at derivation time.
    pub fn is_upcoming(&self) -> bool {
        self.remaining_ms > 0
    }
}
