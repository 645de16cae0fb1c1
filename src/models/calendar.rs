//! Derived calendar-view entries.

use serde::Serialize;

/// One calendar entry per logical (title, sub-area) pair.
///
/// Produced by the latest-instance picker; at most one entry exists per
/// dedup key, carrying that series' most relevant deadline.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarConference {
    /// Instance id + year (e.g. "abc252025")
    pub id: String,

    /// Full conference name
    pub name: String,

    /// Series title used as the display abbreviation
    pub abbr: String,

    /// Edition year
    pub year: i32,

    /// Research sub-area, second half of the dedup key
    pub category: String,

    /// Chosen deadline, RFC 3339 in UTC+8
    pub deadline: String,

    /// Zero-based month index of the deadline, if derivable
    pub month: Option<u32>,

    /// Venue location
    pub location: String,

    /// Instance homepage
    pub link: String,
}
