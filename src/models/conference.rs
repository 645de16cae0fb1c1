//! Conference series data structures matching the remote feed shape.

use serde::{Deserialize, Serialize};

/// A recurring conference tracked across years.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConferenceSeries {
    /// Short title used as the series identity (e.g. "AAAI"), case-sensitive
    pub title: String,

    /// Full conference name
    #[serde(default)]
    pub description: String,

    /// Research sub-area (e.g. "AI", "network")
    #[serde(rename = "sub", default)]
    pub sub_area: String,

    /// Ranking info, absent for unranked venues
    #[serde(default)]
    pub rank: Option<RankInfo>,

    /// DBLP key for the venue
    #[serde(default)]
    pub dblp: String,

    /// Yearly instances, newest typically last in the feed
    #[serde(rename = "confs", default)]
    pub instances: Vec<ConferenceInstance>,
}

impl ConferenceSeries {
    /// CCF rank letter, if ranked.
    pub fn ccf_rank(&self) -> Option<&str> {
        self.rank.as_ref().and_then(|r| r.ccf.as_deref())
    }

    /// CORE rank, if ranked.
    pub fn core_rank(&self) -> Option<&str> {
        self.rank.as_ref().and_then(|r| r.core.as_deref())
    }
}

/// Ranking-system entries for a series.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankInfo {
    #[serde(default)]
    pub ccf: Option<String>,

    #[serde(default)]
    pub core: Option<String>,
}

/// One year's concrete occurrence of a series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConferenceInstance {
    /// Edition year
    pub year: i32,

    /// Instance identifier (e.g. "aaai25")
    pub id: String,

    /// Instance homepage
    #[serde(default)]
    pub link: String,

    /// Timezone descriptor: "UTCn", "UTC-n", or "AoE"
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Deadline milestones, in feed order
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,

    /// Venue location
    #[serde(default)]
    pub place: String,

    /// Human-readable event dates
    #[serde(default)]
    pub date: String,
}

/// One named deadline milestone within an instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Raw deadline string (`YYYY-MM-DD HH:mm:ss`), or "TBD"/empty
    #[serde(default)]
    pub deadline: String,

    /// Milestone label (e.g. "Abstract deadline")
    #[serde(default)]
    pub comment: String,
}

fn default_timezone() -> String {
    "AoE".to_string()
}
