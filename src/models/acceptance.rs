//! Historical acceptance-rate records.

use serde::{Deserialize, Serialize};

/// Acceptance-rate history for one conference series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcceptanceRecord {
    /// Series title, matched case-sensitively against `ConferenceSeries::title`
    pub title: String,

    /// Per-year statistics
    #[serde(rename = "accept_rates", default)]
    pub rates: Vec<YearlyRate>,
}

impl AcceptanceRecord {
    /// Find the rate entry for a specific year.
    pub fn rate_for_year(&self, year: i32) -> Option<&YearlyRate> {
        self.rates.iter().find(|r| r.year == year)
    }
}

/// Acceptance statistics for a single year.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct YearlyRate {
    pub year: i32,

    #[serde(default)]
    pub submitted: Option<u32>,

    #[serde(default)]
    pub accepted: Option<u32>,

    /// Pre-formatted rate string from the feed (e.g. "23.75%")
    #[serde(default)]
    pub rate: String,

    /// Where the numbers came from
    #[serde(default)]
    pub source: String,
}

/// Look up the acceptance rate for a (title, year) pair.
pub fn lookup_rate<'a>(
    records: &'a [AcceptanceRecord],
    title: &str,
    year: i32,
) -> Option<&'a YearlyRate> {
    records
        .iter()
        .find(|r| r.title == title)
        .and_then(|r| r.rate_for_year(year))
}
