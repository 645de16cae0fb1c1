//! Deadline derivation.
//!
//! Walks conference series → instances → timeline entries, producing
//! normalized `DeadlineInfo` projections. Entries with "TBD" or otherwise
//! unparseable deadlines are skipped; a series with no instances or an
//! instance with no timeline contributes nothing.

use chrono::{DateTime, FixedOffset};

use crate::models::{ConferenceSeries, DeadlineInfo};
use crate::pipeline::timezone::normalize_deadline;

/// Fixed indicator shown instead of negative counters.
pub const EXPIRED_INDICATOR: &str = "Expired";

/// Derive every valid deadline entry from the given series.
///
/// No dedup happens here: a series may legitimately expose several rounds
/// (abstract, paper, rebuttal) at once.
pub fn derive_deadlines(series: &[ConferenceSeries], now: DateTime<FixedOffset>) -> Vec<DeadlineInfo> {
    let mut entries = Vec::new();

    for s in series {
        for instance in &s.instances {
            for milestone in &instance.timeline {
                let Some(deadline) = normalize_deadline(&milestone.deadline, &instance.timezone)
                else {
                    continue;
                };

                entries.push(DeadlineInfo {
                    title: s.title.clone(),
                    description: s.description.clone(),
                    year: instance.year,
                    ccf_rank: s.ccf_rank().map(str::to_string),
                    sub_area: s.sub_area.clone(),
                    deadline,
                    link: instance.link.clone(),
                    comment: milestone.comment.clone(),
                    remaining_ms: deadline.signed_duration_since(now).num_milliseconds(),
                });
            }
        }
    }

    entries
}

/// All strictly-future deadlines, ascending by time remaining.
pub fn upcoming_deadlines(
    series: &[ConferenceSeries],
    now: DateTime<FixedOffset>,
) -> Vec<DeadlineInfo> {
    let mut entries: Vec<DeadlineInfo> = derive_deadlines(series, now)
        .into_iter()
        .filter(DeadlineInfo::is_upcoming)
        .collect();
    entries.sort_by_key(|e| e.remaining_ms);
    entries
}

/// All deadlines whose series title equals the query (case-insensitive),
/// past or future, sorted by absolute distance from `now`.
pub fn search_deadlines(
    series: &[ConferenceSeries],
    query: &str,
    now: DateTime<FixedOffset>,
) -> Vec<DeadlineInfo> {
    let query = query.trim();
    let mut entries: Vec<DeadlineInfo> = derive_deadlines(series, now)
        .into_iter()
        .filter(|e| e.title.eq_ignore_ascii_case(query))
        .collect();
    entries.sort_by_key(|e| e.remaining_ms.abs());
    entries
}

/// Render remaining milliseconds as a zero-padded countdown.
///
/// Expired deadlines render the fixed indicator, never negative counters.
pub fn format_countdown(remaining_ms: i64) -> String {
    if remaining_ms <= 0 {
        return EXPIRED_INDICATOR.to_string();
    }

    let total_secs = remaining_ms / 1000;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    format!("{days:02}d{hours:02}h{minutes:02}m{seconds:02}s")
}
