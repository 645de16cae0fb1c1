//! Latest-instance picking for the calendar view.
//!
//! Collapses the yearly instances of each series down to one representative
//! entry per (title, sub-area) dedup key, carrying the most relevant
//! deadline for compact display.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset};

use crate::models::{CalendarConference, ConferenceSeries};
use crate::pipeline::timezone::normalize_deadline;

/// Reduce series to at most one calendar entry per (title, sub-area) key.
///
/// Instances are scanned newest-year first. The first instance with at
/// least one valid deadline contributes its *latest* valid deadline and
/// scanning stops there; older instances are never considered once a newer
/// one qualifies, even if their milestones would read better. Key
/// collisions keep whichever candidate has the later chosen deadline.
pub fn pick_calendar_entries(series: &[ConferenceSeries]) -> Vec<CalendarConference> {
    let mut chosen: HashMap<(String, String), (DateTime<FixedOffset>, CalendarConference)> =
        HashMap::new();

    for s in series {
        let Some((deadline, entry)) = pick_series_entry(s) else {
            continue;
        };

        let key = (entry.abbr.clone(), entry.category.clone());
        match chosen.get(&key) {
            Some((existing, _)) if *existing >= deadline => {}
            _ => {
                chosen.insert(key, (deadline, entry));
            }
        }
    }

    let mut entries: Vec<CalendarConference> =
        chosen.into_values().map(|(_, entry)| entry).collect();

    // Month ascending, month-less entries last; abbr/category break ties so
    // the output is deterministic regardless of map iteration order.
    entries.sort_by(|a, b| {
        let month_a = a.month.map(|m| m as i64).unwrap_or(i64::MAX);
        let month_b = b.month.map(|m| m as i64).unwrap_or(i64::MAX);
        month_a
            .cmp(&month_b)
            .then_with(|| a.abbr.cmp(&b.abbr))
            .then_with(|| a.category.cmp(&b.category))
    });

    entries
}

/// Pick the representative entry for one series, if any instance qualifies.
fn pick_series_entry(
    series: &ConferenceSeries,
) -> Option<(DateTime<FixedOffset>, CalendarConference)> {
    let mut instances: Vec<_> = series.instances.iter().collect();
    instances.sort_by(|a, b| b.year.cmp(&a.year));

    for instance in instances {
        let latest = instance
            .timeline
            .iter()
            .filter_map(|m| normalize_deadline(&m.deadline, &instance.timezone))
            .max();

        let Some(deadline) = latest else {
            continue;
        };

        let entry = CalendarConference {
            id: format!("{}{}", instance.id, instance.year),
            name: series.description.clone(),
            abbr: series.title.clone(),
            year: instance.year,
            category: series.sub_area.clone(),
            deadline: deadline.to_rfc3339(),
            month: Some(deadline.month0()),
            location: instance.place.clone(),
            link: instance.link.clone(),
        };
        return Some((deadline, entry));
    }

    None
}
