//! Deadline timezone normalization.
//!
//! Deadlines arrive as naive `YYYY-MM-DD HH:mm:ss` strings paired with a
//! timezone descriptor (`"UTCn"`, `"UTC-n"`, or `"AoE"`). Every deadline is
//! converted to the fixed UTC+8 reference timezone before any comparison.
//!
//! "AoE" deadlines are stamped with the reference offset directly, without
//! offset math. This is not true Anywhere-on-Earth (UTC-12) semantics; the
//! behavior is locked by regression test and must not be "fixed" silently.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

use crate::utils::reference_offset;

/// Accepted deadline string formats.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Smallest and largest real-world UTC offsets, in hours.
const MIN_OFFSET_HOURS: i32 = -12;
const MAX_OFFSET_HOURS: i32 = 14;

/// Convert a raw deadline string in the given timezone to a UTC+8 instant.
///
/// Returns `None` for "TBD", empty or malformed deadline strings, and for
/// unparseable or out-of-range timezone descriptors. Callers must check
/// validity before using the result in comparisons or display.
pub fn normalize_deadline(raw: &str, timezone: &str) -> Option<DateTime<FixedOffset>> {
    let naive = parse_naive(raw)?;
    let reference = reference_offset();

    let descriptor = timezone.trim();
    if descriptor.eq_ignore_ascii_case("aoe") {
        // The raw string is treated as already being in the reference zone.
        return reference.from_local_datetime(&naive).single();
    }

    let hours = parse_offset_hours(descriptor)?;
    let source = FixedOffset::east_opt(hours * 3600)?;
    let instant = source.from_local_datetime(&naive).single()?;
    Some(instant.with_timezone(&reference))
}

/// Parse a naive deadline string, rejecting placeholders.
fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("tbd") {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Parse the trailing signed hour offset of a "UTCn"/"UTC-n" descriptor.
fn parse_offset_hours(descriptor: &str) -> Option<i32> {
    let prefix = descriptor.get(..3)?;
    if !prefix.eq_ignore_ascii_case("utc") {
        return None;
    }
    let hours: i32 = descriptor[3..].trim().parse().ok()?;
    if !(MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&hours) {
        return None;
    }
    Some(hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        reference_offset()
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
    }

    #[test]
    fn negative_offset_converts_to_reference() {
        let result = normalize_deadline("2025-12-01 23:59:59", "UTC-5").unwrap();
        assert_eq!(result, reference(2025, 12, 2, 12, 59, 59));
    }

    #[test]
    fn positive_offset_converts_to_reference() {
        // UTC-5 sample from the same feed family, hand-checked:
        // 10:00 at UTC-5 is 15:00 UTC, which is 23:00 at UTC+8.
        let result = normalize_deadline("2025-06-01 10:00:00", "UTC-5").unwrap();
        assert_eq!(result, reference(2025, 6, 1, 23, 0, 0));

        let result = normalize_deadline("2025-06-01 10:00:00", "UTC8").unwrap();
        assert_eq!(result, reference(2025, 6, 1, 10, 0, 0));
    }

    #[test]
    fn explicit_plus_sign_is_accepted() {
        let result = normalize_deadline("2025-06-01 10:00:00", "UTC+2").unwrap();
        assert_eq!(result, reference(2025, 6, 1, 16, 0, 0));
    }

    #[test]
    fn aoe_passes_through_unshifted() {
        // Deliberate approximation: no UTC-12 math is applied.
        let result = normalize_deadline("2025-06-01 10:00:00", "AoE").unwrap();
        assert_eq!(result, reference(2025, 6, 1, 10, 0, 0));

        let lower = normalize_deadline("2025-06-01 10:00:00", "aoe").unwrap();
        assert_eq!(lower, result);
    }

    #[test]
    fn minute_precision_format_is_accepted() {
        let result = normalize_deadline("2025-06-01 10:30", "UTC8").unwrap();
        assert_eq!(result, reference(2025, 6, 1, 10, 30, 0));
    }

    #[test]
    fn rejects_placeholders_and_garbage() {
        assert!(normalize_deadline("TBD", "UTC8").is_none());
        assert!(normalize_deadline("tbd", "AoE").is_none());
        assert!(normalize_deadline("", "UTC8").is_none());
        assert!(normalize_deadline("  ", "UTC8").is_none());
        assert!(normalize_deadline("soon", "UTC8").is_none());
        assert!(normalize_deadline("2025-13-40 99:99:99", "UTC8").is_none());
    }

    #[test]
    fn rejects_bad_descriptors() {
        assert!(normalize_deadline("2025-06-01 10:00:00", "UTC").is_none());
        assert!(normalize_deadline("2025-06-01 10:00:00", "GMT-5").is_none());
        assert!(normalize_deadline("2025-06-01 10:00:00", "UTC-13").is_none());
        assert!(normalize_deadline("2025-06-01 10:00:00", "UTC15").is_none());
        assert!(normalize_deadline("2025-06-01 10:00:00", "").is_none());
    }

    #[test]
    fn descriptor_case_is_ignored() {
        let lower = normalize_deadline("2025-06-01 10:00:00", "utc-5").unwrap();
        let upper = normalize_deadline("2025-06-01 10:00:00", "UTC-5").unwrap();
        assert_eq!(lower, upper);
    }
}
