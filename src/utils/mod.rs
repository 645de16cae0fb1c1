//! Utility functions and helpers.

pub mod http;

use chrono::{DateTime, FixedOffset, Utc};

/// Hours east of UTC of the reference timezone all deadlines normalize to.
pub const REFERENCE_OFFSET_HOURS: i32 = 8;

/// The fixed UTC+8 reference offset.
pub fn reference_offset() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_OFFSET_HOURS * 3600).expect("valid reference offset")
}

/// Current time expressed in the reference timezone.
pub fn now_reference() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&reference_offset())
}
