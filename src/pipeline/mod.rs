//! Pipeline stages for deadline tracking.
//!
//! - `timezone`: normalize raw deadlines to the UTC+8 reference zone
//! - `deadlines`: derive upcoming/search projections and countdowns
//! - `calendar`: collapse series to one calendar entry per dedup key
//! - `layout`: assign calendar markers their visual slots
//! - `refresh`: one server-side refresh cycle over feeds and stores

pub mod calendar;
pub mod deadlines;
pub mod layout;
pub mod refresh;
pub mod timezone;

pub use calendar::pick_calendar_entries;
pub use deadlines::{format_countdown, search_deadlines, upcoming_deadlines};
pub use layout::{LayoutParams, MarkerPlacement, connector_path, place_markers, wave_path};
pub use refresh::{run_refresh, store_refresh};
pub use timezone::normalize_deadline;
