//! Calendar marker layout.
//!
//! Assigns each conference in a month bucket a visual slot along the wave
//! path: sides alternate by index parity, vertical layers grow every two
//! entries, and a 3-way cyclic horizontal jitter reduces columnar overlap.
//! The jitter is a heuristic, not a collision-free guarantee; dense months
//! may still overlap visually.

use chrono::DateTime;
use serde::Serialize;

use crate::models::CalendarConference;

/// Horizontal displacement below which a connector counts as vertical.
const NEAR_VERTICAL_EPSILON: f64 = 1.0;

/// A 2D point in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which side of the wave path a marker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSide {
    Top,
    Bottom,
}

/// Geometry knobs for marker placement.
#[derive(Debug, Clone)]
pub struct LayoutParams {
    /// Distance of layer 0 from the wave path
    pub base_offset: f64,

    /// Additional distance per vertical layer
    pub layer_step: f64,

    /// Horizontal jitter unit
    pub jitter_step: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            base_offset: 40.0,
            layer_step: 28.0,
            jitter_step: 18.0,
        }
    }
}

/// One marker's assigned slot.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerPlacement {
    /// Calendar entry id this slot belongs to
    pub id: String,

    pub side: MarkerSide,

    /// Vertical layer, grows every two entries
    pub layer: usize,

    /// Horizontal offset relative to the month anchor
    pub dx: f64,

    /// Vertical offset relative to the month anchor, negative is up
    pub dy: f64,
}

/// Assign non-overlapping slots to the conferences of one month bucket.
///
/// Candidates are stable-sorted by chosen deadline ascending, so equal
/// deadlines keep their original relative order.
pub fn place_markers(candidates: &[CalendarConference], params: &LayoutParams) -> Vec<MarkerPlacement> {
    let mut sorted: Vec<&CalendarConference> = candidates.iter().collect();
    sorted.sort_by_key(|c| deadline_sort_key(&c.deadline));

    sorted
        .iter()
        .enumerate()
        .map(|(index, conf)| {
            let side = if index % 2 == 0 {
                MarkerSide::Top
            } else {
                MarkerSide::Bottom
            };
            let layer = index / 2;
            let distance = params.base_offset + layer as f64 * params.layer_step;
            let dy = match side {
                MarkerSide::Top => -distance,
                MarkerSide::Bottom => distance,
            };
            let dx = ((index % 3) as f64 - 1.0) * params.jitter_step;

            MarkerPlacement {
                id: conf.id.clone(),
                side,
                layer,
                dx,
                dy,
            }
        })
        .collect()
}

/// Millisecond sort key for an RFC 3339 deadline; unparseable sorts last.
fn deadline_sort_key(deadline: &str) -> i64 {
    DateTime::parse_from_rfc3339(deadline)
        .map(|d| d.timestamp_millis())
        .unwrap_or(i64::MAX)
}

/// Cubic Bezier connector from the month anchor to a marker.
///
/// Near-vertical connectors bow sideways proportionally to the vertical
/// delta; otherwise the control points pull along both axes. The asymmetry
/// keeps curves readable both when markers stack above the anchor and when
/// they fan out sideways.
pub fn connector_path(anchor: Point, marker: Point) -> String {
    let dx = marker.x - anchor.x;
    let dy = marker.y - anchor.y;

    let (c1, c2) = if dx.abs() < NEAR_VERTICAL_EPSILON {
        let bow = dy.abs() * 0.25;
        (
            Point::new(anchor.x + bow, anchor.y + dy / 3.0),
            Point::new(anchor.x + bow, anchor.y + dy * 2.0 / 3.0),
        )
    } else {
        (
            Point::new(anchor.x + dx * 0.25, anchor.y + dy * 0.75),
            Point::new(anchor.x + dx * 0.75, anchor.y + dy * 0.25),
        )
    };

    format!(
        "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
        anchor.x, anchor.y, c1.x, c1.y, c2.x, c2.y, marker.x, marker.y
    )
}

/// Generate the month-band wave as cubic segments.
///
/// Crests and troughs alternate every half cycle; each half is a cubic
/// approximation of a sine arc.
pub fn wave_path(width: f64, height: f64, cycles: usize) -> String {
    let cycles = cycles.max(1);
    let baseline = height / 2.0;
    let amplitude = height / 2.0;
    let half = width / (cycles as f64 * 2.0);

    let mut path = format!("M 0.0 {baseline:.1}");
    let mut x = 0.0;
    let mut y = baseline;

    for segment in 0..cycles * 2 {
        let next_y = if segment % 2 == 0 {
            baseline - amplitude
        } else {
            baseline + amplitude
        };
        let c1 = Point::new(x + half * 0.364, y);
        let c2 = Point::new(x + half * 0.636, next_y);
        x += half;
        y = next_y;
        path.push_str(&format!(
            " C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
            c1.x, c1.y, c2.x, c2.y, x, y
        ));
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_conf(id: &str, deadline: &str) -> CalendarConference {
        CalendarConference {
            id: id.to_string(),
            name: "Conf".to_string(),
            abbr: id.to_uppercase(),
            year: 2025,
            category: "AI".to_string(),
            deadline: deadline.to_string(),
            month: Some(5),
            location: String::new(),
            link: String::new(),
        }
    }

    fn make_month(n: usize) -> Vec<CalendarConference> {
        (0..n)
            .map(|i| make_conf(&format!("c{i}"), &format!("2025-06-{:02}T10:00:00+08:00", i + 1)))
            .collect()
    }

    #[test]
    fn alternates_sides_exactly() {
        for n in [1usize, 2, 5, 8] {
            let placements = place_markers(&make_month(n), &LayoutParams::default());
            let top = placements.iter().filter(|p| p.side == MarkerSide::Top).count();
            let bottom = placements.len() - top;
            assert_eq!(top, n.div_ceil(2), "n={n}");
            assert_eq!(bottom, n / 2, "n={n}");
        }
    }

    #[test]
    fn layers_grow_every_two_entries() {
        let placements = place_markers(&make_month(6), &LayoutParams::default());
        let layers: Vec<_> = placements.iter().map(|p| p.layer).collect();
        assert_eq!(layers, vec![0, 0, 1, 1, 2, 2]);

        let params = LayoutParams::default();
        assert_eq!(placements[0].dy, -params.base_offset);
        assert_eq!(placements[1].dy, params.base_offset);
        assert_eq!(placements[2].dy, -(params.base_offset + params.layer_step));
    }

    #[test]
    fn jitter_cycles_three_ways() {
        let params = LayoutParams::default();
        let placements = place_markers(&make_month(6), &params);
        let dx: Vec<_> = placements.iter().map(|p| p.dx).collect();
        assert_eq!(
            dx,
            vec![
                -params.jitter_step,
                0.0,
                params.jitter_step,
                -params.jitter_step,
                0.0,
                params.jitter_step,
            ]
        );
    }

    #[test]
    fn sorts_by_deadline_with_stable_ties() {
        let confs = vec![
            make_conf("late", "2025-06-20T10:00:00+08:00"),
            make_conf("tie_a", "2025-06-05T10:00:00+08:00"),
            make_conf("tie_b", "2025-06-05T10:00:00+08:00"),
            make_conf("early", "2025-06-01T10:00:00+08:00"),
        ];
        let ids: Vec<_> = place_markers(&confs, &LayoutParams::default())
            .iter()
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(ids, vec!["early", "tie_a", "tie_b", "late"]);
    }

    #[test]
    fn near_vertical_connector_bows_by_vertical_delta() {
        let path = connector_path(Point::new(100.0, 100.0), Point::new(100.0, 40.0));
        assert_eq!(path, "M 100.0 100.0 C 115.0 80.0, 115.0 60.0, 100.0 40.0");
    }

    #[test]
    fn offset_connector_pulls_along_both_axes() {
        let path = connector_path(Point::new(0.0, 0.0), Point::new(40.0, 80.0));
        assert_eq!(path, "M 0.0 0.0 C 10.0 60.0, 30.0 20.0, 40.0 80.0");
    }

    #[test]
    fn wave_path_covers_width() {
        let path = wave_path(240.0, 60.0, 2);
        assert!(path.starts_with("M 0.0 30.0"));
        assert!(path.ends_with("240.0 60.0"));
        assert_eq!(path.matches(" C ").count(), 4);
    }
}
