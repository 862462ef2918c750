//! Arrow geometry: clipping center-to-center lines to pane borders and turning arrows into strokes.

use super::RelationshipKind;
use crate::config::WorkspaceConfig;
use crate::geometry::Vector;
use serde::{Deserialize, Serialize};

/// A rendered relationship between two panes, in viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DependencyArrow {
    /// Point where the line leaves the source pane
    pub from: Vector,
    /// Point where the line enters the target pane
    pub to: Vector,
    /// Stroke color as 0xRRGGBB
    pub color: u32,
    /// Whether the relationship exists in both directions
    pub symmetrical: bool,
    /// Relationship kind
    pub kind: RelationshipKind,
}

/// Fraction of `delta` needed to leave a box of the given half size from its center.
fn ticks(half_size: Vector, delta: Vector) -> f32 {
    let x = if delta.x != 0.0 {
        half_size.x / delta.x.abs()
    } else {
        f32::INFINITY
    };
    let y = if delta.y != 0.0 {
        half_size.y / delta.y.abs()
    } else {
        f32::INFINITY
    };
    x.min(y)
}

/// Clips the line between two pane centers to the pane borders.
///
/// Returns `None` when either pane contains the other's border crossing, which happens when the
/// panes overlap enough that no visible segment remains.
///
/// # Arguments
///
/// * `from_center` - Center of the source pane
/// * `from_half_size` - Half the source pane's size
/// * `to_center` - Center of the target pane
/// * `to_half_size` - Half the target pane's size
///
/// # Returns
///
/// The start and end of the clipped segment.
pub fn clip_between(
    from_center: Vector,
    from_half_size: Vector,
    to_center: Vector,
    to_half_size: Vector,
) -> Option<(Vector, Vector)> {
    let delta = to_center - from_center;

    let from_ticks = ticks(from_half_size, delta);
    if from_ticks >= 1.0 {
        return None;
    }
    let to_ticks = ticks(to_half_size, delta);
    if to_ticks >= 1.0 {
        return None;
    }

    Some((from_center + delta * from_ticks, to_center - delta * to_ticks))
}

/// A filled circle in a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeCircle {
    /// Circle center
    pub center: Vector,
    /// Circle radius
    pub radius: f32,
}

/// Drawing primitives for one arrow, ready for any 2D painter.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowStroke {
    /// Line segments, each drawn with `width`
    pub segments: Vec<(Vector, Vector)>,
    /// Filled circle marking the source of a one-way arrow
    pub circle: Option<StrokeCircle>,
    /// Stroke color as 0xRRGGBB
    pub color: u32,
    /// Stroke width
    pub width: f32,
}

impl ArrowStroke {
    /// Builds the strokes for an arrow.
    ///
    /// Same-file arrows are dashed, symbol dependencies are solid with wings at the tip (and at
    /// the source too when symmetrical). One-way arrows get a circle at the source.
    pub fn from_arrow(arrow: &DependencyArrow, config: &WorkspaceConfig) -> Self {
        let mut segments = match arrow.kind {
            RelationshipKind::SameFile => {
                dashed_segments(arrow.from, arrow.to, config.arrow_dash, config.arrow_gap)
            }
            RelationshipKind::SymbolDependency => vec![(arrow.from, arrow.to)],
        };

        if arrow.kind == RelationshipKind::SymbolDependency {
            let direction = (arrow.to - arrow.from).normalized();
            segments.extend(wings(arrow.to, direction, config));
            if arrow.symmetrical {
                segments.extend(wings(arrow.from, -direction, config));
            }
        }

        let circle = (!arrow.symmetrical).then_some(StrokeCircle {
            center: arrow.from,
            radius: config.arrow_circle_radius,
        });

        Self {
            segments,
            circle,
            color: arrow.color,
            width: config.arrow_stroke_width,
        }
    }
}

/// Splits the line from `from` to `to` into dashes.
pub fn dashed_segments(from: Vector, to: Vector, dash: f32, gap: f32) -> Vec<(Vector, Vector)> {
    let distance = (to - from).length();
    let period = dash + gap;
    let mut segments = Vec::new();
    let mut cursor = from;
    if distance > 0.0 && period > 0.0 {
        let mut offset = period;
        while offset <= distance {
            segments.push((cursor, from.lerp(to, (offset - gap) / distance)));
            cursor = from.lerp(to, offset / distance);
            offset += period;
        }
    }
    segments.push((cursor, to));
    segments
}

/// Two wing segments ending at `tip`, pointing along `direction`.
fn wings(tip: Vector, direction: Vector, config: &WorkspaceConfig) -> [(Vector, Vector); 2] {
    let base = tip - direction * config.arrow_length;
    let perpendicular = direction.perpendicular() * config.arrow_wing_length;
    [(tip, base + perpendicular), (tip, base - perpendicular)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn on_border(point: Vector, center: Vector, half: Vector) -> bool {
        let rect = Rect::from_position_and_size(center - half, half * 2.0);
        let epsilon = 1e-3;
        let within = rect.left() - epsilon <= point.x
            && point.x <= rect.right() + epsilon
            && rect.top() - epsilon <= point.y
            && point.y <= rect.bottom() + epsilon;
        let touches = (point.x - rect.left()).abs() < epsilon
            || (point.x - rect.right()).abs() < epsilon
            || (point.y - rect.top()).abs() < epsilon
            || (point.y - rect.bottom()).abs() < epsilon;
        within && touches
    }

    fn collinear(a: Vector, b: Vector, c: Vector) -> bool {
        let ab = b - a;
        let ac = c - a;
        (ab.x * ac.y - ab.y * ac.x).abs() < 1e-2
    }

    #[test]
    fn test_clip_points_lie_on_borders_and_between_centers() {
        let cases = [
            (Vector::new(100.0, 100.0), Vector::new(50.0, 50.0), Vector::new(400.0, 180.0), Vector::new(80.0, 40.0)),
            (Vector::new(0.0, 0.0), Vector::new(30.0, 60.0), Vector::new(-20.0, 500.0), Vector::new(100.0, 20.0)),
            (Vector::new(0.0, 0.0), Vector::new(50.0, 50.0), Vector::new(300.0, 0.0), Vector::new(50.0, 50.0)),
        ];
        for (from, from_half, to, to_half) in cases {
            let (start, end) = clip_between(from, from_half, to, to_half).unwrap();
            assert!(on_border(start, from, from_half), "{:?}", start);
            assert!(on_border(end, to, to_half), "{:?}", end);
            assert!(collinear(from, to, start));
            assert!(collinear(from, to, end));
        }
    }

    #[test]
    fn test_horizontal_clip() {
        let (start, end) = clip_between(
            Vector::new(0.0, 0.0),
            Vector::new(50.0, 50.0),
            Vector::new(300.0, 0.0),
            Vector::new(50.0, 50.0),
        )
        .unwrap();
        assert!(start.approx_eq(Vector::new(50.0, 0.0), 1e-4));
        assert!(end.approx_eq(Vector::new(250.0, 0.0), 1e-4));
    }

    #[test]
    fn test_overlapping_panes_have_no_arrow() {
        assert!(clip_between(
            Vector::new(0.0, 0.0),
            Vector::new(100.0, 100.0),
            Vector::new(50.0, 20.0),
            Vector::new(100.0, 100.0),
        )
        .is_none());
        // Concentric panes.
        assert!(clip_between(Vector::ZERO, Vector::new(5.0, 5.0), Vector::ZERO, Vector::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_same_file_arrow_is_dashed_without_wings() {
        let arrow = DependencyArrow {
            from: Vector::new(0.0, 0.0),
            to: Vector::new(100.0, 0.0),
            color: 0xffffff,
            symmetrical: true,
            kind: RelationshipKind::SameFile,
        };
        let stroke = ArrowStroke::from_arrow(&arrow, &WorkspaceConfig::default());
        // Dashes start every 15px: 0-10, 15-25, ... 75-85, 90-100.
        assert_eq!(stroke.segments.len(), 7);
        assert_eq!(stroke.segments[0], (Vector::new(0.0, 0.0), Vector::new(10.0, 0.0)));
        assert!(stroke.segments[1].0.approx_eq(Vector::new(15.0, 0.0), 1e-4));
        assert_eq!(stroke.segments.last().unwrap().1, Vector::new(100.0, 0.0));
        assert!(stroke.segments.iter().all(|(a, b)| a.y == 0.0 && b.y == 0.0));
        assert!(stroke.circle.is_none());
    }

    #[test]
    fn test_one_way_dependency_has_circle_and_one_head() {
        let config = WorkspaceConfig::default();
        let arrow = DependencyArrow {
            from: Vector::new(0.0, 0.0),
            to: Vector::new(100.0, 0.0),
            color: 0x123456,
            symmetrical: false,
            kind: RelationshipKind::SymbolDependency,
        };
        let stroke = ArrowStroke::from_arrow(&arrow, &config);
        assert_eq!(stroke.segments.len(), 3);
        assert_eq!(stroke.circle.map(|circle| circle.center), Some(Vector::ZERO));
        assert_eq!(stroke.width, 3.0);

        let wing_ends: Vec<Vector> = stroke.segments[1..].iter().map(|(_, end)| *end).collect();
        assert!(wing_ends.contains(&Vector::new(90.0, 10.0)));
        assert!(wing_ends.contains(&Vector::new(90.0, -10.0)));

        let symmetric = ArrowStroke::from_arrow(
            &DependencyArrow {
                symmetrical: true,
                ..arrow
            },
            &config,
        );
        assert_eq!(symmetric.segments.len(), 5);
        assert!(symmetric.circle.is_none());
    }
}
