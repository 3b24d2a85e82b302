//! Curved edge geometry between two node centers.

use mindcanvas_core::geom::{Point, Size, vector};
use std::fmt::Write as _;

/// Gap between a node's bounding circle and the edge end.
const RADIUS_GAP: f64 = 5.0;
const MAX_CURVATURE: f64 = 80.0;
const CURVATURE_RATIO: f64 = 0.25;
const LABEL_OFFSET: f64 = 18.0;

/// Below this, edge lengths count as zero.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionPath {
    pub start: Point,
    /// Quadratic Bézier control point.
    pub control: Point,
    pub end: Point,
    pub label_anchor: Point,
    /// Degrees in `[-90, 90]` so labels never render upside down.
    pub label_angle: f64,
}

/// Radius of the circle an edge stops at, from the node's base size.
pub fn node_radius(size: Size) -> f64 {
    size.width.max(size.height) / 2.0 + RADIUS_GAP
}

/// Quadratic path from the rim of `from` to the rim of `to`.
///
/// Returns `None` when the centers coincide or the two rims touch or overlap.
pub fn connection_path(
    from: Point,
    from_radius: f64,
    to: Point,
    to_radius: f64,
) -> Option<ConnectionPath> {
    let delta = to - from;
    let length = delta.length();
    if !(length > EPSILON) {
        return None;
    }
    let dir = delta / length;

    let start = from + dir * from_radius;
    let end = to - dir * to_radius;
    let inner = end - start;
    let inner_length = inner.length();
    if inner_length <= EPSILON || inner.dot(dir) <= 0.0 {
        return None;
    }

    let curvature = (inner_length * CURVATURE_RATIO).min(MAX_CURVATURE);
    let mid = start.lerp(end, 0.5);
    let control = mid + vector(inner.y, -inner.x) * (curvature / inner_length);

    // The label sits on the side opposite the bulge.
    let centroid = (start.to_vector() + control.to_vector() + end.to_vector()) / 3.0;
    let normal = vector(-inner.y, inner.x) / inner_length;
    let label_anchor = (centroid + normal * LABEL_OFFSET).to_point();

    Some(ConnectionPath {
        start,
        control,
        end,
        label_anchor,
        label_angle: readable_angle(inner.y.atan2(inner.x).to_degrees()),
    })
}

fn readable_angle(degrees: f64) -> f64 {
    if degrees > 90.0 {
        degrees - 180.0
    } else if degrees < -90.0 {
        degrees + 180.0
    } else {
        degrees
    }
}

impl ConnectionPath {
    /// SVG path data: `M x1 y1 Q cx cy x2 y2`.
    pub fn svg_path_data(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            &mut out,
            "M {} {} Q {} {} {} {}",
            crate::svg::fmt(self.start.x),
            crate::svg::fmt(self.start.y),
            crate::svg::fmt(self.control.x),
            crate::svg::fmt(self.control.y),
            crate::svg::fmt(self.end.x),
            crate::svg::fmt(self.end.y),
        );
        out
    }
}
