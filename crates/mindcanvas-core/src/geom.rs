//! World-space geometry shared by layout, viewport and rendering.

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Box2D = euclid::Box2D<f64, Unit>;

/// Smallest rendered node width, regardless of title length.
pub const MIN_NODE_WIDTH: f64 = 120.0;
/// Smallest rendered node height.
pub const MIN_NODE_HEIGHT: f64 = 40.0;
/// Approximate advance of one title character.
pub const CHAR_WIDTH: f64 = 8.0;
/// Horizontal room around the title text.
pub const LABEL_PADDING: f64 = 40.0;
/// Line height (32) plus vertical label padding (16).
pub const LABEL_HEIGHT: f64 = 48.0;
/// Padding added around node boxes for collision tests.
pub const COLLISION_PADDING: f64 = 20.0;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

/// Base (unpadded) node size derived from the title length.
pub fn node_size(title: &str) -> Size {
    let len = title.chars().count() as f64;
    Size::new(
        (len * CHAR_WIDTH + LABEL_PADDING).max(MIN_NODE_WIDTH),
        LABEL_HEIGHT.max(MIN_NODE_HEIGHT),
    )
}

/// Box of `size` centered on `center`, grown by `padding` on every side.
pub fn padded_box(center: Point, size: Size, padding: f64) -> Box2D {
    let half = vector(size.width / 2.0 + padding, size.height / 2.0 + padding);
    Box2D::new(center - half, center + half)
}

/// Collision box of a node: [`node_size`] centered on the node, grown by `padding`.
pub fn node_bounds(title: &str, center: Point, padding: f64) -> Box2D {
    padded_box(center, node_size(title), padding)
}

pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).length()
}

/// Axis-aligned overlap test. Boxes that only touch do not overlap.
pub fn boxes_overlap(a: &Box2D, b: &Box2D) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// Min/max rectangle of a point set, `None` when empty.
pub fn bounding_box(points: impl IntoIterator<Item = Point>) -> Option<Box2D> {
    let mut it = points.into_iter();
    let first = it.next()?;
    let mut b = Box2D::new(first, first);
    for p in it {
        b.min.x = b.min.x.min(p.x);
        b.min.y = b.min.y.min(p.y);
        b.max.x = b.max.x.max(p.x);
        b.max.y = b.max.y.max(p.y);
    }
    Some(b)
}

/// Center of the bounding rectangle of `points`; the origin for an empty set.
pub fn bounding_center(points: impl IntoIterator<Item = Point>) -> Point {
    bounding_box(points)
        .map(|b| b.center())
        .unwrap_or_else(|| point(0.0, 0.0))
}

/// Rounds both coordinates to the nearest multiple of `grid_size`; exact half-cell ties round
/// toward positive infinity.
pub fn snap_to_grid(p: Point, grid_size: f64) -> Point {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return p;
    }
    let snap = |v: f64| (v / grid_size + 0.5).floor() * grid_size;
    point(snap(p.x), snap(p.y))
}
