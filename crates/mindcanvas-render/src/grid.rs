use crate::viewport::{ViewportSize, ViewportState};
use mindcanvas_core::geom::{Point, point};

pub const DEFAULT_MAX_GRID_DOTS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDot {
    /// World position; a multiple of the grid size on both axes.
    pub position: Point,
    pub is_origin: bool,
}

/// Dots on every grid intersection of the visible world rectangle, plus one cell of margin.
///
/// Produces nothing when the dot count would exceed `max_dots` or `grid_size` is not positive.
pub fn grid_dots(
    state: &ViewportState,
    size: ViewportSize,
    grid_size: f64,
    max_dots: usize,
) -> Vec<GridDot> {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return Vec::new();
    }

    let rect = state.visible_world_rect(size);
    let x0 = ((rect.min.x - grid_size) / grid_size).floor();
    let x1 = ((rect.max.x + grid_size) / grid_size).ceil();
    let y0 = ((rect.min.y - grid_size) / grid_size).floor();
    let y1 = ((rect.max.y + grid_size) / grid_size).ceil();

    let columns = x1 - x0 + 1.0;
    let rows = y1 - y0 + 1.0;
    if !(columns.is_finite() && rows.is_finite()) || columns * rows > max_dots as f64 {
        tracing::debug!(columns, rows, max_dots, "grid too dense; skipping dots");
        return Vec::new();
    }

    let (x0, x1, y0, y1) = (x0 as i64, x1 as i64, y0 as i64, y1 as i64);
    let mut dots = Vec::with_capacity((columns * rows) as usize);
    for ix in x0..=x1 {
        for iy in y0..=y1 {
            dots.push(GridDot {
                position: point(ix as f64 * grid_size, iy as f64 * grid_size),
                is_origin: ix == 0 && iy == 0,
            });
        }
    }
    dots
}
