//! Pan/zoom state and the pointer gesture state machine.
//!
//! World coordinates are the document's node positions. Screen coordinates are pixels of the
//! host surface, origin top-left. The mapping is
//! `screen = (width / 2 + pan.x, height / 2 + pan.y) + world * zoom`.

use crate::{Error, Result};
use mindcanvas_core::CanvasConfig;
use mindcanvas_core::geom::{Box2D, Point, Unit, Vector, bounding_center, snap_to_grid, vector};

/// Unit tag for host pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSpace;

pub type ScreenPoint = euclid::Point2D<f64, ScreenSpace>;
pub type ScreenVector = euclid::Vector2D<f64, ScreenSpace>;

pub fn screen_point(x: f64, y: f64) -> ScreenPoint {
    euclid::point2(x, y)
}

/// Multiplicative zoom factors for one step in each direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomStep {
    pub zoom_in: f64,
    pub zoom_out: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom used initially and by [`ViewportController::reset`].
    pub default_zoom: f64,
    pub wheel_step: ZoomStep,
    pub button_step: ZoomStep,
    /// Screen distance a press must travel before a node drag starts.
    pub drag_threshold: f64,
    pub grid_size: f64,
    pub snap_to_grid: bool,
    /// Extra leftward pan applied when centering on content.
    pub reset_horizontal_bias: f64,
    pub focus_zoom_factor: f64,
    /// Zooming out to below this clears the focused node.
    pub focus_release_zoom: f64,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0.3,
            max_zoom: 3.0,
            default_zoom: 0.7,
            wheel_step: ZoomStep {
                zoom_in: 1.1,
                zoom_out: 0.9,
            },
            button_step: ZoomStep {
                zoom_in: 1.2,
                zoom_out: 0.8,
            },
            drag_threshold: 5.0,
            grid_size: 50.0,
            snap_to_grid: true,
            reset_horizontal_bias: 200.0,
            focus_zoom_factor: 1.5,
            focus_release_zoom: 1.0,
        }
    }
}

impl ViewportOptions {
    /// Reads `viewport.*` overrides over the defaults and validates the result.
    pub fn from_config(config: &CanvasConfig) -> Result<Self> {
        let mut opts = Self::default();
        let f64_keys: [(&str, &mut f64); 11] = [
            ("viewport.minZoom", &mut opts.min_zoom),
            ("viewport.maxZoom", &mut opts.max_zoom),
            ("viewport.defaultZoom", &mut opts.default_zoom),
            ("viewport.wheelStep.in", &mut opts.wheel_step.zoom_in),
            ("viewport.wheelStep.out", &mut opts.wheel_step.zoom_out),
            ("viewport.buttonStep.in", &mut opts.button_step.zoom_in),
            ("viewport.buttonStep.out", &mut opts.button_step.zoom_out),
            ("viewport.dragThreshold", &mut opts.drag_threshold),
            ("viewport.gridSize", &mut opts.grid_size),
            ("viewport.resetHorizontalBias", &mut opts.reset_horizontal_bias),
            ("viewport.focusZoomFactor", &mut opts.focus_zoom_factor),
        ];
        for (key, slot) in f64_keys {
            if let Some(v) = config.get_f64(key)? {
                *slot = v;
            }
        }
        if let Some(v) = config.get_bool("viewport.snapToGrid")? {
            opts.snap_to_grid = v;
        }
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidViewport { message });

        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom && self.max_zoom.is_finite()) {
            return invalid(format!(
                "zoom range [{}, {}] must be positive and ordered",
                self.min_zoom, self.max_zoom
            ));
        }
        for (name, step) in [("wheel", self.wheel_step), ("button", self.button_step)] {
            if !(step.zoom_in > 0.0 && step.zoom_out > 0.0) {
                return invalid(format!("{name} zoom steps must be positive"));
            }
        }
        if self.drag_threshold < 0.0 {
            return invalid("drag threshold must not be negative".to_string());
        }
        if !(self.focus_zoom_factor > 0.0) {
            return invalid("focus zoom factor must be positive".to_string());
        }
        Ok(())
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Host surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn half(self) -> ScreenVector {
        euclid::vec2(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub pan: Vector,
    pub zoom: f64,
}

impl ViewportState {
    fn offset(&self, size: ViewportSize) -> ScreenVector {
        size.half() + self.pan.cast_unit::<ScreenSpace>()
    }

    pub fn world_to_screen(&self, p: Point, size: ViewportSize) -> ScreenPoint {
        let scaled = (p.to_vector() * self.zoom).cast_unit::<ScreenSpace>();
        ScreenPoint::origin() + self.offset(size) + scaled
    }

    pub fn screen_to_world(&self, p: ScreenPoint, size: ViewportSize) -> Point {
        let local = (p - self.offset(size)).to_vector().cast_unit::<Unit>();
        Point::origin() + local / self.zoom
    }

    /// World rectangle covered by the whole surface.
    pub fn visible_world_rect(&self, size: ViewportSize) -> Box2D {
        let top_left = self.screen_to_world(screen_point(0.0, 0.0), size);
        let bottom_right = self.screen_to_world(screen_point(size.width, size.height), size);
        Box2D::new(top_left, bottom_right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// A node under the pointer at press time.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHit {
    pub id: String,
    pub position: Point,
}

/// Whole-surface pointer capture owned by the host (document-level listeners, OS capture, ...).
///
/// The controller calls `acquire` when a pan or node press starts and `release` exactly once
/// when that gesture ends, however it ends.
pub trait PointerCapture {
    fn acquire(&mut self);
    fn release(&mut self);
}

/// Capture for hosts that deliver every pointer event anyway.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Panning {
        last: ScreenPoint,
    },
    NodeDragging {
        node_id: String,
        press: ScreenPoint,
        /// Node position at press time.
        origin: Point,
        /// Set once the pointer has travelled past the drag threshold.
        active: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Panned { pan: Vector },
    DragStart { node_id: String },
    NodeMoved { node_id: String, position: Point },
    DragEnd { node_id: String },
    /// Press and release on a node without crossing the drag threshold.
    Click { node_id: String },
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    options: ViewportOptions,
    state: ViewportState,
    focused: Option<String>,
    gesture: Gesture,
    captured: bool,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportOptions::default())
    }
}

impl ViewportController {
    pub fn new(options: ViewportOptions) -> Self {
        let zoom = options.clamp_zoom(options.default_zoom);
        Self {
            options,
            state: ViewportState {
                pan: Vector::zero(),
                zoom,
            },
            focused: None,
            gesture: Gesture::Idle,
            captured: false,
        }
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn pan(&self) -> Vector {
        self.state.pan
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_capturing(&self) -> bool {
        self.captured
    }

    pub fn pointer_down(
        &mut self,
        button: PointerButton,
        at: ScreenPoint,
        hit: Option<NodeHit>,
        capture: &mut dyn PointerCapture,
    ) {
        if button != PointerButton::Primary || self.gesture != Gesture::Idle {
            return;
        }

        self.gesture = match hit {
            Some(NodeHit { id, position }) => {
                tracing::trace!(node = %id, "node press");
                Gesture::NodeDragging {
                    node_id: id,
                    press: at,
                    origin: position,
                    active: false,
                }
            }
            None => {
                tracing::trace!(x = at.x, y = at.y, "pan start");
                Gesture::Panning { last: at }
            }
        };
        self.acquire(capture);
    }

    pub fn pointer_move(&mut self, at: ScreenPoint) -> Vec<GestureEvent> {
        let zoom = self.state.zoom;
        match &mut self.gesture {
            Gesture::Idle => Vec::new(),
            Gesture::Panning { last } => {
                let delta = (at - *last).cast_unit::<Unit>();
                *last = at;
                self.state.pan += delta / zoom;
                vec![GestureEvent::Panned {
                    pan: self.state.pan,
                }]
            }
            Gesture::NodeDragging {
                node_id,
                press,
                origin,
                active,
            } => {
                let total = at - *press;
                let mut events = Vec::new();
                if !*active {
                    if total.length() <= self.options.drag_threshold {
                        return events;
                    }
                    *active = true;
                    tracing::debug!(node = %node_id, "drag start");
                    events.push(GestureEvent::DragStart {
                        node_id: node_id.clone(),
                    });
                }

                let moved = *origin + total.cast_unit::<Unit>() / zoom;
                let position = if self.options.snap_to_grid {
                    snap_to_grid(moved, self.options.grid_size)
                } else {
                    moved
                };
                events.push(GestureEvent::NodeMoved {
                    node_id: node_id.clone(),
                    position,
                });
                events
            }
        }
    }

    /// Ends the current gesture. Any release ends it, wherever the pointer is.
    pub fn pointer_up(&mut self, capture: &mut dyn PointerCapture) -> Vec<GestureEvent> {
        let events = match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => Vec::new(),
            Gesture::Panning { .. } => {
                tracing::trace!("pan end");
                Vec::new()
            }
            Gesture::NodeDragging {
                node_id, active, ..
            } => {
                if active {
                    tracing::debug!(node = %node_id, "drag end");
                    vec![GestureEvent::DragEnd { node_id }]
                } else {
                    vec![GestureEvent::Click { node_id }]
                }
            }
        };
        self.release(capture);
        events
    }

    /// Abandons the current gesture without a click. An active drag still reports `DragEnd`.
    pub fn cancel_gesture(&mut self, capture: &mut dyn PointerCapture) -> Vec<GestureEvent> {
        let events = match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::NodeDragging {
                node_id,
                active: true,
                ..
            } => vec![GestureEvent::DragEnd { node_id }],
            _ => Vec::new(),
        };
        self.release(capture);
        events
    }

    /// Wheel zoom: positive `delta_y` zooms out, negative zooms in, zero does nothing.
    pub fn wheel(&mut self, delta_y: f64) -> f64 {
        let factor = if delta_y > 0.0 {
            self.options.wheel_step.zoom_out
        } else if delta_y < 0.0 {
            self.options.wheel_step.zoom_in
        } else {
            return self.state.zoom;
        };
        self.set_zoom(self.state.zoom * factor)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.state.zoom * self.options.button_step.zoom_in)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.state.zoom * self.options.button_step.zoom_out)
    }

    /// Clamps and applies `zoom`. Zooming out to below `focus_release_zoom` clears the focus;
    /// zooming in never does.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let zooming_out = !(zoom >= self.state.zoom);
        self.state.zoom = self.options.clamp_zoom(zoom);
        if zooming_out && self.state.zoom < self.options.focus_release_zoom && self.focused.is_some()
        {
            tracing::trace!(zoom = self.state.zoom, "zoomed out of focus");
            self.focused = None;
        }
        self.state.zoom
    }

    pub fn set_pan(&mut self, pan: Vector) {
        self.state.pan = pan;
    }

    /// Centers on the content and restores the default zoom. Clears focus.
    pub fn reset(&mut self, positions: impl IntoIterator<Item = Point>) {
        self.state.pan = self.centering_pan(positions);
        self.state.zoom = self.options.clamp_zoom(self.options.default_zoom);
        self.focused = None;
    }

    /// Centers on the content, keeping the zoom.
    pub fn center_on(&mut self, positions: impl IntoIterator<Item = Point>) {
        self.state.pan = self.centering_pan(positions);
    }

    fn centering_pan(&self, positions: impl IntoIterator<Item = Point>) -> Vector {
        let center = bounding_center(positions);
        -center.to_vector() - vector(self.options.reset_horizontal_bias, 0.0)
    }

    /// Focuses a node: pans onto it and zooms in by `focus_zoom_factor`, up to `max_zoom`.
    pub fn focus_node(&mut self, id: &str, position: Point) {
        self.focused = Some(id.to_string());
        self.state.pan = -position.to_vector();
        self.state.zoom = self
            .options
            .clamp_zoom((self.state.zoom * self.options.focus_zoom_factor).min(self.options.max_zoom));
        tracing::debug!(node = id, zoom = self.state.zoom, "focus");
    }

    /// Focuses a node without moving the view.
    pub fn set_focus(&mut self, id: &str) {
        self.focused = Some(id.to_string());
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    pub fn world_to_screen(&self, p: Point, size: ViewportSize) -> ScreenPoint {
        self.state.world_to_screen(p, size)
    }

    pub fn screen_to_world(&self, p: ScreenPoint, size: ViewportSize) -> Point {
        self.state.screen_to_world(p, size)
    }

    pub fn visible_world_rect(&self, size: ViewportSize) -> Box2D {
        self.state.visible_world_rect(size)
    }

    /// Applies grid snapping when enabled.
    pub fn snap(&self, p: Point) -> Point {
        if self.options.snap_to_grid {
            snap_to_grid(p, self.options.grid_size)
        } else {
            p
        }
    }

    fn acquire(&mut self, capture: &mut dyn PointerCapture) {
        if !self.captured {
            capture.acquire();
            self.captured = true;
        }
    }

    fn release(&mut self, capture: &mut dyn PointerCapture) {
        if self.captured {
            capture.release();
            self.captured = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcanvas_core::geom::point;
    use serde_json::json;

    #[derive(Default)]
    struct CountingCapture {
        acquired: usize,
        released: usize,
    }

    impl PointerCapture for CountingCapture {
        fn acquire(&mut self) {
            self.acquired += 1;
        }
        fn release(&mut self) {
            self.released += 1;
        }
    }

    fn hit(id: &str, x: f64, y: f64) -> Option<NodeHit> {
        Some(NodeHit {
            id: id.to_string(),
            position: point(x, y),
        })
    }

    #[test]
    fn starts_at_default_zoom() {
        let vc = ViewportController::default();
        assert_eq!(vc.zoom(), 0.7);
        assert_eq!(vc.pan(), Vector::zero());
        assert_eq!(vc.gesture(), &Gesture::Idle);
    }

    #[test]
    fn pan_delta_is_divided_by_zoom() {
        let mut vc = ViewportController::default();
        vc.set_zoom(2.0);
        let mut cap = CountingCapture::default();
        vc.pointer_down(PointerButton::Primary, screen_point(10.0, 10.0), None, &mut cap);
        let events = vc.pointer_move(screen_point(30.0, 0.0));
        assert_eq!(
            events,
            vec![GestureEvent::Panned {
                pan: vector(10.0, -5.0)
            }]
        );
        vc.pointer_move(screen_point(40.0, 0.0));
        assert_eq!(vc.pan(), vector(15.0, -5.0));
        vc.pointer_up(&mut cap);
        assert_eq!(vc.gesture(), &Gesture::Idle);
    }

    #[test]
    fn short_press_on_node_is_a_click() {
        let mut vc = ViewportController::default();
        let mut cap = CountingCapture::default();
        vc.pointer_down(
            PointerButton::Primary,
            screen_point(0.0, 0.0),
            hit("n", 0.0, 0.0),
            &mut cap,
        );
        assert!(vc.pointer_move(screen_point(3.0, 4.0)).is_empty());
        let events = vc.pointer_up(&mut cap);
        assert_eq!(
            events,
            vec![GestureEvent::Click {
                node_id: "n".to_string()
            }]
        );
    }

    #[test]
    fn drag_starts_past_threshold_and_snaps() {
        let mut vc = ViewportController::default();
        vc.set_zoom(1.0);
        let mut cap = CountingCapture::default();
        vc.pointer_down(
            PointerButton::Primary,
            screen_point(0.0, 0.0),
            hit("n", 100.0, 100.0),
            &mut cap,
        );
        let events = vc.pointer_move(screen_point(6.0, 0.0));
        assert_eq!(
            events,
            vec![
                GestureEvent::DragStart {
                    node_id: "n".to_string()
                },
                // 106 snaps back to 100 on a 50 grid.
                GestureEvent::NodeMoved {
                    node_id: "n".to_string(),
                    position: point(100.0, 100.0)
                },
            ]
        );

        let events = vc.pointer_move(screen_point(30.0, -30.0));
        assert_eq!(
            events,
            vec![GestureEvent::NodeMoved {
                node_id: "n".to_string(),
                position: point(150.0, 50.0)
            }]
        );

        let events = vc.pointer_up(&mut cap);
        assert_eq!(
            events,
            vec![GestureEvent::DragEnd {
                node_id: "n".to_string()
            }]
        );
    }

    #[test]
    fn drag_onto_a_negative_half_cell_snaps_upward() {
        let mut vc = ViewportController::default();
        vc.set_zoom(1.0);
        let mut cap = NoCapture;
        vc.pointer_down(
            PointerButton::Primary,
            screen_point(0.0, 0.0),
            hit("n", 0.0, 0.0),
            &mut cap,
        );
        let events = vc.pointer_move(screen_point(-25.0, -75.0));
        assert_eq!(
            events.last(),
            Some(&GestureEvent::NodeMoved {
                node_id: "n".to_string(),
                position: point(0.0, -50.0)
            })
        );
    }

    #[test]
    fn drag_delta_is_divided_by_zoom_without_snap() {
        let mut vc = ViewportController::new(ViewportOptions {
            snap_to_grid: false,
            ..Default::default()
        });
        vc.set_zoom(2.0);
        let mut cap = NoCapture;
        vc.pointer_down(
            PointerButton::Primary,
            screen_point(0.0, 0.0),
            hit("n", 10.0, 10.0),
            &mut cap,
        );
        let events = vc.pointer_move(screen_point(20.0, 40.0));
        assert_eq!(
            events.last(),
            Some(&GestureEvent::NodeMoved {
                node_id: "n".to_string(),
                position: point(20.0, 30.0)
            })
        );
    }

    #[test]
    fn exactly_threshold_is_not_a_drag() {
        let mut vc = ViewportController::default();
        let mut cap = NoCapture;
        vc.pointer_down(
            PointerButton::Primary,
            screen_point(0.0, 0.0),
            hit("n", 0.0, 0.0),
            &mut cap,
        );
        assert!(vc.pointer_move(screen_point(5.0, 0.0)).is_empty());
    }

    #[test]
    fn secondary_button_and_nested_presses_are_ignored() {
        let mut vc = ViewportController::default();
        let mut cap = CountingCapture::default();
        vc.pointer_down(PointerButton::Secondary, screen_point(0.0, 0.0), None, &mut cap);
        assert_eq!(vc.gesture(), &Gesture::Idle);
        assert_eq!(cap.acquired, 0);

        vc.pointer_down(
            PointerButton::Primary,
            screen_point(0.0, 0.0),
            hit("n", 0.0, 0.0),
            &mut cap,
        );
        vc.pointer_down(PointerButton::Primary, screen_point(50.0, 50.0), None, &mut cap);
        assert!(matches!(vc.gesture(), Gesture::NodeDragging { .. }));
        assert_eq!(cap.acquired, 1);
    }

    #[test]
    fn capture_is_released_exactly_once() {
        let mut vc = ViewportController::default();
        let mut cap = CountingCapture::default();

        vc.pointer_down(PointerButton::Primary, screen_point(0.0, 0.0), None, &mut cap);
        assert!(vc.is_capturing());
        vc.pointer_up(&mut cap);
        vc.pointer_up(&mut cap);
        vc.cancel_gesture(&mut cap);
        assert_eq!((cap.acquired, cap.released), (1, 1));

        vc.pointer_down(
            PointerButton::Primary,
            screen_point(0.0, 0.0),
            hit("n", 0.0, 0.0),
            &mut cap,
        );
        vc.pointer_move(screen_point(50.0, 0.0));
        let events = vc.cancel_gesture(&mut cap);
        assert_eq!(
            events,
            vec![GestureEvent::DragEnd {
                node_id: "n".to_string()
            }]
        );
        vc.pointer_up(&mut cap);
        assert_eq!((cap.acquired, cap.released), (2, 2));
        assert!(!vc.is_capturing());
    }

    #[test]
    fn cancel_of_pending_press_emits_nothing() {
        let mut vc = ViewportController::default();
        let mut cap = NoCapture;
        vc.pointer_down(
            PointerButton::Primary,
            screen_point(0.0, 0.0),
            hit("n", 0.0, 0.0),
            &mut cap,
        );
        assert!(vc.cancel_gesture(&mut cap).is_empty());
    }

    #[test]
    fn zoom_is_clamped_to_one_range() {
        let mut vc = ViewportController::default();
        for _ in 0..50 {
            vc.zoom_in();
        }
        assert_eq!(vc.zoom(), 3.0);
        for _ in 0..50 {
            vc.wheel(1.0);
        }
        assert_eq!(vc.zoom(), 0.3);
        assert_eq!(vc.set_zoom(f64::NAN), 0.3);
    }

    #[test]
    fn wheel_direction_and_steps() {
        let mut vc = ViewportController::default();
        vc.set_zoom(1.0);
        assert!((vc.wheel(-120.0) - 1.1).abs() < 1e-12);
        vc.set_zoom(1.0);
        assert!((vc.wheel(120.0) - 0.9).abs() < 1e-12);
        assert!((vc.wheel(0.0) - 0.9).abs() < 1e-12);
        vc.set_zoom(1.0);
        assert!((vc.zoom_out() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn zooming_below_one_clears_focus() {
        let mut vc = ViewportController::default();
        vc.set_zoom(2.0);
        vc.focus_node("n", point(10.0, 20.0));
        assert_eq!(vc.focused(), Some("n"));
        assert_eq!(vc.zoom(), 3.0);
        assert_eq!(vc.pan(), vector(-10.0, -20.0));

        vc.zoom_out();
        assert_eq!(vc.focused(), Some("n"));
        vc.set_zoom(0.99);
        assert_eq!(vc.focused(), None);
    }

    #[test]
    fn zooming_in_below_one_keeps_focus() {
        let mut vc = ViewportController::default();
        vc.set_zoom(0.3);
        vc.focus_node("n", point(0.0, 0.0));
        assert!((vc.zoom() - 0.45).abs() < 1e-12);

        vc.zoom_in();
        assert!((vc.zoom() - 0.54).abs() < 1e-12);
        assert_eq!(vc.focused(), Some("n"));
        vc.wheel(-1.0);
        assert_eq!(vc.focused(), Some("n"));

        vc.wheel(1.0);
        assert_eq!(vc.focused(), None);
    }

    #[test]
    fn zooming_out_at_the_minimum_still_clears_focus() {
        let mut vc = ViewportController::default();
        vc.set_zoom(0.3);
        vc.set_focus("n");
        assert_eq!(vc.zoom_out(), 0.3);
        assert_eq!(vc.focused(), None);
    }

    #[test]
    fn focus_keeps_low_zoom_when_already_zoomed_out() {
        let mut vc = ViewportController::default();
        vc.focus_node("n", point(0.0, 0.0));
        assert!((vc.zoom() - 1.05).abs() < 1e-12);
        assert_eq!(vc.focused(), Some("n"));
    }

    #[test]
    fn reset_centers_with_bias_and_default_zoom() {
        let mut vc = ViewportController::default();
        vc.set_zoom(2.5);
        vc.focus_node("n", point(0.0, 0.0));
        vc.reset([point(0.0, 0.0), point(400.0, 200.0)]);
        assert_eq!(vc.pan(), vector(-400.0, -100.0));
        assert_eq!(vc.zoom(), 0.7);
        assert_eq!(vc.focused(), None);
    }

    #[test]
    fn center_on_nothing_uses_origin() {
        let mut vc = ViewportController::default();
        vc.set_zoom(1.5);
        vc.center_on(std::iter::empty());
        assert_eq!(vc.pan(), vector(-200.0, 0.0));
        assert_eq!(vc.zoom(), 1.5);
    }

    #[test]
    fn screen_and_world_round_trip() {
        let mut vc = ViewportController::default();
        vc.set_zoom(2.0);
        vc.set_pan(vector(-50.0, 25.0));
        let size = ViewportSize::new(800.0, 600.0);

        let s = vc.world_to_screen(point(10.0, 10.0), size);
        assert_eq!(s, screen_point(400.0 - 50.0 + 20.0, 300.0 + 25.0 + 20.0));
        assert_eq!(vc.screen_to_world(s, size), point(10.0, 10.0));

        let rect = vc.visible_world_rect(size);
        assert_eq!(rect.min, point(-175.0, -162.5));
        assert_eq!(rect.max, point(225.0, 137.5));
    }

    #[test]
    fn snap_respects_the_toggle() {
        let vc = ViewportController::default();
        assert_eq!(vc.snap(point(74.0, 76.0)), point(50.0, 100.0));
        let vc = ViewportController::new(ViewportOptions {
            snap_to_grid: false,
            ..Default::default()
        });
        assert_eq!(vc.snap(point(74.0, 76.0)), point(74.0, 76.0));
    }

    #[test]
    fn options_from_config() {
        let cfg = CanvasConfig::from_value(json!({
            "viewport": {
                "maxZoom": 5.0,
                "wheelStep": {"in": 1.25},
                "snapToGrid": false,
                "gridSize": 25
            }
        }));
        let opts = ViewportOptions::from_config(&cfg).expect("options");
        assert_eq!(opts.max_zoom, 5.0);
        assert_eq!(opts.wheel_step.zoom_in, 1.25);
        assert_eq!(opts.wheel_step.zoom_out, 0.9);
        assert!(!opts.snap_to_grid);
        assert_eq!(opts.grid_size, 25.0);
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let cfg = CanvasConfig::from_value(json!({"viewport": {"minZoom": 4.0}}));
        assert!(matches!(
            ViewportOptions::from_config(&cfg),
            Err(Error::InvalidViewport { .. })
        ));
        let cfg = CanvasConfig::from_value(json!({"viewport": {"snapToGrid": "yes"}}));
        assert!(matches!(
            ViewportOptions::from_config(&cfg),
            Err(Error::Core(_))
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn snapping_is_idempotent(x in -1.0e6f64..1.0e6, y in -1.0e6f64..1.0e6, g in 1.0f64..200.0) {
                let once = snap_to_grid(point(x, y), g);
                prop_assert_eq!(snap_to_grid(once, g), once);
            }

            #[test]
            fn pan_covers_the_same_world_distance_at_any_zoom_and_pan(
                zoom in 0.3f64..3.0,
                px in -1.0e4f64..1.0e4,
                py in -1.0e4f64..1.0e4,
                dx in -500.0f64..500.0,
                dy in -500.0f64..500.0,
            ) {
                let mut vc = ViewportController::default();
                vc.set_zoom(zoom);
                vc.set_pan(vector(px, py));
                let mut cap = NoCapture;
                vc.pointer_down(PointerButton::Primary, screen_point(0.0, 0.0), None, &mut cap);
                vc.pointer_move(screen_point(dx, dy));
                vc.pointer_up(&mut cap);
                let moved = vc.pan() - vector(px, py);
                prop_assert!((moved - vector(dx / zoom, dy / zoom)).length() < 1e-6);
            }
        }
    }
}
