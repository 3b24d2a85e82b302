use crate::Result;
use crate::connection::{ConnectionPath, connection_path, node_radius};
use crate::viewport::{
    GestureEvent, NodeHit, PointerButton, PointerCapture, ScreenPoint, ViewportController,
    ViewportOptions, ViewportSize,
};
use crate::visibility::{select_visible, visible_connections};
use mindcanvas_core::geom::{Point, node_size};
use mindcanvas_core::model::{
    EdgeKind, find, flatten, normalize_levels, with_node_position, with_positions,
};
use mindcanvas_core::{CanvasConfig, MindmapDocument, Node, Position};
use mindcanvas_layout::{CollisionStats, Graph, LayoutOptions, layout};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct CanvasOptions {
    pub viewport: ViewportOptions,
    pub layout: LayoutOptions,
}

impl CanvasOptions {
    pub fn from_config(config: &CanvasConfig) -> Result<Self> {
        Ok(Self {
            viewport: ViewportOptions::from_config(config)?,
            layout: LayoutOptions::from_config(config)?,
        })
    }
}

/// One frame's worth of visible content, borrowed from a [`Canvas`].
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub nodes: Vec<&'a Node>,
    pub connections: Vec<SceneConnection<'a>>,
}

#[derive(Debug, Clone)]
pub struct SceneConnection<'a> {
    pub from: &'a Node,
    pub to: &'a Node,
    pub label: Option<&'a str>,
    pub kind: EdgeKind,
    /// `None` when the endpoints are too close to draw an edge between their rims.
    pub path: Option<ConnectionPath>,
}

/// A loaded document, its laid-out tree and the viewport looking at it.
///
/// Layout runs on [`Canvas::load`] and [`Canvas::relayout`] only. Node drags move nodes in the
/// laid-out tree through immutable updates and never re-run layout.
#[derive(Debug, Clone)]
pub struct Canvas {
    options: CanvasOptions,
    document: MindmapDocument,
    nodes: Vec<Node>,
    viewport: ViewportController,
    last_layout: Option<CollisionStats>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasOptions::default())
    }
}

impl Canvas {
    pub fn new(options: CanvasOptions) -> Self {
        Self {
            viewport: ViewportController::new(options.viewport.clone()),
            options,
            document: MindmapDocument::default(),
            nodes: Vec::new(),
            last_layout: None,
        }
    }

    /// Replaces the document: ends any gesture, fixes levels, lays out, re-centers and clears
    /// focus. Zoom is kept.
    pub fn load(&mut self, mut document: MindmapDocument, capture: &mut dyn PointerCapture) {
        self.viewport.cancel_gesture(capture);

        let fixed = normalize_levels(&mut document.nodes);
        if fixed > 0 {
            tracing::warn!(fixed, "node levels did not match nesting; rewrote them");
        }

        self.nodes = document.nodes.clone();
        self.document = document;
        self.relayout();
        self.viewport.clear_focus();
        let positions = self.positions();
        self.viewport.center_on(positions);
    }

    /// Runs collision resolution and force relaxation over the current tree.
    pub fn relayout(&mut self) -> CollisionStats {
        let graph = Graph::from_tree(&self.nodes);
        let result = layout(&graph, &self.options.layout);
        let positions: FxHashMap<String, Point> = result.positions.into_iter().collect();
        self.nodes = with_positions(&self.nodes, &positions);
        self.last_layout = Some(result.collision);
        result.collision
    }

    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    /// The document as loaded (levels normalized, positions before layout).
    pub fn document(&self) -> &MindmapDocument {
        &self.document
    }

    /// The laid-out tree including any drags since the last layout.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Copy of the loaded document carrying the current node positions.
    pub fn to_document(&self) -> MindmapDocument {
        MindmapDocument {
            nodes: self.nodes.clone(),
            ..self.document.clone()
        }
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn last_layout(&self) -> Option<CollisionStats> {
        self.last_layout
    }

    fn positions(&self) -> Vec<Point> {
        flatten(&self.nodes).into_iter().map(Node::point).collect()
    }

    pub fn scene(&self) -> Scene<'_> {
        let visible = select_visible(&self.nodes, self.viewport.zoom(), self.viewport.focused());
        let connections = visible_connections(
            &self.nodes,
            &self.document.top_level_connections,
            &visible,
        )
        .into_iter()
        .map(|e| SceneConnection {
            from: e.from,
            to: e.to,
            label: e.label,
            kind: e.kind,
            path: connection_path(
                e.from.point(),
                node_radius(node_size(&e.from.title)),
                e.to.point(),
                node_radius(node_size(&e.to.title)),
            ),
        })
        .collect();
        Scene {
            nodes: visible,
            connections,
        }
    }

    /// Topmost visible node whose ellipse contains the screen point.
    pub fn hit_test(&self, at: ScreenPoint, size: ViewportSize) -> Option<NodeHit> {
        let world = self.viewport.screen_to_world(at, size);
        let visible = select_visible(&self.nodes, self.viewport.zoom(), self.viewport.focused());
        // Later nodes paint on top.
        visible.into_iter().rev().find_map(|n| {
            let s = node_size(&n.title);
            let dx = (world.x - n.position.x) / (s.width / 2.0);
            let dy = (world.y - n.position.y) / (s.height / 2.0);
            (dx * dx + dy * dy <= 1.0).then(|| NodeHit {
                id: n.id.clone(),
                position: n.point(),
            })
        })
    }

    pub fn pointer_down(
        &mut self,
        button: PointerButton,
        at: ScreenPoint,
        size: ViewportSize,
        capture: &mut dyn PointerCapture,
    ) {
        let hit = if button == PointerButton::Primary {
            self.hit_test(at, size)
        } else {
            None
        };
        self.viewport.pointer_down(button, at, hit, capture);
    }

    pub fn pointer_move(&mut self, at: ScreenPoint) -> Vec<GestureEvent> {
        let events = self.viewport.pointer_move(at);
        for event in &events {
            if let GestureEvent::NodeMoved { node_id, position } = event {
                self.nodes = with_node_position(&self.nodes, node_id, Position::from(*position));
            }
        }
        events
    }

    /// Ends the gesture. A click on a node with children focuses it.
    pub fn pointer_up(&mut self, capture: &mut dyn PointerCapture) -> Vec<GestureEvent> {
        let events = self.viewport.pointer_up(capture);
        for event in &events {
            if let GestureEvent::Click { node_id } = event {
                let target = find(&self.nodes, node_id)
                    .filter(|n| n.has_children())
                    .map(Node::point);
                if let Some(position) = target {
                    self.viewport.focus_node(node_id, position);
                }
            }
        }
        events
    }

    pub fn cancel_gesture(&mut self, capture: &mut dyn PointerCapture) -> Vec<GestureEvent> {
        self.viewport.cancel_gesture(capture)
    }

    pub fn wheel(&mut self, delta_y: f64) -> f64 {
        self.viewport.wheel(delta_y)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.viewport.zoom_out()
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.viewport.set_zoom(zoom)
    }

    /// Focuses `id` without moving the view. Returns false when the id is not in the tree.
    pub fn set_focus(&mut self, id: &str) -> bool {
        if find(&self.nodes, id).is_none() {
            return false;
        }
        self.viewport.set_focus(id);
        true
    }

    /// Ends any gesture, re-centers on all nodes at the default zoom and clears focus.
    pub fn reset_view(&mut self, capture: &mut dyn PointerCapture) {
        self.viewport.cancel_gesture(capture);
        let positions = self.positions();
        self.viewport.reset(positions);
    }
}
