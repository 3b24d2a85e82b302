use crate::algo::CollisionStats;
use indexmap::IndexMap;
use mindcanvas_core::geom::{Box2D, Point, Size, Vector, padded_box, point};

#[derive(Debug, Clone)]
pub struct Graph {
    pub nodes: Vec<Node>,
}

impl Graph {
    /// Builds the layout input from a flattened document tree.
    pub fn from_tree(nodes: &[mindcanvas_core::Node]) -> Self {
        Self {
            nodes: mindcanvas_core::model::flatten(nodes)
                .into_iter()
                .map(|n| {
                    let size = mindcanvas_core::geom::node_size(&n.title);
                    Node::new(
                        n.id.clone(),
                        n.level,
                        size.width,
                        size.height,
                        n.position.x,
                        n.position.y,
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub level: u32,
    /// Unpadded node size; collision padding is applied by the resolver.
    pub width: f64,
    pub height: f64,
    /// Center position.
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, level: u32, width: f64, height: f64, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            level,
            width,
            height,
            x,
            y,
        }
    }

    pub fn center(&self) -> Point {
        point(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self, padding: f64) -> Box2D {
        padded_box(self.center(), self.size(), padding)
    }

    pub fn moved_to(&self, p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            ..self.clone()
        }
    }

    pub(crate) fn set_center(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    pub(crate) fn translate(&mut self, d: Vector) {
        self.x += d.x;
        self.y += d.y;
    }
}

#[derive(Debug, Clone)]
pub struct LayoutResult {
    /// Final center per node id, in input order.
    pub positions: IndexMap<String, Point>,
    pub collision: CollisionStats,
}
