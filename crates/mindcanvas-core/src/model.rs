use crate::geom::{Point, point};
use crate::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        point(self.x, self.y)
    }
}

impl From<Point> for Position {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Position> for Point {
    fn from(p: Position) -> Self {
        p.to_point()
    }
}

/// One mindmap node. A node owns its children; `parent` is only a back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_label: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>, level: u32, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            level,
            position: Position::new(x, y),
            children: Vec::new(),
            parent: None,
            color: None,
            relationship_label: None,
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn point(&self) -> Point {
        self.position.to_point()
    }
}

/// Non-hierarchical edge between two root nodes, by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLevelConnection {
    pub from: NodeId,
    pub to: NodeId,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub last_modified: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    pub node_spacing: f64,
    pub level_spacing: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// `level0`, `level1`, ... to CSS colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_colors: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutSettings>,
}

/// A complete mindmap document: root nodes, top-level connections and optional settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindmapDocument {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub top_level_connections: Vec<TopLevelConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

impl MindmapDocument {
    pub fn new(nodes: Vec<Node>, top_level_connections: Vec<TopLevelConnection>) -> Self {
        Self {
            nodes,
            top_level_connections,
            ..Default::default()
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let out = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(out)
    }

    /// Strict checks: unique ids and consistent levels.
    pub fn validate(&self) -> Result<()> {
        validate_unique_ids(&self.nodes)?;
        validate_levels(&self.nodes)
    }
}

/// Pre-order depth-first listing: every node precedes its children, siblings keep their order.
pub fn flatten(nodes: &[Node]) -> Vec<&Node> {
    fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a Node>) {
        for n in nodes {
            out.push(n);
            walk(&n.children, out);
        }
    }

    let mut out = Vec::new();
    walk(nodes, &mut out);
    out
}

/// First node with `id` in [`flatten`] order.
pub fn find<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    for n in nodes {
        if n.id == id {
            return Some(n);
        }
        if let Some(found) = find(&n.children, id) {
            return Some(found);
        }
    }
    None
}

/// Id lookup over the flattened tree. Duplicate ids resolve to their first occurrence.
pub fn index_by_id(nodes: &[Node]) -> FxHashMap<&str, &Node> {
    let flat = flatten(nodes);
    let mut index: FxHashMap<&str, &Node> = FxHashMap::default();
    index.reserve(flat.len());
    for n in flat {
        index.entry(n.id.as_str()).or_insert(n);
    }
    index
}

pub fn validate_levels(nodes: &[Node]) -> Result<()> {
    fn walk(nodes: &[Node], expected: u32) -> Result<()> {
        for n in nodes {
            if n.level != expected {
                return Err(Error::LevelMismatch {
                    id: n.id.clone(),
                    expected,
                    found: n.level,
                });
            }
            walk(&n.children, expected + 1)?;
        }
        Ok(())
    }
    walk(nodes, 0)
}

/// Rewrites every level from the nesting depth. Returns how many nodes changed.
pub fn normalize_levels(nodes: &mut [Node]) -> usize {
    fn walk(nodes: &mut [Node], expected: u32) -> usize {
        let mut fixed = 0;
        for n in nodes {
            if n.level != expected {
                n.level = expected;
                fixed += 1;
            }
            fixed += walk(&mut n.children, expected + 1);
        }
        fixed
    }
    walk(nodes, 0)
}

pub fn validate_unique_ids(nodes: &[Node]) -> Result<()> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for n in flatten(nodes) {
        if !seen.insert(n.id.as_str()) {
            return Err(Error::DuplicateNodeId { id: n.id.clone() });
        }
    }
    Ok(())
}

/// Returns a new tree where the node(s) with `id` sit at `position`. The input is untouched.
pub fn with_node_position(nodes: &[Node], id: &str, position: Position) -> Vec<Node> {
    nodes
        .iter()
        .map(|n| {
            let mut out = Node {
                children: with_node_position(&n.children, id, position),
                ..n.clone_shallow()
            };
            if n.id == id {
                out.position = position;
            }
            out
        })
        .collect()
}

/// Returns a new tree with every node listed in `positions` moved.
pub fn with_positions(nodes: &[Node], positions: &FxHashMap<String, Point>) -> Vec<Node> {
    nodes
        .iter()
        .map(|n| {
            let mut out = Node {
                children: with_positions(&n.children, positions),
                ..n.clone_shallow()
            };
            if let Some(p) = positions.get(n.id.as_str()) {
                out.position = Position::from(*p);
            }
            out
        })
        .collect()
}

impl Node {
    fn clone_shallow(&self) -> Node {
        Node {
            id: self.id.clone(),
            title: self.title.clone(),
            level: self.level,
            position: self.position,
            children: Vec::new(),
            parent: self.parent.clone(),
            color: self.color.clone(),
            relationship_label: self.relationship_label.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Hierarchy,
    TopLevel,
}

/// An edge with both endpoints resolved against the tree.
#[derive(Debug, Clone, Copy)]
pub struct Edge<'a> {
    pub from: &'a Node,
    pub to: &'a Node,
    pub label: Option<&'a str>,
    pub kind: EdgeKind,
}

/// Parent → child edges. Nesting defines the parent; a root whose `parent` names another node
/// gets an edge from that node when the id resolves.
pub fn hierarchy_edges(nodes: &[Node]) -> Vec<Edge<'_>> {
    fn walk<'a>(owner: &'a Node, out: &mut Vec<Edge<'a>>) {
        for child in &owner.children {
            out.push(Edge {
                from: owner,
                to: child,
                label: child.relationship_label.as_deref(),
                kind: EdgeKind::Hierarchy,
            });
            walk(child, out);
        }
    }

    let index = index_by_id(nodes);
    let mut out = Vec::new();
    for root in nodes {
        if let Some(parent_id) = root.parent.as_deref() {
            match index.get(parent_id) {
                Some(&parent) if !std::ptr::eq(parent, root) => out.push(Edge {
                    from: parent,
                    to: root,
                    label: root.relationship_label.as_deref(),
                    kind: EdgeKind::Hierarchy,
                }),
                _ => {
                    tracing::trace!(node = %root.id, parent = parent_id, "dropping dangling parent reference");
                }
            }
        }
        walk(root, &mut out);
    }
    out
}

/// Top-level connections whose endpoints both resolve. Dangling ids are dropped.
pub fn resolve_connections<'a>(
    nodes: &'a [Node],
    connections: &'a [TopLevelConnection],
) -> Vec<Edge<'a>> {
    let index = index_by_id(nodes);
    connections
        .iter()
        .filter_map(|c| {
            let from = *index.get(c.from.as_str())?;
            let to = *index.get(c.to.as_str())?;
            Some(Edge {
                from,
                to,
                label: Some(c.label.as_str()),
                kind: EdgeKind::TopLevel,
            })
        })
        .collect()
}
