//! Level-of-detail selection.

use mindcanvas_core::model::{Edge, find, flatten, hierarchy_edges, resolve_connections};
use mindcanvas_core::{Node, TopLevelConnection};
use rustc_hash::FxHashSet;

/// At or below this zoom only root nodes are shown.
pub const OVERVIEW_ZOOM: f64 = 0.7;
pub const MAX_DETAIL_LEVEL: u32 = 9;

/// Deepest level shown at `zoom` when nothing is focused.
///
/// One extra level per 0.1 of zoom above [`OVERVIEW_ZOOM`], capped at [`MAX_DETAIL_LEVEL`].
pub fn max_visible_level(zoom: f64) -> u32 {
    // Written as `!(a > b)` so NaN lands in the overview case.
    if !(zoom > OVERVIEW_ZOOM) {
        return 0;
    }
    let steps = ((zoom - OVERVIEW_ZOOM) * 10.0).floor();
    // float -> int casts saturate; infinite zoom still caps below.
    (steps as u32).saturating_add(1).min(MAX_DETAIL_LEVEL)
}

/// Nodes to render, in [`flatten`] order.
///
/// A focused id that resolves shows exactly that node and its direct children regardless of
/// zoom. An id that does not resolve is ignored.
pub fn select_visible<'a>(nodes: &'a [Node], zoom: f64, focused: Option<&str>) -> Vec<&'a Node> {
    if let Some(id) = focused {
        if let Some(node) = find(nodes, id) {
            let mut out = Vec::with_capacity(1 + node.children.len());
            out.push(node);
            out.extend(node.children.iter());
            return out;
        }
        tracing::trace!(focus = id, "focused node not in tree; falling back to zoom rule");
    }

    let max_level = max_visible_level(zoom);
    flatten(nodes)
        .into_iter()
        .filter(|n| n.level <= max_level)
        .collect()
}

/// Edges among `visible`: hierarchy edges first, then top-level connections between visible
/// root nodes. Connections naming unknown ids are dropped.
pub fn visible_connections<'a>(
    nodes: &'a [Node],
    top_level: &'a [TopLevelConnection],
    visible: &[&Node],
) -> Vec<Edge<'a>> {
    let shown: FxHashSet<&str> = visible.iter().map(|n| n.id.as_str()).collect();
    let both_shown =
        |e: &Edge<'_>| shown.contains(e.from.id.as_str()) && shown.contains(e.to.id.as_str());

    let mut out: Vec<Edge<'a>> = hierarchy_edges(nodes)
        .into_iter()
        .filter(|e| both_shown(e))
        .collect();
    out.extend(
        resolve_connections(nodes, top_level)
            .into_iter()
            .filter(|e| e.from.level == 0 && e.to.level == 0 && both_shown(e)),
    );
    out
}
