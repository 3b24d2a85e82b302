//! Generated sample documents: full ternary trees with chained root connections.

use crate::model::{
    LayoutSettings, Metadata, MindmapDocument, Node, Settings, TopLevelConnection,
};
use indexmap::IndexMap;

const NODES_PER_LEVEL: usize = 3;
const LEVEL_SPACING: f64 = 200.0;
const NODE_SPACING: f64 = 300.0;

const LEVEL_PALETTE: [&str; 9] = [
    "#3B82F6", "#60A5FA", "#93C5FD", "#BFDBFE", "#93C5FD", "#60A5FA", "#3B82F6", "#2563EB",
    "#1D4ED8",
];

/// Default fill for a hierarchy depth; cycles through a 9-entry blue palette.
pub fn level_color(level: u32) -> &'static str {
    LEVEL_PALETTE[level as usize % LEVEL_PALETTE.len()]
}

/// Builds a full ternary tree `max_levels` deep with chained top-level connections.
///
/// `created` is used for both `created` and `lastModified` so callers control the timestamp.
pub fn sample_document(max_levels: u32, created: &str) -> MindmapDocument {
    let nodes = level_nodes(None, 0, max_levels, 0.0, 0.0);

    let top_level_connections = nodes
        .windows(2)
        .map(|pair| TopLevelConnection {
            from: pair[0].id.clone(),
            to: pair[1].id.clone(),
            label: "related to".to_string(),
        })
        .collect();

    let default_colors: IndexMap<String, String> = LEVEL_PALETTE
        .iter()
        .enumerate()
        .map(|(i, c)| (format!("level{i}"), (*c).to_string()))
        .collect();

    MindmapDocument {
        metadata: Metadata {
            title: format!("Dynamic Mindmap ({max_levels} levels)"),
            description: Some(format!(
                "A dynamically generated mindmap with up to {max_levels} levels"
            )),
            version: "1.0.0".to_string(),
            created: created.to_string(),
            last_modified: created.to_string(),
        },
        nodes,
        top_level_connections,
        settings: Some(Settings {
            default_colors: Some(default_colors),
            layout: Some(LayoutSettings {
                node_spacing: 200.0,
                level_spacing: 150.0,
            }),
        }),
    }
}

fn level_nodes(
    parent_id: Option<&str>,
    level: u32,
    max_levels: u32,
    x_offset: f64,
    y_offset: f64,
) -> Vec<Node> {
    if level >= max_levels {
        return Vec::new();
    }

    let center = (NODES_PER_LEVEL as f64 - 1.0) / 2.0;
    (0..NODES_PER_LEVEL)
        .map(|i| {
            let id = match parent_id {
                Some(parent) => format!("{parent}-{i}-l{level}-{i}"),
                None => format!("root-l{level}-{i}"),
            };
            let x = x_offset + (i as f64 - center) * NODE_SPACING;
            let y = y_offset + f64::from(level) * LEVEL_SPACING;

            let children = level_nodes(Some(&id), level + 1, max_levels, x, y + LEVEL_SPACING);
            let mut node = Node::new(id, format!("Level {level} Node {}", i + 1), level, x, y)
                .with_children(children);
            node.color = Some(level_color(level).to_string());
            node.parent = parent_id.map(str::to_string);
            if level > 0 {
                node.relationship_label = Some("child".to_string());
            }
            node
        })
        .collect()
}
