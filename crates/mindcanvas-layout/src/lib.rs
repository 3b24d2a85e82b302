#![forbid(unsafe_code)]

//! Headless spacing passes for mindmap nodes.
//!
//! `mindcanvas-layout` is used by `mindcanvas-render` once per document change: collision
//! resolution first, then a short force-relaxation pass. Only nodes on the same hierarchy level
//! interact.

pub mod algo;
pub mod graph;
pub mod rng;

pub use algo::{CollisionOptions, CollisionStats, ForceOptions, LayoutOptions};
pub use graph::{Graph, LayoutResult, Node};
pub use rng::{RandomSource, SequenceRandom, XorShift64Star};

/// Headless layout entry point, seeded from `opts.random_seed`.
pub fn layout(graph: &Graph, opts: &LayoutOptions) -> LayoutResult {
    let mut rng = XorShift64Star::new(opts.random_seed);
    layout_with_random(graph, opts, &mut rng)
}

/// Same as [`layout`] with a caller-provided random source for the coincident-node tie-break.
pub fn layout_with_random(
    graph: &Graph,
    opts: &LayoutOptions,
    rng: &mut dyn RandomSource,
) -> LayoutResult {
    let mut nodes = graph.nodes.clone();
    let collision = algo::collision::resolve_collisions(&mut nodes, &opts.collision, rng);
    algo::force::relax(&mut nodes, &opts.force);

    tracing::debug!(
        nodes = nodes.len(),
        passes = collision.passes,
        collisions = collision.collisions,
        converged = collision.converged,
        "layout finished"
    );

    LayoutResult {
        positions: nodes.iter().map(|n| (n.id.clone(), n.center())).collect(),
        collision,
    }
}
