pub mod collision;
pub mod force;

use mindcanvas_core::CanvasConfig;
use mindcanvas_core::geom::COLLISION_PADDING;

pub use collision::CollisionStats;

#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    /// Seed for the coincident-node tie-break; equal seeds give equal layouts.
    pub random_seed: u64,
    pub collision: CollisionOptions,
    pub force: ForceOptions,
}

impl LayoutOptions {
    /// Reads `layout.*` overrides; missing keys keep their defaults.
    pub fn from_config(config: &CanvasConfig) -> mindcanvas_core::Result<Self> {
        let mut opts = Self::default();
        if let Some(seed) = config.get_u64("layout.randomSeed")? {
            opts.random_seed = seed;
        }

        let c = &mut opts.collision;
        if let Some(v) = config.get_u64("layout.collision.maxPasses")? {
            c.max_passes = v as usize;
        }
        if let Some(v) = config.get_f64("layout.collision.boxPadding")? {
            c.box_padding = v;
        }
        if let Some(v) = config.get_f64("layout.collision.extraSeparation")? {
            c.extra_separation = v;
        }
        if let Some(v) = config.get_f64("layout.collision.jitterRadius")? {
            c.jitter_radius = v;
        }

        let f = &mut opts.force;
        if let Some(v) = config.get_u64("layout.force.iterations")? {
            f.iterations = v as usize;
        }
        if let Some(v) = config.get_f64("layout.force.repulsion")? {
            f.repulsion = v;
        }
        if let Some(v) = config.get_f64("layout.force.range")? {
            f.range = v;
        }
        if let Some(v) = config.get_f64("layout.force.dampening")? {
            f.dampening = v;
        }
        Ok(opts)
    }
}

#[derive(Debug, Clone)]
pub struct CollisionOptions {
    pub max_passes: usize,
    /// Grows each node box on every side before overlap tests.
    pub box_padding: f64,
    /// Added on top of the computed separation so pushed nodes clear each other.
    pub extra_separation: f64,
    /// Radius of the circle a coincident node is moved onto.
    pub jitter_radius: f64,
    /// Centers closer than this count as coincident.
    pub coincident_distance: f64,
}

impl Default for CollisionOptions {
    fn default() -> Self {
        Self {
            max_passes: 10,
            box_padding: COLLISION_PADDING,
            extra_separation: 20.0,
            jitter_radius: 100.0,
            coincident_distance: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForceOptions {
    pub iterations: usize,
    /// `k` in `k / distance²`.
    pub repulsion: f64,
    /// Pairs at or beyond this distance exert no force.
    pub range: f64,
    pub dampening: f64,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            repulsion: 1000.0,
            range: 300.0,
            dampening: 0.8,
        }
    }
}

/// Node indices grouped per level, ascending level, input order within a level.
pub(crate) fn group_by_level(nodes: &[crate::graph::Node]) -> Vec<Vec<usize>> {
    let mut levels: std::collections::BTreeMap<u32, Vec<usize>> = Default::default();
    for (idx, n) in nodes.iter().enumerate() {
        levels.entry(n.level).or_default().push(idx);
    }
    levels.into_values().collect()
}
