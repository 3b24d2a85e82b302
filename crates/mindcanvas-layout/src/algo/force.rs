use super::{ForceOptions, group_by_level};
use crate::graph::Node;
use mindcanvas_core::geom::Vector;

/// Short-range inverse-square repulsion between same-level nodes.
///
/// Cosmetic only: it spreads clusters left by collision resolution and does not guarantee
/// zero overlap. Forces are accumulated over all pairs, then applied with `opts.dampening`.
pub fn relax(nodes: &mut [Node], opts: &ForceOptions) {
    let levels = group_by_level(nodes);
    let mut forces = vec![Vector::zero(); nodes.len()];

    for _ in 0..opts.iterations {
        for members in &levels {
            for (k, &i) in members.iter().enumerate() {
                for &j in &members[k + 1..] {
                    let delta = nodes[j].center() - nodes[i].center();
                    let distance = delta.length();
                    if distance <= 0.0 || distance >= opts.range {
                        continue;
                    }
                    let magnitude = opts.repulsion / (distance * distance);
                    let push = delta / distance * magnitude;
                    forces[i] -= push;
                    forces[j] += push;
                }
            }
        }

        for (node, force) in nodes.iter_mut().zip(forces.iter_mut()) {
            node.translate(*force * opts.dampening);
            *force = Vector::zero();
        }
    }
}
