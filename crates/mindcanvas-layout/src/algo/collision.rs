use super::{CollisionOptions, group_by_level};
use crate::graph::Node;
use crate::rng::RandomSource;
use mindcanvas_core::geom::{boxes_overlap, vector};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Passes actually run (at most `max_passes`).
    pub passes: usize,
    /// Overlapping pairs seen over all passes.
    pub collisions: usize,
    /// A full pass found no overlapping same-level pair.
    pub converged: bool,
}

/// Pushes apart overlapping nodes that share a level.
///
/// Runs up to `opts.max_passes` passes and stops after the first pass without collisions.
/// Non-convergence is accepted: the last positions are kept.
pub fn resolve_collisions(
    nodes: &mut [Node],
    opts: &CollisionOptions,
    rng: &mut dyn RandomSource,
) -> CollisionStats {
    let levels = group_by_level(nodes);
    let mut stats = CollisionStats::default();

    for pass in 0..opts.max_passes {
        stats.passes = pass + 1;
        let mut pass_collisions = 0usize;

        for members in &levels {
            for (k, &i) in members.iter().enumerate() {
                for &j in &members[k + 1..] {
                    let b1 = nodes[i].bounds(opts.box_padding);
                    let b2 = nodes[j].bounds(opts.box_padding);
                    if !boxes_overlap(&b1, &b2) {
                        continue;
                    }
                    pass_collisions += 1;

                    let delta = nodes[j].center() - nodes[i].center();
                    let distance = delta.length();

                    if distance < opts.coincident_distance {
                        let angle = rng.next_unit() * TAU;
                        let target = nodes[i].center()
                            + vector(angle.cos(), angle.sin()) * opts.jitter_radius;
                        nodes[j].set_center(target);
                        continue;
                    }

                    let min_separation = (b1.width() + b2.width()) / 2.0;
                    let needed = min_separation - distance + opts.extra_separation;
                    if needed > 0.0 {
                        let step = delta / distance * (needed / 2.0);
                        nodes[i].translate(-step);
                        nodes[j].translate(step);
                    }
                }
            }
        }

        stats.collisions += pass_collisions;
        if pass_collisions == 0 {
            stats.converged = true;
            break;
        }
    }

    if !stats.converged {
        tracing::debug!(
            passes = stats.passes,
            collisions = stats.collisions,
            "collision resolution stopped before convergence"
        );
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{SequenceRandom, XorShift64Star};
    use mindcanvas_core::geom::point;

    fn node(id: &str, level: u32, x: f64, y: f64) -> Node {
        Node::new(id, level, 120.0, 48.0, x, y)
    }

    fn overlapping_pairs(nodes: &[Node], padding: f64) -> usize {
        let mut count = 0;
        for i in 0..nodes.len() {
            for j in i + 1..nodes.len() {
                if nodes[i].level == nodes[j].level
                    && boxes_overlap(&nodes[i].bounds(padding), &nodes[j].bounds(padding))
                {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn coincident_nodes_are_separated_without_changing_levels() {
        let mut nodes = vec![node("a", 2, 10.0, 10.0), node("b", 2, 10.0, 10.0)];
        let opts = CollisionOptions::default();
        // angle 0: the jitter lands the second node straight to the right.
        let mut rng = SequenceRandom::new(vec![0.0]);
        let stats = resolve_collisions(&mut nodes, &opts, &mut rng);

        assert!(stats.converged);
        assert_eq!(overlapping_pairs(&nodes, opts.box_padding), 0);
        assert_eq!(nodes[0].level, 2);
        assert_eq!(nodes[1].level, 2);
    }

    #[test]
    fn jitter_uses_the_random_angle() {
        let mut nodes = vec![node("a", 0, 0.0, 0.0), node("b", 0, 0.0, 0.0)];
        let opts = CollisionOptions {
            max_passes: 1,
            ..Default::default()
        };
        // quarter turn: straight down (+y).
        let mut rng = SequenceRandom::new(vec![0.25]);
        resolve_collisions(&mut nodes, &opts, &mut rng);

        assert_eq!(nodes[0].center(), point(0.0, 0.0));
        assert!((nodes[1].x - 0.0).abs() < 1e-9);
        assert!((nodes[1].y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_pair_is_pushed_symmetrically() {
        let mut nodes = vec![node("a", 0, -10.0, 0.0), node("b", 0, 10.0, 0.0)];
        let opts = CollisionOptions::default();
        let mut rng = XorShift64Star::new(1);
        resolve_collisions(&mut nodes, &opts, &mut rng);

        // padded width 160 each: needed = 160 - 20 + 20 = 160, split evenly.
        assert_eq!(nodes[0].center(), point(-90.0, 0.0));
        assert_eq!(nodes[1].center(), point(90.0, 0.0));
    }

    #[test]
    fn different_levels_may_overlap() {
        let mut nodes = vec![node("a", 0, 0.0, 0.0), node("b", 1, 5.0, 5.0)];
        let mut rng = XorShift64Star::new(1);
        let stats = resolve_collisions(&mut nodes, &CollisionOptions::default(), &mut rng);

        assert!(stats.converged);
        assert_eq!(stats.passes, 1);
        assert_eq!(nodes[0].center(), point(0.0, 0.0));
        assert_eq!(nodes[1].center(), point(5.0, 5.0));
    }

    #[test]
    fn touching_boxes_are_left_alone() {
        // padded width 160: centers 160 apart touch exactly.
        let mut nodes = vec![node("a", 0, 0.0, 0.0), node("b", 0, 160.0, 0.0)];
        let mut rng = XorShift64Star::new(1);
        let stats = resolve_collisions(&mut nodes, &CollisionOptions::default(), &mut rng);
        assert_eq!(stats.collisions, 0);
        assert_eq!(nodes[1].center(), point(160.0, 0.0));
    }

    #[test]
    fn row_of_stacked_nodes_converges() {
        let mut nodes: Vec<Node> = (0..5)
            .map(|i| node(&format!("n{i}"), 1, i as f64 * 30.0, 0.0))
            .collect();
        let opts = CollisionOptions::default();
        let mut rng = XorShift64Star::new(3);
        let stats = resolve_collisions(&mut nodes, &opts, &mut rng);

        assert!(stats.converged, "stats: {stats:?}");
        assert_eq!(overlapping_pairs(&nodes, opts.box_padding), 0);
    }

    #[test]
    fn empty_input_converges_immediately() {
        let mut nodes: Vec<Node> = Vec::new();
        let mut rng = XorShift64Star::new(1);
        let stats = resolve_collisions(&mut nodes, &CollisionOptions::default(), &mut rng);
        assert!(stats.converged);
        assert_eq!(stats.passes, 1);
    }

    #[test]
    fn zero_pass_budget_leaves_positions() {
        let mut nodes = vec![node("a", 0, 0.0, 0.0), node("b", 0, 1.0, 0.0)];
        let opts = CollisionOptions {
            max_passes: 0,
            ..Default::default()
        };
        let mut rng = XorShift64Star::new(1);
        let stats = resolve_collisions(&mut nodes, &opts, &mut rng);
        assert!(!stats.converged);
        assert_eq!(nodes[1].center(), point(1.0, 0.0));
    }
}
