//! Overlap detection and repulsion-based resolution.
//!
//! Two nodes overlap when their boxes, each inflated by half the node
//! separation, intersect; in other words when the gap between them is smaller
//! than the separation. The resolver pushes overlapping pairs apart along the
//! line joining their centers until no overlap is detected two iterations in a
//! row, the iteration cap is reached, or the deadline expires.

use std::f32::consts::TAU;

use log::{debug, trace};
use rand::{Rng, SeedableRng, rngs::StdRng};

use diagrid_core::{
    geometry::{Bounds, Point, Size},
    model::PositionedNode,
};

use crate::layout::deadline::Deadline;

/// Centers closer than this are treated as coincident.
const COINCIDENT_DISTANCE: f32 = 1e-3;

/// Extra distance added to every push so a separated pair does not sit exactly on the limit.
const PUSH_SLACK: f32 = 0.5;

/// Consecutive clean detections required to declare convergence.
const CLEAN_STREAK: usize = 2;

/// A pair of overlapping nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub first: usize,
    pub second: usize,
    /// Area shared by the inflated boxes
    pub area: f32,
}

/// The box a node must keep clear of other inflated boxes.
fn inflated(node: &PositionedNode, separation: f32) -> Bounds {
    node.bounds().inflate(separation / 2.0)
}

/// Returns true if nodes `a` and `b` overlap.
pub fn pair_overlaps(a: &PositionedNode, b: &PositionedNode, separation: f32) -> bool {
    inflated(a, separation).intersects(&inflated(b, separation))
}

/// Finds every overlapping pair, ordered by `(first, second)`.
pub fn detect(nodes: &[PositionedNode], separation: f32) -> Vec<Overlap> {
    let boxes: Vec<Bounds> = nodes
        .iter()
        .map(|node| inflated(node, separation))
        .collect();

    let mut overlaps = Vec::new();
    for first in 0..boxes.len() {
        for second in (first + 1)..boxes.len() {
            if boxes[first].intersects(&boxes[second]) {
                overlaps.push(Overlap {
                    first,
                    second,
                    area: boxes[first].intersection_area(&boxes[second]),
                });
            }
        }
    }
    overlaps
}

/// Returns true if the node at `index` overlaps any other node.
pub fn overlaps_any(nodes: &[PositionedNode], index: usize, separation: f32) -> bool {
    let target = inflated(&nodes[index], separation);
    nodes
        .iter()
        .enumerate()
        .any(|(other, node)| other != index && target.intersects(&inflated(node, separation)))
}

/// Moves `node` so its box lies inside `area`, or starts at the area's corner if it is too big.
pub fn clamp_node(node: &PositionedNode, area: Bounds) -> PositionedNode {
    // Top-left corners that keep the box inside `area`
    let corners = Bounds::new_from_top_left(
        area.min_point(),
        Size::new(
            (area.width() - node.w).max(0.0),
            (area.height() - node.h).max(0.0),
        ),
    );
    let top_left = corners.clamp_point(Point::new(node.x, node.y));

    let mut clamped = node.clone();
    clamped.x = top_left.x();
    clamped.y = top_left.y();
    clamped
}

/// How a resolution run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// No overlap remains
    Converged { iterations: usize },
    /// The iteration cap was reached with overlaps left
    Exhausted { iterations: usize, remaining: usize },
    /// The deadline expired with overlaps left
    DeadlineExpired { iterations: usize, remaining: usize },
}

impl ResolveOutcome {
    #[cfg(test)]
    pub fn is_converged(&self) -> bool {
        matches!(self, ResolveOutcome::Converged { .. })
    }
}

/// Resolved node positions plus how the run ended.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub nodes: Vec<PositionedNode>,
    pub outcome: ResolveOutcome,
}

/// The overlap resolver.
///
/// Randomness is only used to pick a direction for coincident centers, and is
/// drawn from a generator seeded with the configured seed.
pub struct Resolver {
    /// Required gap between node boxes
    separation: f32,

    /// Iteration cap
    max_iterations: usize,

    /// Seed for coincident-center perturbations
    seed: u64,
}

impl Resolver {
    /// Create a new overlap resolver
    pub fn new() -> Self {
        Self {
            separation: 30.0,
            max_iterations: 50,
            seed: 0,
        }
    }

    /// Set the required gap between node boxes
    pub fn set_separation(&mut self, separation: f32) -> &mut Self {
        self.separation = separation;
        self
    }

    /// Set the iteration cap
    pub fn set_max_iterations(&mut self, iterations: usize) -> &mut Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the seed used for coincident-center perturbations
    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Separates overlapping nodes, keeping every box inside `clamp_area`.
    pub fn resolve(
        &self,
        nodes: &[PositionedNode],
        clamp_area: Bounds,
        deadline: &Deadline,
    ) -> Resolution {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut nodes = nodes.to_vec();
        let mut clean_streak = 0;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            if deadline.is_expired() {
                let remaining = detect(&nodes, self.separation).len();
                debug!(
                    iterations = iterations,
                    remaining = remaining;
                    "Overlap resolution hit the deadline"
                );
                let outcome = if remaining == 0 {
                    ResolveOutcome::Converged { iterations }
                } else {
                    ResolveOutcome::DeadlineExpired {
                        iterations,
                        remaining,
                    }
                };
                return Resolution { nodes, outcome };
            }

            let overlaps = detect(&nodes, self.separation);
            if overlaps.is_empty() {
                clean_streak += 1;
                if clean_streak >= CLEAN_STREAK {
                    break;
                }
                continue;
            }
            clean_streak = 0;
            iterations += 1;

            trace!(iteration = iterations, overlap_count = overlaps.len(); "Resolving overlaps");

            for overlap in &overlaps {
                // Earlier pushes in this iteration may already have separated the pair
                if pair_overlaps(
                    &nodes[overlap.first],
                    &nodes[overlap.second],
                    self.separation,
                ) {
                    self.separate(&mut nodes, overlap.first, overlap.second, &mut rng);
                }
            }

            for node in &mut nodes {
                *node = clamp_node(node, clamp_area);
            }
        }

        let remaining = detect(&nodes, self.separation).len();
        let outcome = if remaining == 0 {
            ResolveOutcome::Converged { iterations }
        } else {
            ResolveOutcome::Exhausted {
                iterations,
                remaining,
            }
        };
        debug!(outcome:?; "Overlap resolution finished");

        Resolution { nodes, outcome }
    }

    /// Pushes one overlapping pair apart, half the required distance each.
    fn separate(
        &self,
        nodes: &mut [PositionedNode],
        first: usize,
        second: usize,
        rng: &mut StdRng,
    ) {
        let a = nodes[first].center();
        let b = nodes[second].center();
        let delta = b.sub_point(a);
        let distance = delta.hypot();

        let (direction, distance) = if distance < COINCIDENT_DISTANCE {
            let angle: f32 = rng.random_range(0.0..TAU);
            (Point::new(angle.cos(), angle.sin()), 0.0)
        } else {
            (delta.scale(1.0 / distance), distance)
        };

        // Center distance along `direction` at which the inflated boxes stop intersecting
        let required_x = (nodes[first].w + nodes[second].w) / 2.0 + self.separation;
        let required_y = (nodes[first].h + nodes[second].h) / 2.0 + self.separation;
        let along_x = if direction.x().abs() > f32::EPSILON {
            required_x / direction.x().abs()
        } else {
            f32::INFINITY
        };
        let along_y = if direction.y().abs() > f32::EPSILON {
            required_y / direction.y().abs()
        } else {
            f32::INFINITY
        };
        let required = along_x.min(along_y);

        let push = (required - distance) / 2.0 + PUSH_SLACK;
        if !push.is_finite() || push <= 0.0 {
            return;
        }

        nodes[first].set_center(a.sub_point(direction.scale(push)));
        nodes[second].set_center(b.add_point(direction.scale(push)));
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use diagrid_core::model::NodeSpec;

    use super::*;

    fn node(id: &str, center: Point) -> PositionedNode {
        PositionedNode::new(NodeSpec::new(id, id), Point::default(), Size::new(100.0, 50.0))
            .centered_at(center)
    }

    fn canvas() -> Bounds {
        Bounds::new_from_top_left(Point::default(), Size::new(1200.0, 800.0))
    }

    #[test]
    fn test_detect_uses_separation_margin() {
        // 110 px between centers leaves a 10 px gap
        let nodes = vec![
            node("a", Point::new(100.0, 100.0)),
            node("b", Point::new(210.0, 100.0)),
        ];
        assert!(detect(&nodes, 0.0).is_empty());
        assert_eq!(detect(&nodes, 30.0).len(), 1);

        // Exactly the required gap touches but does not overlap
        let nodes = vec![
            node("a", Point::new(100.0, 100.0)),
            node("b", Point::new(230.0, 100.0)),
        ];
        assert!(detect(&nodes, 30.0).is_empty());
    }

    #[test]
    fn test_detect_reports_area() {
        let nodes = vec![
            node("a", Point::new(100.0, 100.0)),
            node("b", Point::new(150.0, 100.0)),
        ];
        let overlaps = detect(&nodes, 0.0);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].area, 50.0 * 50.0);
    }

    #[test]
    fn test_resolve_separates_pair_along_center_line() {
        let nodes = vec![
            node("a", Point::new(500.0, 400.0)),
            node("b", Point::new(540.0, 400.0)),
        ];
        let resolution = Resolver::new().resolve(&nodes, canvas(), &Deadline::unbounded());

        assert!(resolution.outcome.is_converged());
        assert!(detect(&resolution.nodes, 30.0).is_empty());
        // Horizontal push only
        assert_eq!(resolution.nodes[0].center().y(), 400.0);
        assert_eq!(resolution.nodes[1].center().y(), 400.0);
        assert!(resolution.nodes[0].center().x() < resolution.nodes[1].center().x());
    }

    #[test]
    fn test_resolve_coincident_centers_deterministically() {
        let nodes = vec![
            node("a", Point::new(600.0, 400.0)),
            node("b", Point::new(600.0, 400.0)),
        ];
        let mut resolver = Resolver::new();
        resolver.set_seed(7);

        let first = resolver.resolve(&nodes, canvas(), &Deadline::unbounded());
        let second = resolver.resolve(&nodes, canvas(), &Deadline::unbounded());

        assert!(first.outcome.is_converged());
        assert!(detect(&first.nodes, 30.0).is_empty());
        assert_eq!(first.nodes, second.nodes);
    }

    #[test]
    fn test_resolve_keeps_nodes_in_clamp_area() {
        let nodes: Vec<_> = (0..6)
            .map(|i| node(&format!("n{i}"), Point::new(60.0 + i as f32, 40.0)))
            .collect();
        let resolution = Resolver::new().resolve(&nodes, canvas(), &Deadline::unbounded());

        for node in &resolution.nodes {
            assert!(canvas().contains_bounds(&node.bounds()));
        }
        assert!(resolution.outcome.is_converged());
    }

    #[test]
    fn test_resolve_reports_exhaustion() {
        // Far more nodes than fit in a tiny clamp area
        let area = Bounds::new_from_top_left(Point::default(), Size::new(200.0, 100.0));
        let nodes: Vec<_> = (0..10)
            .map(|i| node(&format!("n{i}"), Point::new(100.0, 50.0 + i as f32)))
            .collect();
        let mut resolver = Resolver::new();
        resolver.set_max_iterations(20);
        let resolution = resolver.resolve(&nodes, area, &Deadline::unbounded());

        assert!(matches!(
            resolution.outcome,
            ResolveOutcome::Exhausted { iterations: 20, remaining } if remaining > 0
        ));
    }

    #[test]
    fn test_resolve_stops_at_deadline() {
        let nodes = vec![
            node("a", Point::new(500.0, 400.0)),
            node("b", Point::new(510.0, 400.0)),
        ];
        let resolution = Resolver::new().resolve(&nodes, canvas(), &Deadline::new(0));

        assert!(matches!(
            resolution.outcome,
            ResolveOutcome::DeadlineExpired {
                iterations: 0,
                remaining: 1
            }
        ));
    }

    #[test]
    fn test_clamp_node() {
        let area = Bounds::new_from_top_left(Point::default(), Size::new(300.0, 300.0));
        let clamped = clamp_node(&node("a", Point::new(-20.0, 290.0)), area);
        assert_eq!(clamped.x, 0.0);
        assert_eq!(clamped.y, 250.0);

        let inside = clamp_node(&node("b", Point::new(120.0, 80.0)), area);
        assert_eq!((inside.x, inside.y), (70.0, 55.0));
    }

    #[test]
    fn test_clamp_node_larger_than_area() {
        let area = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(40.0, 30.0));
        let clamped = clamp_node(&node("a", Point::new(200.0, -50.0)), area);
        assert_eq!(clamped.x, 10.0);
        assert_eq!(clamped.y, 20.0);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use diagrid_core::model::NodeSpec;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn nodes_strategy() -> impl Strategy<Value = Vec<PositionedNode>> {
        prop::collection::vec(
            (200.0f32..1000.0, 200.0f32..600.0, 60.0f32..160.0, 30.0f32..70.0),
            1..12,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (x, y, w, h))| {
                    PositionedNode::new(
                        NodeSpec::new(format!("n{i}"), "node"),
                        Point::default(),
                        Size::new(w, h),
                    )
                    .centered_at(Point::new(x, y))
                })
                .collect()
        })
    }

    // ===================
    // Property Test Functions
    // ===================

    /// A converged resolution never leaves overlaps behind.
    fn check_converged_means_overlap_free(
        nodes: Vec<PositionedNode>,
    ) -> Result<(), TestCaseError> {
        // Plenty of room, so convergence is expected
        let area = Bounds::new_from_top_left(Point::default(), Size::new(4000.0, 4000.0));
        let mut resolver = Resolver::new();
        resolver.set_max_iterations(500);
        let resolution = resolver.resolve(&nodes, area, &Deadline::unbounded());

        if resolution.outcome.is_converged() {
            prop_assert!(detect(&resolution.nodes, 30.0).is_empty());
        }
        Ok(())
    }

    /// Resolution never changes node sizes or order.
    fn check_sizes_and_ids_preserved(nodes: Vec<PositionedNode>) -> Result<(), TestCaseError> {
        let area = Bounds::new_from_top_left(Point::default(), Size::new(1200.0, 800.0));
        let resolution = Resolver::new().resolve(&nodes, area, &Deadline::unbounded());

        prop_assert_eq!(resolution.nodes.len(), nodes.len());
        for (before, after) in nodes.iter().zip(&resolution.nodes) {
            prop_assert_eq!(before.id(), after.id());
            prop_assert_eq!(before.size(), after.size());
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn converged_means_overlap_free(nodes in nodes_strategy()) {
            check_converged_means_overlap_free(nodes)?;
        }

        #[test]
        fn sizes_and_ids_preserved(nodes in nodes_strategy()) {
            check_sizes_and_ids_preserved(nodes)?;
        }
    }
}
