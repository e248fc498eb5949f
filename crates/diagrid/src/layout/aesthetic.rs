//! Layout quality measurement and the aesthetic optimizer.
//!
//! Every score term is computed from the actual geometry of a [`Placement`].
//! The optimizer runs a bounded local search: one node is jittered or pulled
//! toward its neighbours per step, and the move is kept only if the layout
//! stays overlap-free, the node stays in the clamp area, and the weighted
//! score improves by more than the convergence threshold.

use log::{debug, trace};
use rand::{Rng, SeedableRng, rngs::StdRng};

use diagrid_core::{
    geometry::{Bounds, Point, segments_cross},
    model::{LayoutEdge, PositionedNode, QualityMetrics},
};

use crate::{
    config::{AestheticWeights, LayoutConfig},
    layout::{
        deadline::Deadline,
        graph::LayoutGraph,
        overlap::{self, overlaps_any},
        placement::Placement,
        routing::EdgeRouter,
    },
};

/// Largest fraction of the distance to the neighbour centroid covered by one pull.
const MAX_PULL_FRACTION: f32 = 0.5;

/// Number of edge pairs whose polylines cross.
///
/// Pairs sharing an endpoint node never count, since their polylines meet at
/// that node by construction.
pub fn edge_crossings(edges: &[LayoutEdge]) -> usize {
    let mut count = 0;
    for (index, a) in edges.iter().enumerate() {
        for b in &edges[index + 1..] {
            if shares_endpoint(a, b) {
                continue;
            }
            if polylines_cross(&a.points, &b.points) {
                count += 1;
            }
        }
    }
    count
}

fn shares_endpoint(a: &LayoutEdge, b: &LayoutEdge) -> bool {
    let (a_from, a_to) = (&a.spec.from, &a.spec.to);
    let (b_from, b_to) = (&b.spec.from, &b.spec.to);
    a_from == b_from || a_from == b_to || a_to == b_from || a_to == b_to
}

fn polylines_cross(a: &[Point], b: &[Point]) -> bool {
    a.windows(2).any(|first| {
        b.windows(2)
            .any(|second| segments_cross(first[0], first[1], second[0], second[1]))
    })
}

/// `1 -` the mean distance between each node center's mirror image and its
/// nearest node center, normalized by the layout diagonal.
///
/// The mirror axis is the vertical line through the center of the node bounds.
pub fn symmetry(nodes: &[PositionedNode]) -> f32 {
    let Some(bounds) = node_bounds(nodes) else {
        return 1.0;
    };
    let diagonal = bounds.width().hypot(bounds.height());
    if diagonal <= f32::EPSILON {
        return 1.0;
    }

    let axis = bounds.center().x();
    let centers: Vec<Point> = nodes.iter().map(PositionedNode::center).collect();
    let total: f32 = centers
        .iter()
        .map(|center| {
            let mirror = center.with_x(2.0 * axis - center.x());
            let nearest = centers
                .iter()
                .map(|other| mirror.distance(*other))
                .fold(f32::INFINITY, f32::min);
            (nearest / diagonal).min(1.0)
        })
        .sum();

    1.0 - total / centers.len() as f32
}

/// Total node area over the area of the drawing, capped at one.
pub fn compactness(placement: &Placement) -> f32 {
    let Some(bounds) = placement.bounds() else {
        return 0.0;
    };
    let area = bounds.area();
    if area <= f32::EPSILON {
        return 0.0;
    }
    let node_area: f32 = placement
        .nodes()
        .iter()
        .map(|node| node.size().area())
        .sum();
    (node_area / area).min(1.0)
}

/// `1 / (1 + cv)` where `cv` is the coefficient of variation of edge lengths.
///
/// Layouts without edges, or whose edges all have zero length, score one.
pub fn readability(edges: &[LayoutEdge]) -> f32 {
    if edges.is_empty() {
        return 1.0;
    }
    let lengths: Vec<f32> = edges.iter().map(LayoutEdge::length).collect();
    let count = lengths.len() as f32;
    let mean = lengths.iter().sum::<f32>() / count;
    if mean <= f32::EPSILON {
        return 1.0;
    }
    let variance = lengths
        .iter()
        .map(|length| (length - mean).powi(2))
        .sum::<f32>()
        / count;
    1.0 / (1.0 + variance.sqrt() / mean)
}

fn node_bounds(nodes: &[PositionedNode]) -> Option<Bounds> {
    nodes
        .iter()
        .map(PositionedNode::bounds)
        .reduce(|acc, bounds| acc.merge(&bounds))
}

/// The weighted score terms of a placement, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub no_overlap: f32,
    pub crossing: f32,
    pub symmetry: f32,
    pub compactness: f32,
    pub readability: f32,
}

impl Scores {
    /// Scores `placement`, counting overlaps with the given node separation.
    pub fn of(placement: &Placement, separation: f32) -> Self {
        let overlap_count = overlap::detect(placement.nodes(), separation).len();
        Self {
            no_overlap: 1.0 / (1.0 + overlap_count as f32),
            crossing: 1.0 / (1.0 + edge_crossings(placement.edges()) as f32),
            symmetry: symmetry(placement.nodes()),
            compactness: compactness(placement),
            readability: readability(placement.edges()),
        }
    }

    /// The weighted mean of the terms. Zero when every weight is zero.
    pub fn weighted(&self, weights: &AestheticWeights) -> f32 {
        let total = weights.overlap
            + weights.crossing
            + weights.symmetry
            + weights.compactness
            + weights.readability;
        if total <= f32::EPSILON {
            return 0.0;
        }
        (weights.overlap * self.no_overlap
            + weights.crossing * self.crossing
            + weights.symmetry * self.symmetry
            + weights.compactness * self.compactness
            + weights.readability * self.readability)
            / total
    }
}

/// Computes the quality metrics reported with a layout.
pub fn measure(placement: &Placement, config: &LayoutConfig) -> QualityMetrics {
    let overlaps = overlap::detect(placement.nodes(), config.node_separation);
    let scores = Scores::of(placement, config.node_separation);
    let canvas_area = config.width * config.height;
    let canvas_utilization = match placement.bounds() {
        Some(bounds) if canvas_area > 0.0 => bounds.area() / canvas_area,
        _ => 0.0,
    };

    QualityMetrics {
        overlap_count: overlaps.len(),
        overlap_area: overlaps.iter().map(|overlap| overlap.area).sum(),
        edge_crossings: edge_crossings(placement.edges()),
        total_edge_length: placement.edges().iter().map(LayoutEdge::length).sum(),
        canvas_utilization,
        symmetry_score: scores.symmetry,
        compactness_score: scores.compactness,
        readability_score: scores.readability,
        aesthetic_score: scores.weighted(&config.weights),
    }
}

/// Result of an optimizer run.
#[derive(Debug, Clone)]
pub struct Optimization {
    pub placement: Placement,
    /// Weighted score of `placement`
    pub score: f32,
    /// Candidate moves evaluated
    pub steps: usize,
    /// Candidate moves kept
    pub accepted: usize,
}

/// Bounded local search on the aesthetic score.
pub struct Optimizer {
    iterations: usize,
    step: f32,
    patience: usize,
    threshold: f32,
    separation: f32,
    weights: AestheticWeights,
    seed: u64,
}

impl Optimizer {
    /// Create a new optimizer with the default search settings
    pub fn new() -> Self {
        Self {
            iterations: 60,
            step: 12.0,
            patience: 20,
            threshold: 1e-4,
            separation: 30.0,
            weights: AestheticWeights::default(),
            seed: 0,
        }
    }

    /// Create an optimizer with the search settings of `config`
    pub fn from_config(config: &LayoutConfig) -> Self {
        let mut optimizer = Self::new();
        optimizer
            .set_iterations(config.optimizer_iterations)
            .set_step(config.optimizer_step)
            .set_patience(config.optimizer_patience)
            .set_threshold(config.convergence_threshold)
            .set_separation(config.node_separation)
            .set_weights(config.weights);
        optimizer
    }

    /// Set the maximum number of candidate moves
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    /// Set the largest jitter or pull distance
    pub fn set_step(&mut self, step: f32) -> &mut Self {
        self.step = step;
        self
    }

    /// Set the number of consecutive rejections that stops the search
    pub fn set_patience(&mut self, patience: usize) -> &mut Self {
        self.patience = patience;
        self
    }

    /// Set the minimum score gain of an accepted move
    pub fn set_threshold(&mut self, threshold: f32) -> &mut Self {
        self.threshold = threshold;
        self
    }

    /// Set the required gap between node boxes
    pub fn set_separation(&mut self, separation: f32) -> &mut Self {
        self.separation = separation;
        self
    }

    pub fn set_weights(&mut self, weights: AestheticWeights) -> &mut Self {
        self.weights = weights;
        self
    }

    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Improves `placement` while keeping it overlap-free and inside `clamp_area`.
    ///
    /// Edges are rerouted with `router` after every move.
    pub fn optimize(
        &self,
        placement: &Placement,
        graph: &LayoutGraph<'_>,
        router: &EdgeRouter,
        clamp_area: Bounds,
        deadline: &Deadline,
    ) -> Optimization {
        let mut current = placement.clone();
        let mut score = Scores::of(&current, self.separation).weighted(&self.weights);
        let mut steps = 0;
        let mut accepted = 0;

        if current.is_empty() || self.step <= 0.0 {
            return Optimization {
                placement: current,
                score,
                steps,
                accepted,
            };
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut rejections = 0;

        while steps < self.iterations && rejections < self.patience {
            if deadline.is_expired() {
                debug!(steps = steps; "Aesthetic optimization hit the deadline");
                break;
            }
            steps += 1;

            let index = rng.random_range(0..current.len());
            let target = self.candidate_center(&current, graph, index, &mut rng);

            let mut nodes = current.nodes().to_vec();
            nodes[index].set_center(target);
            if !clamp_area.contains_bounds(&nodes[index].bounds())
                || overlaps_any(&nodes, index, self.separation)
            {
                rejections += 1;
                continue;
            }

            let candidate = Placement::routed(graph, nodes, router);
            let candidate_score = Scores::of(&candidate, self.separation).weighted(&self.weights);
            if candidate_score > score + self.threshold {
                trace!(step = steps, index = index, score = candidate_score; "Accepted move");
                current = candidate;
                score = candidate_score;
                accepted += 1;
                rejections = 0;
            } else {
                rejections += 1;
            }
        }

        debug!(
            steps = steps,
            accepted = accepted,
            score = score;
            "Aesthetic optimization finished"
        );

        Optimization {
            placement: current,
            score,
            steps,
            accepted,
        }
    }

    /// Either a pull toward the neighbour centroid or a random jitter.
    fn candidate_center(
        &self,
        placement: &Placement,
        graph: &LayoutGraph<'_>,
        index: usize,
        rng: &mut StdRng,
    ) -> Point {
        let center = placement.nodes()[index].center();
        let neighbours = graph.neighbours(index);

        if !neighbours.is_empty() && rng.random_bool(0.5) {
            let sum = neighbours
                .iter()
                .map(|&neighbour| placement.nodes()[neighbour].center())
                .fold(Point::default(), Point::add_point);
            let centroid = sum.scale(1.0 / neighbours.len() as f32);
            let delta = centroid.sub_point(center);
            let distance = delta.hypot();
            if distance <= f32::EPSILON {
                return center;
            }
            let fraction = (self.step / distance).min(MAX_PULL_FRACTION);
            return center.add_point(delta.scale(fraction));
        }

        let dx = rng.random_range(-self.step..=self.step);
        let dy = rng.random_range(-self.step..=self.step);
        center.add_point(Point::new(dx, dy))
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}
