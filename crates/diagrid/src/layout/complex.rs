//! Layout of large graphs by clustering.
//!
//! Nodes are grouped with a deterministic label propagation over the
//! undirected edge set. Each cluster is placed, resolved and optimized on its
//! own, then the clusters are shelf-packed into the canvas, largest first.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::{debug, warn};

use diagrid_core::{
    geometry::{Bounds, Point, Size},
    model::{Archetype, LayoutWarning, RankDirection, Stage},
};

use crate::{
    config::LayoutConfig,
    layout::{
        aesthetic::Optimizer,
        deadline::Deadline,
        fallback,
        graph::LayoutGraph,
        overlap::{ResolveOutcome, Resolver},
        placement::Placement,
        placer,
        routing::{EdgeRouter, EdgeRouting},
        seeds,
    },
};

/// Upper bound on label propagation rounds.
const MAX_PROPAGATION_ROUNDS: usize = 20;

/// Groups the nodes of `graph` into clusters of at most `max_cluster_size` nodes.
///
/// Clusters are ordered by their smallest member and list members in
/// ascending order, except that split clusters list them breadth-first.
pub fn clusters(graph: &LayoutGraph<'_>, max_cluster_size: usize) -> Vec<Vec<usize>> {
    let labels = propagate_labels(graph);

    let mut isolated = Vec::new();
    let mut by_label: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (node, &label) in labels.iter().enumerate() {
        if graph.neighbours(node).is_empty() {
            isolated.push(node);
        } else {
            by_label.entry(label).or_default().push(node);
        }
    }

    let mut groups: Vec<Vec<usize>> = by_label.into_values().collect();
    if !isolated.is_empty() {
        groups.push(isolated);
    }

    let mut clusters: Vec<Vec<usize>> = groups
        .into_iter()
        .flat_map(|group| split(graph, group, max_cluster_size.max(1)))
        .collect();
    clusters.sort_by_key(|cluster| cluster.iter().copied().min().unwrap_or(usize::MAX));
    clusters
}

/// Label propagation in fixed node order; ties go to the smallest label.
fn propagate_labels(graph: &LayoutGraph<'_>) -> Vec<usize> {
    let mut labels: Vec<usize> = (0..graph.node_count()).collect();

    for round in 0..MAX_PROPAGATION_ROUNDS {
        let mut changed = false;
        for node in 0..graph.node_count() {
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for &neighbour in graph.neighbours(node) {
                *counts.entry(labels[neighbour]).or_default() += 1;
            }

            // Ascending iteration keeps the smallest label among equal counts
            let mut best: Option<(usize, usize)> = None;
            for (&label, &count) in &counts {
                if best.is_none_or(|(_, best_count)| count > best_count) {
                    best = Some((label, count));
                }
            }

            if let Some((label, _)) = best.filter(|&(label, _)| label != labels[node]) {
                labels[node] = label;
                changed = true;
            }
        }
        if !changed {
            debug!(rounds = round + 1; "Label propagation settled");
            break;
        }
    }
    labels
}

/// Splits an oversized group into chunks taken in breadth-first order.
fn split(graph: &LayoutGraph<'_>, group: Vec<usize>, max_size: usize) -> Vec<Vec<usize>> {
    if group.len() <= max_size {
        return vec![group];
    }

    let members: BTreeSet<usize> = group.iter().copied().collect();
    let mut visited = BTreeSet::new();
    let mut order = Vec::with_capacity(group.len());
    for &start in &group {
        if !visited.insert(start) {
            continue;
        }
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &neighbour in graph.neighbours(node) {
                if members.contains(&neighbour) && visited.insert(neighbour) {
                    queue.push_back(neighbour);
                }
            }
        }
    }

    order.chunks(max_size).map(<[usize]>::to_vec).collect()
}

/// The composed layout of a large graph.
#[derive(Debug, Clone)]
pub struct ComplexLayout {
    pub placement: Placement,
    pub cluster_count: usize,
    pub warnings: Vec<LayoutWarning>,
}

/// The clustering layout engine.
pub struct Engine<'a> {
    config: &'a LayoutConfig,
    direction: RankDirection,
}

impl<'a> Engine<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            direction: RankDirection::TopBottom,
        }
    }

    /// Set the rank direction of every cluster's layered placement
    pub fn set_direction(&mut self, direction: RankDirection) -> &mut Self {
        self.direction = direction;
        self
    }

    /// Lays out `graph`; `sizes` is indexed like its nodes.
    ///
    /// Clusters that cannot be placed or resolved are grid-packed instead, with
    /// a warning. The result is overlap-free and positioned on the canvas.
    pub fn layout(
        &self,
        graph: &LayoutGraph<'_>,
        sizes: &[Size],
        deadline: &Deadline,
    ) -> ComplexLayout {
        let clusters = clusters(graph, self.config.max_cluster_size);
        debug!(
            node_count = graph.node_count(),
            cluster_count = clusters.len();
            "Complex layout clustering"
        );

        let mut warnings = Vec::new();
        let mut placed = Vec::with_capacity(clusters.len());
        for (index, members) in clusters.iter().enumerate() {
            let placement =
                self.layout_cluster(graph, sizes, index, members, deadline, &mut warnings);
            // Normalize so each cluster's drawing starts at the origin
            let offset = placement
                .bounds()
                .map(|bounds| bounds.min_point().scale(-1.0))
                .unwrap_or_default();
            placed.push(placement.translated(offset));
        }

        let offsets = self.shelf_pack(&placed);

        let mut centers = vec![Point::default(); graph.node_count()];
        for ((members, placement), offset) in clusters.iter().zip(&placed).zip(&offsets) {
            for (&member, node) in members.iter().zip(placement.nodes()) {
                centers[member] = node.center().add_point(*offset);
            }
        }

        let placement = Placement::from_centers(graph, &centers, sizes, &self.router())
            .fitted_to_canvas(self.config);

        ComplexLayout {
            placement,
            cluster_count: clusters.len(),
            warnings,
        }
    }

    fn router(&self) -> EdgeRouter {
        let mut router = EdgeRouter::new();
        router
            .set_routing(EdgeRouting::Orthogonal)
            .set_direction(self.direction)
            .set_edge_separation(self.config.edge_separation);
        router
    }

    /// Base placement, resolution and optimization of one cluster.
    fn layout_cluster(
        &self,
        graph: &LayoutGraph<'_>,
        sizes: &[Size],
        index: usize,
        members: &[usize],
        deadline: &Deadline,
        warnings: &mut Vec<LayoutWarning>,
    ) -> Placement {
        let config = self.config;
        let subgraph = graph.subgraph(members);
        let sub_sizes: Vec<Size> = members.iter().map(|&member| sizes[member]).collect();
        let router = self.router();

        let mut engine = placer::Engine::new();
        engine
            .set_node_separation(config.node_separation)
            .set_rank_separation(config.rank_separation)
            .set_direction(self.direction);

        let placement = match engine.place(&subgraph, &sub_sizes) {
            Ok(centers) => Placement::from_centers(&subgraph, &centers, &sub_sizes, &router),
            Err(error) => {
                warn!(cluster = index, error:%; "Cluster placement failed, packing as grid");
                warnings.push(LayoutWarning::StageFallback {
                    stage: Stage::ComplexGraph,
                    reason: error.to_string(),
                });
                return self.grid(&subgraph, &sub_sizes, &router);
            }
        };

        let sub_canvas = Bounds::new_from_top_left(
            Point::default(),
            config.content_area().to_size(),
        );
        let clamp_area = placement
            .node_bounds()
            .map_or(sub_canvas, |bounds| sub_canvas.merge(&bounds));

        let mut resolver = Resolver::new();
        resolver
            .set_separation(config.node_separation)
            .set_max_iterations(config.complex_max_iterations)
            .set_seed(config.seed ^ seeds::OVERLAP ^ index as u64);
        let resolution = resolver.resolve(placement.nodes(), clamp_area, deadline);

        let placement = match resolution.outcome {
            ResolveOutcome::Converged { .. } => {
                Placement::routed(&subgraph, resolution.nodes, &router)
            }
            ResolveOutcome::Exhausted {
                iterations,
                remaining,
            } => {
                warn!(
                    cluster = index,
                    iterations = iterations,
                    remaining = remaining;
                    "Cluster did not converge, packing as grid"
                );
                warnings.push(LayoutWarning::ConvergenceFailure {
                    stage: Stage::ComplexGraph,
                    iterations,
                    remaining_overlaps: remaining,
                });
                return self.grid(&subgraph, &sub_sizes, &router);
            }
            ResolveOutcome::DeadlineExpired { .. } => {
                debug!(cluster = index; "Deadline expired, packing cluster as grid");
                return self.grid(&subgraph, &sub_sizes, &router);
            }
        };

        if !config.enable_aesthetic_pass || deadline.is_expired() {
            return placement;
        }

        let mut optimizer = Optimizer::from_config(config);
        optimizer.set_seed(config.seed ^ seeds::AESTHETIC ^ index as u64);
        optimizer
            .optimize(&placement, &subgraph, &router, clamp_area, deadline)
            .placement
    }

    fn grid(&self, graph: &LayoutGraph<'_>, sizes: &[Size], router: &EdgeRouter) -> Placement {
        let columns = fallback::column_count(sizes.len(), Archetype::Flow);
        let centers = fallback::grid_centers(sizes, columns, self.config.grid_spacing());
        Placement::from_centers(graph, &centers, sizes, router)
    }

    /// Offsets of the cluster drawings, packed largest first onto shelves no
    /// wider than the content area.
    fn shelf_pack(&self, placed: &[Placement]) -> Vec<Point> {
        let config = self.config;
        let gap = config.rank_separation.max(config.node_separation);
        let extents: Vec<Size> = placed
            .iter()
            .map(|placement| placement.bounds().map(Bounds::to_size).unwrap_or_default())
            .collect();
        let widest = extents.iter().map(|size| size.width()).fold(0.0, f32::max);
        let limit = config.content_area().width().max(widest);

        let mut order: Vec<usize> = (0..placed.len()).collect();
        order.sort_by(|&a, &b| extents[b].area().total_cmp(&extents[a].area()));

        let mut offsets = vec![Point::default(); placed.len()];
        let mut x = 0.0f32;
        let mut y = 0.0f32;
        let mut shelf_height = 0.0f32;
        for index in order {
            let extent = extents[index];
            if x > 0.0 && x + extent.width() > limit {
                y += shelf_height + gap;
                x = 0.0;
                shelf_height = 0.0;
            }
            offsets[index] = Point::new(x, y);
            x += extent.width() + gap;
            shelf_height = shelf_height.max(extent.height());
        }
        offsets
    }
}
