//! Layered base placement.
//!
//! Based on the Sugiyama algorithm for layered drawing of directed graphs, using
//! the rust-sugiyama implementation. Each weakly connected component returned by
//! the algorithm is laid out on its own and the components are placed side by
//! side along the cross axis; nodes without edges become single-node components.

use std::cmp::Ordering;

use log::{debug, trace};
use rust_sugiyama::configure::Config;

use diagrid_core::{
    geometry::{Point, Size},
    model::RankDirection,
};

use crate::{LayoutError, layout::graph::LayoutGraph};

/// Spacing handed to rust-sugiyama; its coordinates are rescaled afterwards.
const VERTEX_SPACING: f64 = 10.0;

/// Layer coordinates closer than this are the same layer.
const LAYER_TOLERANCE: f64 = 1e-3;

/// A component of the layered drawing before it is scaled into canvas units.
#[derive(Debug)]
struct LayeredComponent {
    /// `(node, rank, cross)` for every member
    members: Vec<(usize, usize, f64)>,
}

impl LayeredComponent {
    fn single(node: usize) -> Self {
        Self {
            members: vec![(node, 0, 0.0)],
        }
    }

    fn first_node(&self) -> usize {
        self.members
            .iter()
            .map(|&(node, _, _)| node)
            .min()
            .unwrap_or(usize::MAX)
    }
}

/// The layered placement engine.
pub struct Engine {
    /// Gap between nodes within a layer
    node_separation: f32,

    /// Gap between layers
    rank_separation: f32,

    /// Axis along which layers are stacked
    direction: RankDirection,
}

impl Engine {
    /// Create a new layered placement engine
    pub fn new() -> Self {
        Self {
            node_separation: 30.0,
            rank_separation: 60.0,
            direction: RankDirection::TopBottom,
        }
    }

    /// Set the gap between nodes within a layer
    pub fn set_node_separation(&mut self, separation: f32) -> &mut Self {
        self.node_separation = separation;
        self
    }

    /// Set the gap between layers
    pub fn set_rank_separation(&mut self, separation: f32) -> &mut Self {
        self.rank_separation = separation;
        self
    }

    /// Set the axis along which layers are stacked
    pub fn set_direction(&mut self, direction: RankDirection) -> &mut Self {
        self.direction = direction;
        self
    }

    /// Computes node centers for `graph`, with the drawing's top-left corner at the origin.
    ///
    /// `sizes` is indexed like the graph's nodes.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Placement`] if rust-sugiyama panics or its output
    /// cannot be mapped back onto the graph.
    pub fn place(
        &self,
        graph: &LayoutGraph<'_>,
        sizes: &[Size],
    ) -> Result<Vec<Point>, LayoutError> {
        let node_count = graph.node_count();
        if node_count == 0 {
            return Ok(Vec::new());
        }

        let mut components = self.layered_components(graph)?;
        components.sort_by_key(LayeredComponent::first_node);

        let (rank_extent, cross_extent) =
            sizes
                .iter()
                .fold((0.0f32, 0.0f32), |(rank, cross), size| match self.direction {
                    RankDirection::TopBottom => (rank.max(size.height()), cross.max(size.width())),
                    RankDirection::LeftRight => (rank.max(size.width()), cross.max(size.height())),
                });
        let rank_pitch = rank_extent + self.rank_separation;
        let cross_scale = f64::from(cross_extent + self.node_separation) / VERTEX_SPACING;

        let mut centers = vec![Point::default(); node_count];
        let mut cursor = 0.0f32;
        for component in &components {
            let cross_min = component
                .members
                .iter()
                .map(|&(_, _, cross)| cross)
                .min_by(f64::total_cmp)
                .unwrap_or(0.0);

            let mut component_extent = 0.0f32;
            for &(node, rank, cross) in &component.members {
                let local_cross = ((cross - cross_min) * cross_scale) as f32;
                component_extent = component_extent.max(local_cross);

                let cross_position = cursor + cross_extent / 2.0 + local_cross;
                let rank_position = rank as f32 * rank_pitch + rank_extent / 2.0;
                centers[node] = match self.direction {
                    RankDirection::TopBottom => Point::new(cross_position, rank_position),
                    RankDirection::LeftRight => Point::new(rank_position, cross_position),
                };
            }

            cursor += component_extent + cross_extent + self.node_separation;
        }

        debug!(
            node_count = node_count,
            component_count = components.len();
            "Layered placement computed"
        );
        trace!(centers:?; "Layered node centers");

        Ok(centers)
    }

    /// Runs rust-sugiyama and converts its output into ranked components.
    fn layered_components(
        &self,
        graph: &LayoutGraph<'_>,
    ) -> Result<Vec<LayeredComponent>, LayoutError> {
        let node_count = graph.node_count();

        // Convert our graph to a format suitable for the Sugiyama algorithm
        let mut edges: Vec<(u32, u32)> = Vec::with_capacity(graph.edge_count());
        for edge in graph.edges() {
            // Skip self-loops
            if edge.is_self_loop() {
                continue;
            }
            let source = u32::try_from(edge.source())
                .map_err(|_| LayoutError::Placement("Node index exceeds u32 range".to_string()))?;
            let target = u32::try_from(edge.target())
                .map_err(|_| LayoutError::Placement("Node index exceeds u32 range".to_string()))?;
            edges.push((source, target));
        }
        edges.sort_unstable();
        edges.dedup();

        let mut connected = vec![false; node_count];
        for &(source, target) in &edges {
            connected[source as usize] = true;
            connected[target as usize] = true;
        }

        let mut components = Vec::new();
        let mut ranks: Vec<Option<usize>> = vec![None; node_count];

        if !edges.is_empty() {
            debug!(
                node_count = node_count,
                edge_count = edges.len();
                "Applying Sugiyama algorithm"
            );

            let sugiyama_edges = edges.clone();
            // Try the rust_sugiyama crate, catching any panics
            let layouts = std::panic::catch_unwind(move || {
                let config = Config {
                    minimum_length: 1,
                    vertex_spacing: VERTEX_SPACING,
                    ..Default::default()
                };
                rust_sugiyama::from_edges(&sugiyama_edges, &config)
            });

            let results = match layouts {
                Ok(results) if !results.is_empty() => results,
                Ok(_) => {
                    return Err(LayoutError::Placement(
                        "Rust-sugiyama returned empty layout results".to_string(),
                    ));
                }
                Err(err) => {
                    let message = if let Some(panic_msg) = err.downcast_ref::<String>() {
                        format!("Rust-sugiyama layout engine panicked: {panic_msg}")
                    } else if let Some(panic_msg) = err.downcast_ref::<&str>() {
                        format!("Rust-sugiyama layout engine panicked: {panic_msg}")
                    } else {
                        "Rust-sugiyama layout engine panicked with unknown error".to_string()
                    };
                    return Err(LayoutError::Placement(message));
                }
            };

            for (coords, _, _) in &results {
                let placed: Vec<(usize, f64, f64)> = coords
                    .iter()
                    .filter_map(|&(id, (x, y))| {
                        if id < node_count && connected[id] {
                            Some((id, x, y))
                        } else {
                            debug!(vertex = id; "Ignoring unknown vertex in rust-sugiyama result");
                            None
                        }
                    })
                    .collect();
                if placed.is_empty() {
                    continue;
                }

                let layers = distinct_layers(placed.iter().map(|&(_, _, y)| y));
                let members: Vec<(usize, usize, f64)> = placed
                    .iter()
                    .map(|&(id, x, y)| (id, layer_of(&layers, y), x))
                    .collect();
                for &(id, rank, _) in &members {
                    ranks[id] = Some(rank);
                }
                components.push(LayeredComponent { members });
            }

            // Every connected node must have been placed
            let missing = (0..node_count).find(|&id| connected[id] && ranks[id].is_none());
            if let Some(missing) = missing {
                return Err(LayoutError::Placement(format!(
                    "Rust-sugiyama result is missing node {}",
                    graph.node(missing).id
                )));
            }

            for component in &mut components {
                orient_forward(component, &edges, &ranks);
            }
        }

        // Nodes without edges become single-node components
        components.extend(
            (0..node_count)
                .filter(|&id| !connected[id])
                .map(LayeredComponent::single),
        );

        Ok(components)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted distinct layer coordinates.
fn distinct_layers(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut layers: Vec<f64> = values.collect();
    layers.sort_by(f64::total_cmp);
    layers.dedup_by(|a, b| (*a - *b).abs() <= LAYER_TOLERANCE);
    layers
}

/// Index of the layer a coordinate belongs to.
fn layer_of(layers: &[f64], value: f64) -> usize {
    layers
        .iter()
        .position(|&layer| (layer - value).abs() <= LAYER_TOLERANCE)
        .unwrap_or_else(|| {
            layers
                .iter()
                .position(|&layer| layer.partial_cmp(&value) == Some(Ordering::Greater))
                .unwrap_or(layers.len().saturating_sub(1))
        })
}

/// Reverses the layer order of a component if most of its edges point backward.
fn orient_forward(
    component: &mut LayeredComponent,
    edges: &[(u32, u32)],
    ranks: &[Option<usize>],
) {
    let in_component = |id: usize| component.members.iter().any(|&(node, _, _)| node == id);

    let (mut forward, mut backward) = (0usize, 0usize);
    for &(source, target) in edges {
        let (source, target) = (source as usize, target as usize);
        if !in_component(source) {
            continue;
        }
        match (ranks[source], ranks[target]) {
            (Some(s), Some(t)) if s < t => forward += 1,
            (Some(s), Some(t)) if s > t => backward += 1,
            _ => {}
        }
    }

    if backward > forward {
        let max_rank = component
            .members
            .iter()
            .map(|&(_, rank, _)| rank)
            .max()
            .unwrap_or(0);
        for member in &mut component.members {
            member.1 = max_rank - member.1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::graph::tests::{build_graph, specs};

    fn sizes(count: usize) -> Vec<Size> {
        vec![Size::new(120.0, 60.0); count]
    }

    #[test]
    fn test_chain_is_stacked_top_to_bottom() {
        let (nodes, edges) = specs(3, &[(0, 1), (1, 2)]);
        let graph = build_graph(&nodes, &edges);
        let centers = Engine::new()
            .place(&graph, &sizes(3))
            .expect("placement succeeds");

        assert!(centers[0].y() < centers[1].y());
        assert!(centers[1].y() < centers[2].y());
    }

    #[test]
    fn test_left_right_direction_stacks_along_x() {
        let (nodes, edges) = specs(3, &[(0, 1), (1, 2)]);
        let graph = build_graph(&nodes, &edges);
        let mut engine = Engine::new();
        engine.set_direction(RankDirection::LeftRight);
        let centers = engine.place(&graph, &sizes(3)).expect("placement succeeds");

        assert!(centers[0].x() < centers[1].x());
        assert!(centers[1].x() < centers[2].x());
    }

    #[test]
    fn test_layers_are_separated() {
        let (nodes, edges) = specs(2, &[(0, 1)]);
        let graph = build_graph(&nodes, &edges);
        let centers = Engine::new()
            .place(&graph, &sizes(2))
            .expect("placement succeeds");

        // 60 px node height + 60 px rank separation
        assert_eq!(centers[1].y() - centers[0].y(), 120.0);
    }

    #[test]
    fn test_isolated_nodes_are_placed_side_by_side() {
        let (nodes, edges) = specs(3, &[]);
        let graph = build_graph(&nodes, &edges);
        let centers = Engine::new()
            .place(&graph, &sizes(3))
            .expect("placement succeeds");

        assert_eq!(centers[0].y(), centers[1].y());
        assert_eq!(centers[1].x() - centers[0].x(), 150.0);
        assert_eq!(centers[2].x() - centers[1].x(), 150.0);
    }

    #[test]
    fn test_siblings_do_not_share_a_position() {
        let (nodes, edges) = specs(4, &[(0, 1), (0, 2), (0, 3)]);
        let graph = build_graph(&nodes, &edges);
        let centers = Engine::new()
            .place(&graph, &sizes(4))
            .expect("placement succeeds");

        for i in 1..4 {
            for j in (i + 1)..4 {
                assert!((centers[i].x() - centers[j].x()).abs() > 1.0);
            }
        }
    }

    #[test]
    fn test_cyclic_graph_is_placed() {
        let (nodes, edges) = specs(3, &[(0, 1), (1, 2), (2, 0), (1, 1)]);
        let graph = build_graph(&nodes, &edges);
        let centers = Engine::new()
            .place(&graph, &sizes(3))
            .expect("placement succeeds");
        assert_eq!(centers.len(), 3);
    }

    #[test]
    fn test_distinct_layers() {
        let layers = distinct_layers([0.0, 10.0, 0.0, 20.0, 10.0000001].into_iter());
        assert_eq!(layers.len(), 3);
        assert_eq!(layer_of(&layers, 10.0), 1);
        assert_eq!(layer_of(&layers, 20.0), 2);
    }
}
