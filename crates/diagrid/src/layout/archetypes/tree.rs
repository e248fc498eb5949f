//! Hierarchy placement.

use std::collections::BTreeMap;

use log::debug;

use diagrid_core::{
    geometry::{Bounds, Point},
    model::{Archetype, RankDirection},
};

use crate::{
    LayoutError,
    layout::{
        archetypes::{ArchetypeContext, ArchetypeStrategy},
        placement::Placement,
    },
};

/// Keeps the layered levels and centers each level on the canvas's cross axis.
///
/// Only forests can be drawn as trees: a graph with a directed cycle or a node
/// with more than one parent is rejected with a structural error.
#[derive(Debug, Default)]
pub struct Tree;

/// Rank and cross coordinates of a point for a rank direction.
fn split(point: Point, direction: RankDirection) -> (f32, f32) {
    match direction {
        RankDirection::TopBottom => (point.y(), point.x()),
        RankDirection::LeftRight => (point.x(), point.y()),
    }
}

/// Cross-axis extent of a box.
fn cross_extent(bounds: Bounds, direction: RankDirection) -> (f32, f32) {
    match direction {
        RankDirection::TopBottom => (bounds.min_x(), bounds.max_x()),
        RankDirection::LeftRight => (bounds.min_y(), bounds.max_y()),
    }
}

impl ArchetypeStrategy for Tree {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn supports(&self, archetype: Archetype) -> bool {
        archetype == Archetype::Tree
    }

    fn apply(
        &self,
        placement: &Placement,
        ctx: &ArchetypeContext<'_, '_>,
    ) -> Result<Placement, LayoutError> {
        if !ctx.graph().is_forest() {
            return Err(LayoutError::Structural(
                "tree layout requires a forest, but the graph has a cycle or a node with \
                 several parents"
                    .to_string(),
            ));
        }

        let direction = ctx.direction();
        let (_, target) = split(ctx.config().canvas().center(), direction);

        // Nodes of one level share their rank coordinate
        let mut levels: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (index, node) in placement.nodes().iter().enumerate() {
            let (rank, _) = split(node.center(), direction);
            levels.entry(rank.round() as i64).or_default().push(index);
        }

        debug!(level_count = levels.len(); "Tree placement");

        let mut nodes = placement.nodes().to_vec();
        for members in levels.values() {
            let (low, high) = members.iter().fold(
                (f32::INFINITY, f32::NEG_INFINITY),
                |(low, high), &index| {
                    let (min, max) = cross_extent(nodes[index].bounds(), direction);
                    (low.min(min), high.max(max))
                },
            );
            let shift = target - (low + high) / 2.0;
            let offset = match direction {
                RankDirection::TopBottom => Point::new(shift, 0.0),
                RankDirection::LeftRight => Point::new(0.0, shift),
            };
            for &index in members {
                let center = nodes[index].center().add_point(offset);
                nodes[index].set_center(center);
            }
        }

        Ok(Placement::routed(
            ctx.graph(),
            nodes,
            &ctx.router(self.edge_routing()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use diagrid_core::geometry::Size;

    use super::*;
    use crate::{
        config::LayoutConfig,
        layout::{
            graph::tests::{build_graph, specs},
            overlap,
            routing::EdgeRouter,
        },
    };

    #[test]
    fn test_levels_are_centered() {
        let config = LayoutConfig::default();
        let (nodes, edges) = specs(4, &[(0, 1), (0, 2), (2, 3)]);
        let graph = build_graph(&nodes, &edges);
        let centers = [
            Point::new(100.0, 100.0),
            Point::new(100.0, 250.0),
            Point::new(300.0, 250.0),
            Point::new(300.0, 400.0),
        ];
        let placement = Placement::from_centers(
            &graph,
            &centers,
            &[Size::new(120.0, 60.0); 4],
            &EdgeRouter::new(),
        );
        let ctx = ArchetypeContext::new(&graph, &config, RankDirection::TopBottom);

        let result = Tree.apply(&placement, &ctx).expect("graph is a tree");
        let centers = result.centers();

        assert!(approx_eq!(f32, centers[0].x(), 600.0, epsilon = 0.01));
        assert!(approx_eq!(f32, centers[3].x(), 600.0, epsilon = 0.01));
        // Siblings stay apart and around the center line
        let siblings = (centers[1].x() + centers[2].x()) / 2.0;
        assert!(approx_eq!(f32, siblings, 600.0, epsilon = 0.01));
        assert_eq!(centers[1].y(), 250.0);
        assert!(overlap::detect(result.nodes(), config.node_separation).is_empty());
    }

    #[test]
    fn test_left_right_levels_are_centered_vertically() {
        let config = LayoutConfig::default();
        let (nodes, edges) = specs(3, &[(0, 1), (0, 2)]);
        let graph = build_graph(&nodes, &edges);
        let centers = [
            Point::new(100.0, 50.0),
            Point::new(300.0, 50.0),
            Point::new(300.0, 150.0),
        ];
        let placement = Placement::from_centers(
            &graph,
            &centers,
            &[Size::new(120.0, 60.0); 3],
            &EdgeRouter::new(),
        );
        let ctx = ArchetypeContext::new(&graph, &config, RankDirection::LeftRight);

        let result = Tree.apply(&placement, &ctx).expect("graph is a tree");
        let centers = result.centers();

        assert!(approx_eq!(f32, centers[0].y(), 400.0, epsilon = 0.01));
        assert!(approx_eq!(f32, centers[1].y(), 350.0, epsilon = 0.01));
        assert!(approx_eq!(f32, centers[2].y(), 450.0, epsilon = 0.01));
    }

    #[test]
    fn test_rejects_cycles() {
        let config = LayoutConfig::default();
        let (nodes, edges) = specs(3, &[(0, 1), (1, 2), (2, 0)]);
        let graph = build_graph(&nodes, &edges);
        let placement = Placement::from_centers(
            &graph,
            &[Point::default(); 3],
            &[Size::new(120.0, 60.0); 3],
            &EdgeRouter::new(),
        );
        let ctx = ArchetypeContext::new(&graph, &config, RankDirection::TopBottom);

        assert!(matches!(
            Tree.apply(&placement, &ctx),
            Err(LayoutError::Structural(_))
        ));
    }

    #[test]
    fn test_rejects_multiple_parents() {
        let config = LayoutConfig::default();
        let (nodes, edges) = specs(3, &[(0, 2), (1, 2)]);
        let graph = build_graph(&nodes, &edges);
        let placement = Placement::from_centers(
            &graph,
            &[Point::default(); 3],
            &[Size::new(120.0, 60.0); 3],
            &EdgeRouter::new(),
        );
        let ctx = ArchetypeContext::new(&graph, &config, RankDirection::TopBottom);

        assert!(Tree.apply(&placement, &ctx).is_err());
    }
}
