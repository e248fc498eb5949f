//! The intermediate value passed between pipeline stages.

use diagrid_core::{
    geometry::{Bounds, Point, Size},
    model::{LayoutEdge, PositionedNode},
};

use crate::{
    config::LayoutConfig,
    layout::{graph::LayoutGraph, routing::EdgeRouter},
};

/// Positioned nodes and routed edges, indexed like the [`LayoutGraph`] they belong to.
///
/// Stages never mutate a placement they receive; they build a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    nodes: Vec<PositionedNode>,
    edges: Vec<LayoutEdge>,
}

impl Placement {
    /// Places every node of `graph` centered at the matching point and routes the edges.
    pub fn from_centers(
        graph: &LayoutGraph<'_>,
        centers: &[Point],
        sizes: &[Size],
        router: &EdgeRouter,
    ) -> Self {
        let nodes = graph
            .nodes()
            .zip(centers.iter().zip(sizes))
            .map(|(spec, (&center, &size))| {
                PositionedNode::new(spec.clone(), Point::default(), size).centered_at(center)
            })
            .collect();
        Self::routed(graph, nodes, router)
    }

    /// Builds a placement from positioned nodes, routing the edges of `graph` between them.
    pub fn routed(
        graph: &LayoutGraph<'_>,
        nodes: Vec<PositionedNode>,
        router: &EdgeRouter,
    ) -> Self {
        let edges = router.route(graph, &nodes);
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_parts(self) -> (Vec<PositionedNode>, Vec<LayoutEdge>) {
        (self.nodes, self.edges)
    }

    /// Node centers, in node order.
    #[cfg(test)]
    pub fn centers(&self) -> Vec<Point> {
        self.nodes.iter().map(PositionedNode::center).collect()
    }

    /// Node sizes, in node order.
    pub fn sizes(&self) -> Vec<Size> {
        self.nodes.iter().map(PositionedNode::size).collect()
    }

    /// Extent of the node boxes only.
    pub fn node_bounds(&self) -> Option<Bounds> {
        self.nodes
            .iter()
            .map(PositionedNode::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
    }

    /// True extent of the drawing: node boxes plus every edge point.
    pub fn bounds(&self) -> Option<Bounds> {
        let edge_points = self
            .edges
            .iter()
            .flat_map(|edge| edge.points.iter())
            .map(|&point| Bounds::new_from_top_left(point, Size::default()));
        self.nodes
            .iter()
            .map(PositionedNode::bounds)
            .chain(edge_points)
            .reduce(|acc, bounds| acc.merge(&bounds))
    }

    /// Moves every node and edge point by `offset`.
    pub fn translated(&self, offset: Point) -> Self {
        let nodes = self
            .nodes
            .iter()
            .map(|node| node.centered_at(node.center().add_point(offset)))
            .collect();
        let edges = self
            .edges
            .iter()
            .map(|edge| LayoutEdge {
                spec: edge.spec.clone(),
                points: edge
                    .points
                    .iter()
                    .map(|point| point.add_point(offset))
                    .collect(),
            })
            .collect();
        Self { nodes, edges }
    }

    /// Positions the drawing on the canvas.
    ///
    /// Along each axis the drawing is centered on the canvas if it fits between
    /// the margins, and starts at the margin otherwise.
    pub fn fitted_to_canvas(&self, config: &LayoutConfig) -> Self {
        let Some(bounds) = self.node_bounds() else {
            return self.clone();
        };
        let content = config.content_area();

        let fit = |extent: f32, min: f32, area_min: f32, area_extent: f32| {
            if extent <= area_extent {
                area_min + (area_extent - extent) / 2.0 - min
            } else {
                area_min - min
            }
        };
        let offset = Point::new(
            fit(
                bounds.width(),
                bounds.min_x(),
                content.min_x(),
                content.width(),
            ),
            fit(
                bounds.height(),
                bounds.min_y(),
                content.min_y(),
                content.height(),
            ),
        );
        self.translated(offset)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;
    use crate::layout::graph::tests::{build_graph, specs};

    fn placement(centers: &[Point]) -> Placement {
        let (nodes, edges) = specs(centers.len(), &[(0, 1)]);
        let graph = build_graph(&nodes, &edges);
        let sizes = vec![Size::new(100.0, 40.0); centers.len()];
        Placement::from_centers(&graph, centers, &sizes, &EdgeRouter::new())
    }

    #[test]
    fn test_from_centers() {
        let placement = placement(&[Point::new(100.0, 100.0), Point::new(100.0, 300.0)]);

        assert_eq!(placement.len(), 2);
        assert_eq!(placement.nodes()[0].x, 50.0);
        assert_eq!(placement.nodes()[0].y, 80.0);
        assert_eq!(placement.edges().len(), 1);
    }

    #[test]
    fn test_bounds_include_nodes() {
        let placement = placement(&[Point::new(100.0, 100.0), Point::new(300.0, 300.0)]);
        let bounds = placement.bounds().expect("non-empty placement");

        assert_eq!(bounds.min_x(), 50.0);
        assert_eq!(bounds.max_x(), 350.0);
        assert_eq!(bounds.min_y(), 80.0);
        assert_eq!(bounds.max_y(), 320.0);
        assert_eq!(placement.node_bounds(), Some(bounds));
    }

    #[test]
    fn test_translated_moves_edges() {
        let placement = placement(&[Point::new(100.0, 100.0), Point::new(100.0, 300.0)]);
        let moved = placement.translated(Point::new(10.0, -5.0));

        assert_eq!(moved.nodes()[0].center(), Point::new(110.0, 95.0));
        assert_eq!(
            moved.edges()[0].points[0],
            placement.edges()[0].points[0].add_point(Point::new(10.0, -5.0))
        );
    }

    #[test]
    fn test_fitted_to_canvas_centers_small_drawings() {
        let config = LayoutConfig::default();
        let placement = placement(&[Point::new(-500.0, 0.0), Point::new(-300.0, 0.0)]);
        let fitted = placement.fitted_to_canvas(&config);
        let bounds = fitted.node_bounds().expect("non-empty placement");

        assert!(approx_eq!(f32, bounds.center().x(), 600.0, epsilon = 0.01));
        assert!(approx_eq!(f32, bounds.center().y(), 400.0, epsilon = 0.01));
    }

    #[test]
    fn test_fitted_to_canvas_starts_wide_drawings_at_margin() {
        let config = LayoutConfig::default();
        let placement = placement(&[Point::new(0.0, 0.0), Point::new(3000.0, 0.0)]);
        let fitted = placement.fitted_to_canvas(&config);
        let bounds = fitted.node_bounds().expect("non-empty placement");

        assert!(approx_eq!(f32, bounds.min_x(), 40.0, epsilon = 0.01));
    }
}
