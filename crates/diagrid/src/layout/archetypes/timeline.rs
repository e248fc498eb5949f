//! Single-row placement for chronological sequences.

use log::debug;

use diagrid_core::{geometry::Point, model::Archetype};

use crate::{
    LayoutError,
    layout::{
        archetypes::{ArchetypeContext, ArchetypeStrategy, SPACING_SLACK, max_size},
        placement::Placement,
        routing::EdgeRouting,
    },
};

/// Places nodes left to right in input order on the canvas's horizontal center line.
///
/// Nodes are spread evenly across the content width, or spaced by the widest
/// node plus the separation when that does not fit.
#[derive(Debug, Default)]
pub struct Timeline;

impl ArchetypeStrategy for Timeline {
    fn name(&self) -> &'static str {
        "timeline"
    }

    fn supports(&self, archetype: Archetype) -> bool {
        archetype == Archetype::Timeline
    }

    fn apply(
        &self,
        placement: &Placement,
        ctx: &ArchetypeContext<'_, '_>,
    ) -> Result<Placement, LayoutError> {
        let config = ctx.config();
        let sizes = placement.sizes();
        if sizes.is_empty() {
            return Ok(placement.clone());
        }

        let content = config.content_area();
        let even = content.width() / sizes.len() as f32;
        let minimum = max_size(&sizes).width() + config.node_separation + SPACING_SLACK;
        let spacing = even.max(minimum);
        let row = config.canvas().center().y();

        debug!(count = sizes.len(), spacing = spacing; "Timeline placement");

        let centers: Vec<Point> = (0..sizes.len())
            .map(|index| Point::new(content.min_x() + spacing * (index as f32 + 0.5), row))
            .collect();

        Ok(Placement::from_centers(
            ctx.graph(),
            &centers,
            &sizes,
            &ctx.router(self.edge_routing()),
        ))
    }

    fn edge_routing(&self) -> EdgeRouting {
        EdgeRouting::Straight
    }

    fn fixed_geometry(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use diagrid_core::{geometry::Size, model::RankDirection};

    use super::*;
    use crate::{
        config::LayoutConfig,
        layout::{
            graph::tests::{build_graph, specs},
            overlap,
            routing::EdgeRouter,
        },
    };

    fn run(count: usize, config: &LayoutConfig) -> Placement {
        let edges: Vec<(usize, usize)> = (1..count).map(|i| (i - 1, i)).collect();
        let (nodes, edges) = specs(count, &edges);
        let graph = build_graph(&nodes, &edges);
        // Deliberately scrambled input positions
        let centers: Vec<Point> = (0..count)
            .map(|i| Point::new(((count - i) * 37) as f32, (i * 11) as f32))
            .collect();
        let sizes = vec![Size::new(120.0, 60.0); count];
        let placement = Placement::from_centers(&graph, &centers, &sizes, &EdgeRouter::new());
        let ctx = ArchetypeContext::new(&graph, config, RankDirection::LeftRight);
        Timeline.apply(&placement, &ctx).expect("timeline never fails")
    }

    #[test]
    fn test_input_order_left_to_right() {
        let config = LayoutConfig::default();
        let placement = run(5, &config);
        let centers = placement.centers();

        for pair in centers.windows(2) {
            assert!(pair[0].x() < pair[1].x());
            assert_eq!(pair[0].y(), 400.0);
            assert_eq!(pair[1].y(), 400.0);
        }
        assert!(overlap::detect(placement.nodes(), config.node_separation).is_empty());
    }

    #[test]
    fn test_spreads_across_content_width() {
        let config = LayoutConfig::default();
        let placement = run(4, &config);
        let centers = placement.centers();

        // 1120 px of content split into four 280 px slots
        assert!(approx_eq!(f32, centers[0].x(), 180.0, epsilon = 0.01));
        assert!(approx_eq!(f32, centers[3].x(), 1020.0, epsilon = 0.01));
    }

    #[test]
    fn test_long_timelines_keep_separation() {
        let config = LayoutConfig::default();
        let placement = run(15, &config);

        assert!(overlap::detect(placement.nodes(), config.node_separation).is_empty());
        let bounds = placement.node_bounds().expect("non-empty placement");
        assert!(bounds.max_x() > config.width);
    }
}
