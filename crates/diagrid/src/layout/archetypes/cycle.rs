//! Circular placement for cyclic processes.

use std::f32::consts::{PI, TAU};

use log::debug;

use diagrid_core::{geometry::Point, model::Archetype};

use crate::{
    LayoutError,
    layout::{
        archetypes::{ArchetypeContext, ArchetypeStrategy, max_size},
        placement::Placement,
        routing::EdgeRouting,
    },
};

/// Radius growth applied on top of the minimum chord radius.
const RADIUS_SLACK: f32 = 1.01;

/// Places nodes evenly on a circle around the canvas center, in input order.
///
/// The radius is the configured fraction of the smaller canvas dimension,
/// grown when neighbouring nodes would otherwise be closer than the node
/// separation.
#[derive(Debug, Default)]
pub struct Cycle;

impl Cycle {
    /// Radius of the circle for `count` nodes whose largest box plus separation is `cell`.
    fn radius(count: usize, cell_width: f32, cell_height: f32, base: f32) -> f32 {
        if count < 2 {
            return base;
        }
        let chord = cell_width.hypot(cell_height);
        let minimum = chord / (2.0 * (PI / count as f32).sin()) * RADIUS_SLACK;
        base.max(minimum)
    }
}

impl ArchetypeStrategy for Cycle {
    fn name(&self) -> &'static str {
        "cycle"
    }

    fn supports(&self, archetype: Archetype) -> bool {
        archetype == Archetype::Cycle
    }

    fn apply(
        &self,
        placement: &Placement,
        ctx: &ArchetypeContext<'_, '_>,
    ) -> Result<Placement, LayoutError> {
        let config = ctx.config();
        let sizes = placement.sizes();
        let count = sizes.len();
        let center = config.canvas().center();

        let largest = max_size(&sizes);
        let base = config.effective_cycle_radius_ratio() * config.width.min(config.height);
        let radius = Self::radius(
            count,
            largest.width() + config.node_separation,
            largest.height() + config.node_separation,
            base,
        );

        debug!(count = count, radius = radius; "Cycle placement");

        let centers: Vec<Point> = (0..count)
            .map(|index| {
                if count == 1 {
                    return center;
                }
                let angle = TAU * index as f32 / count as f32;
                center.add_point(Point::new(angle.cos(), angle.sin()).scale(radius))
            })
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
