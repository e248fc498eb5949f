//! Square grid placement.

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

/// Places nodes row-major on a square `⌈√n⌉` grid filling the content area.
///
/// Cells shrink to fit the content area but never below the largest node plus
/// the separation.
#[derive(Debug, Default)]
pub struct Matrix;

impl ArchetypeStrategy for Matrix {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn supports(&self, archetype: Archetype) -> bool {
        archetype == Archetype::Matrix
    }

    fn apply(
        &self,
        placement: &Placement,
        ctx: &ArchetypeContext<'_, '_>,
    ) -> Result<Placement, LayoutError> {
        let config = ctx.config();
        let sizes = placement.sizes();
        let count = sizes.len();
        if count == 0 {
            return Ok(placement.clone());
        }

        let columns = (count as f64).sqrt().ceil() as usize;
        let content = config.content_area();
        let largest = max_size(&sizes);

        let cell_width = (content.width() / columns as f32)
            .max(largest.width() + config.node_separation + SPACING_SLACK);
        let cell_height = (content.height() / columns as f32)
            .max(largest.height() + config.node_separation + SPACING_SLACK);

        debug!(
            columns = columns,
            cell_width = cell_width,
            cell_height = cell_height;
            "Matrix placement"
        );

        let centers: Vec<Point> = (0..count)
            .map(|index| {
                let row = index / columns;
                let col = index % columns;
                Point::new(
                    content.min_x() + cell_width * (col as f32 + 0.5),
                    content.min_y() + cell_height * (row as f32 + 0.5),
                )
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
