//! Deterministic grid packing.
//!
//! This is the correctness backstop of the pipeline: cells are sized from the
//! largest node plus the configured spacing, so the result is overlap-free by
//! construction whatever the input.

use log::debug;

use diagrid_core::{
    geometry::{Point, Size},
    model::Archetype,
};

use crate::{
    config::LayoutConfig,
    layout::{
        graph::LayoutGraph,
        placement::Placement,
        routing::{EdgeRouter, EdgeRouting},
    },
};

/// Slack added to every cell so float rounding never makes neighbours touch.
const CELL_SLACK: f32 = 1.0;

/// Number of grid columns for `node_count` nodes.
///
/// Timelines keep their order on a single row.
pub fn column_count(node_count: usize, archetype: Archetype) -> usize {
    if node_count == 0 {
        return 0;
    }
    match archetype {
        Archetype::Timeline => node_count,
        _ => (node_count as f64).sqrt().ceil() as usize,
    }
}

/// Node centers of a grid packing, with the grid's top-left corner at the origin.
pub fn grid_centers(sizes: &[Size], columns: usize, spacing: f32) -> Vec<Point> {
    let columns = columns.max(1);
    let max_size = sizes
        .iter()
        .fold(Size::default(), |acc, &size| acc.max(size));
    let cell_width = max_size.width() + spacing + CELL_SLACK;
    let cell_height = max_size.height() + spacing + CELL_SLACK;

    (0..sizes.len())
        .map(|index| {
            let row = index / columns;
            let col = index % columns;
            Point::new(
                cell_width * (col as f32 + 0.5),
                cell_height * (row as f32 + 0.5),
            )
        })
        .collect()
}

/// Packs every node of `graph` into a grid and positions it on the canvas.
pub fn grid_placement(
    graph: &LayoutGraph<'_>,
    sizes: &[Size],
    archetype: Archetype,
    config: &LayoutConfig,
) -> Placement {
    let columns = column_count(graph.node_count(), archetype);
    let centers = grid_centers(sizes, columns, config.grid_spacing());

    debug!(
        node_count = graph.node_count(),
        columns = columns;
        "Grid fallback placement"
    );

    let mut router = EdgeRouter::new();
    router
        .set_routing(EdgeRouting::Straight)
        .set_direction(config.rank_direction_for(archetype))
        .set_edge_separation(config.edge_separation);

    Placement::from_centers(graph, &centers, sizes, &router).fitted_to_canvas(config)
}
