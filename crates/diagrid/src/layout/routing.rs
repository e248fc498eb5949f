//! Edge routing.
//!
//! Edges are attached to the boundary of their node boxes. Two styles are
//! supported: straight chords between node centers and orthogonal three-segment
//! routes for layered placements. Parallel edges joining the same pair of nodes
//! are spread apart by the configured edge separation; self-loops leave and
//! re-enter the right side of their node.

use std::collections::BTreeMap;

use diagrid_core::{
    geometry::{Bounds, Point},
    model::{LayoutEdge, PositionedNode, RankDirection},
};

use crate::layout::graph::LayoutGraph;

/// Base extent of a self-loop to the right of its node.
const SELF_LOOP_EXTENT: f32 = 20.0;

/// Keeps offset attachment points this far inside the box corners.
const CORNER_INSET: f32 = 1.0;

/// How edges are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeRouting {
    /// A straight segment from boundary to boundary
    Straight,
    /// Leave along the rank axis, bend halfway, enter along the rank axis
    #[default]
    Orthogonal,
}

/// Routes every edge of a graph for a given set of node positions.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRouter {
    routing: EdgeRouting,
    direction: RankDirection,
    edge_separation: f32,
}

impl EdgeRouter {
    pub fn new() -> Self {
        Self {
            routing: EdgeRouting::default(),
            direction: RankDirection::default(),
            edge_separation: 10.0,
        }
    }

    pub fn set_routing(&mut self, routing: EdgeRouting) -> &mut Self {
        self.routing = routing;
        self
    }

    pub fn set_direction(&mut self, direction: RankDirection) -> &mut Self {
        self.direction = direction;
        self
    }

    pub fn set_edge_separation(&mut self, separation: f32) -> &mut Self {
        self.edge_separation = separation;
        self
    }

    /// Routes all edges of `graph`; `nodes` is indexed like the graph.
    pub fn route(&self, graph: &LayoutGraph<'_>, nodes: &[PositionedNode]) -> Vec<LayoutEdge> {
        let slots = self.parallel_slots(graph);

        graph
            .edges()
            .iter()
            .zip(slots)
            .map(|(edge, (slot, count))| {
                let source = &nodes[edge.source()];
                let target = &nodes[edge.target()];

                let points = if edge.is_self_loop() {
                    self.self_loop(source.bounds(), slot)
                } else {
                    let offset = (slot as f32 - (count - 1) as f32 / 2.0) * self.edge_separation;
                    match self.routing {
                        EdgeRouting::Straight => {
                            // Straight offsets are perpendicular to the edge direction;
                            // flip reversed edges so they do not coincide with forward ones
                            let sign = if edge.source() < edge.target() {
                                1.0
                            } else {
                                -1.0
                            };
                            straight(source.bounds(), target.bounds(), offset * sign)
                        }
                        EdgeRouting::Orthogonal => {
                            self.orthogonal(source.bounds(), target.bounds(), offset)
                        }
                    }
                };

                LayoutEdge {
                    spec: edge.spec().clone(),
                    points,
                }
            })
            .collect()
    }

    /// For each edge, its slot among the edges joining the same pair and the size of that group.
    fn parallel_slots(&self, graph: &LayoutGraph<'_>) -> Vec<(usize, usize)> {
        let mut groups: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        let slots: Vec<_> = graph
            .edges()
            .iter()
            .map(|edge| {
                let key = (
                    edge.source().min(edge.target()),
                    edge.source().max(edge.target()),
                );
                let slot = groups.entry(key).or_insert(0);
                let assigned = *slot;
                *slot += 1;
                (key, assigned)
            })
            .collect();

        slots
            .into_iter()
            .map(|(key, slot)| (slot, groups.get(&key).copied().unwrap_or(1)))
            .collect()
    }

    fn self_loop(&self, bounds: Bounds, slot: usize) -> Vec<Point> {
        let extent = SELF_LOOP_EXTENT + slot as f32 * self.edge_separation;
        let quarter = bounds.height() / 4.0;
        let center = bounds.center();
        let top = center.y() - quarter;
        let bottom = center.y() + quarter;
        let right = bounds.max_x();

        vec![
            Point::new(right, top),
            Point::new(right + extent, top),
            Point::new(right + extent, bottom),
            Point::new(right, bottom),
        ]
    }

    fn orthogonal(&self, source: Bounds, target: Bounds, offset: f32) -> Vec<Point> {
        // Boxes sharing a layer are joined through their facing sides instead
        let along_rank = match self.direction {
            RankDirection::TopBottom => {
                !(target.min_y() < source.max_y() && source.min_y() < target.max_y())
            }
            RankDirection::LeftRight => {
                !(target.min_x() < source.max_x() && source.min_x() < target.max_x())
            }
        };
        let vertical = match self.direction {
            RankDirection::TopBottom => along_rank,
            RankDirection::LeftRight => !along_rank,
        };

        let source_center = source.center();
        let target_center = target.center();

        if vertical {
            let offset = clamp_offset(offset, source.width().min(target.width()));
            let (start_y, end_y) = if target_center.y() >= source_center.y() {
                (source.max_y(), target.min_y())
            } else {
                (source.min_y(), target.max_y())
            };
            let start = Point::new(source_center.x() + offset, start_y);
            let end = Point::new(target_center.x() + offset, end_y);
            bend(start, end, true)
        } else {
            let offset = clamp_offset(offset, source.height().min(target.height()));
            let (start_x, end_x) = if target_center.x() >= source_center.x() {
                (source.max_x(), target.min_x())
            } else {
                (source.min_x(), target.max_x())
            };
            let start = Point::new(start_x, source_center.y() + offset);
            let end = Point::new(end_x, target_center.y() + offset);
            bend(start, end, false)
        }
    }
}

impl Default for EdgeRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Straight chord between two boxes, shifted sideways by `offset`.
pub fn straight(source: Bounds, target: Bounds, offset: f32) -> Vec<Point> {
    let source_center = source.center();
    let target_center = target.center();
    let delta = target_center.sub_point(source_center);
    let length = delta.hypot();

    let shift = if length > f32::EPSILON && offset != 0.0 {
        let limit = source
            .width()
            .min(source.height())
            .min(target.width())
            .min(target.height());
        let offset = clamp_offset(offset, limit);
        Point::new(-delta.y() / length, delta.x() / length).scale(offset)
    } else {
        Point::default()
    };

    let source_origin = source_center.add_point(shift);
    let target_origin = target_center.add_point(shift);

    vec![
        source.exit_point(source_origin, target_origin),
        target.exit_point(target_origin, source_origin),
    ]
}

/// Keeps a sideways offset strictly inside a box side of the given length.
fn clamp_offset(offset: f32, side: f32) -> f32 {
    let limit = (side / 2.0 - CORNER_INSET).max(0.0);
    offset.clamp(-limit, limit)
}

/// Three-segment route bending halfway along the primary axis.
fn bend(start: Point, end: Point, vertical: bool) -> Vec<Point> {
    if vertical {
        if start.x() == end.x() {
            return vec![start, end];
        }
        let mid = (start.y() + end.y()) / 2.0;
        vec![start, start.with_y(mid), end.with_y(mid), end]
    } else {
        if start.y() == end.y() {
            return vec![start, end];
        }
        let mid = (start.x() + end.x()) / 2.0;
        vec![start, start.with_x(mid), end.with_x(mid), end]
    }
}
