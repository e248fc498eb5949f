//! Plain-data model exchanged with the layout engine's collaborators.
//!
//! Inbound types ([`NodeSpec`], [`EdgeSpec`], [`Archetype`]) are produced by the
//! upstream content-analysis stage. Outbound types ([`LayoutResult`] and
//! everything it contains) are consumed by renderers. All types serialize with
//! camelCase field names so they can travel as JSON.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Bounds, Point, Size};

/// Optional metadata attached to a node by the upstream analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMeta {
    /// Relative importance in `[0, 1]`. Important nodes are drawn slightly wider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f32>,
}

/// A node to be laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<NodeMeta>,
}

impl NodeSpec {
    /// Creates a node without metadata.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            meta: None,
        }
    }

    /// Attaches an importance value to the node.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.meta = Some(NodeMeta {
            importance: Some(importance),
        });
        self
    }

    /// Returns the importance clamped to `[0, 1]`, or zero when absent.
    pub fn importance(&self) -> f32 {
        self.meta
            .as_ref()
            .and_then(|meta| meta.importance)
            .filter(|value| value.is_finite())
            .map_or(0.0, |value| value.clamp(0.0, 1.0))
    }
}

/// A directed edge between two nodes, referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EdgeSpec {
    /// Creates an unlabeled edge.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    /// Attaches a label to the edge.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns true if the edge starts and ends at the same node.
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Primary axis along which layers are stacked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankDirection {
    /// Layers are rows stacked from top to bottom
    #[default]
    TopBottom,
    /// Layers are columns stacked from left to right
    LeftRight,
}

/// The supported diagram shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Flow,
    Tree,
    Timeline,
    Matrix,
    Cycle,
}

impl Archetype {
    /// All archetypes, in declaration order.
    pub const ALL: [Archetype; 5] = [
        Archetype::Flow,
        Archetype::Tree,
        Archetype::Timeline,
        Archetype::Matrix,
        Archetype::Cycle,
    ];

    /// The rank direction the base placer uses for this archetype.
    pub fn rank_direction(self) -> RankDirection {
        match self {
            Archetype::Timeline => RankDirection::LeftRight,
            Archetype::Flow | Archetype::Tree | Archetype::Matrix | Archetype::Cycle => {
                RankDirection::TopBottom
            }
        }
    }

    /// Lowercase name of the archetype.
    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Flow => "flow",
            Archetype::Tree => "tree",
            Archetype::Timeline => "timeline",
            Archetype::Matrix => "matrix",
            Archetype::Cycle => "cycle",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name an [`Archetype`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown archetype `{0}` (expected flow, tree, timeline, matrix or cycle)")]
pub struct ParseArchetypeError(String);

impl FromStr for Archetype {
    type Err = ParseArchetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Archetype::ALL
            .into_iter()
            .find(|archetype| archetype.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseArchetypeError(s.to_string()))
    }
}

/// A node with its final box. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    #[serde(flatten)]
    pub spec: NodeSpec,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl PositionedNode {
    /// Places a node of the given size with its top-left corner at `top_left`.
    pub fn new(spec: NodeSpec, top_left: Point, size: Size) -> Self {
        Self {
            spec,
            x: top_left.x(),
            y: top_left.y(),
            w: size.width(),
            h: size.height(),
        }
    }

    /// The node id.
    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// The node box size.
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// The node box.
    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(Point::new(self.x, self.y), self.size())
    }

    /// The center of the node box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Moves the node so its center lies at `center`.
    pub fn set_center(&mut self, center: Point) {
        self.x = center.x() - self.w / 2.0;
        self.y = center.y() - self.h / 2.0;
    }

    /// Returns a copy of the node moved so its center lies at `center`.
    pub fn centered_at(&self, center: Point) -> Self {
        let mut node = self.clone();
        node.set_center(center);
        node
    }
}

/// An edge with its routed polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    #[serde(flatten)]
    pub spec: EdgeSpec,
    pub points: Vec<Point>,
}

impl LayoutEdge {
    /// Total length of the polyline.
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

/// The true extent of a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Bounds> for LayoutBounds {
    fn from(bounds: Bounds) -> Self {
        Self {
            min_x: bounds.min_x(),
            min_y: bounds.min_y(),
            max_x: bounds.max_x(),
            max_y: bounds.max_y(),
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}

/// Layout quality measurements. `overlap_count` is zero for every successful result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub overlap_count: usize,
    pub overlap_area: f32,
    pub edge_crossings: usize,
    pub total_edge_length: f32,
    pub canvas_utilization: f32,
    pub symmetry_score: f32,
    pub compactness_score: f32,
    pub readability_score: f32,
    pub aesthetic_score: f32,
}

/// Which pipeline produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    /// Base placement, archetype post-processing, resolution, aesthetics
    Standard,
    /// Clustered placement for large graphs
    Complex,
    /// Deterministic grid packing
    GridFallback,
    /// Nothing to lay out
    Empty,
}

/// Which stage gave up when a convergence warning is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    BasePlacement,
    ArchetypePostProcess,
    OverlapResolution,
    AestheticOptimization,
    ComplexGraph,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::BasePlacement => "base placement",
            Stage::ArchetypePostProcess => "archetype post-processing",
            Stage::OverlapResolution => "overlap resolution",
            Stage::AestheticOptimization => "aesthetic optimization",
            Stage::ComplexGraph => "complex-graph engine",
        };
        f.write_str(name)
    }
}

/// A non-fatal condition recorded on a [`LayoutResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LayoutWarning {
    /// There were no nodes to lay out
    EmptyInput,
    /// The input was malformed; a grid layout was produced instead
    StructuralFallback { reason: String },
    /// An edge could not be attached to its nodes and was left out
    DroppedEdge { from: String, to: String },
    /// A stage failed and the pipeline continued with a simpler strategy
    StageFallback { stage: Stage, reason: String },
    /// A bounded loop ran out of iterations
    ConvergenceFailure {
        stage: Stage,
        iterations: usize,
        remaining_overlaps: usize,
    },
    /// The wall-clock budget ran out; the best layout so far was returned
    BudgetExceeded { elapsed_ms: u64, budget_ms: u64 },
    /// The layout extends past the configured canvas
    CanvasOverflow {
        width: f32,
        height: f32,
        canvas_width: f32,
        canvas_height: f32,
    },
    /// The grid fallback was used, so the archetype's shape was not preserved
    DegradedAesthetics,
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::EmptyInput => write!(f, "no nodes to lay out"),
            LayoutWarning::StructuralFallback { reason } => {
                write!(f, "malformed graph, used grid layout: {reason}")
            }
            LayoutWarning::DroppedEdge { from, to } => {
                write!(f, "edge {from} -> {to} references an unknown node and was dropped")
            }
            LayoutWarning::StageFallback { stage, reason } => {
                write!(f, "{stage} failed, continuing without it: {reason}")
            }
            LayoutWarning::ConvergenceFailure {
                stage,
                iterations,
                remaining_overlaps,
            } => write!(
                f,
                "{stage} did not converge after {iterations} iterations ({remaining_overlaps} overlaps left)"
            ),
            LayoutWarning::BudgetExceeded {
                elapsed_ms,
                budget_ms,
            } => write!(
                f,
                "time budget exceeded ({elapsed_ms} ms > {budget_ms} ms), returning best layout so far"
            ),
            LayoutWarning::CanvasOverflow {
                width,
                height,
                canvas_width,
                canvas_height,
            } => write!(
                f,
                "layout extent {width:.0}x{height:.0} exceeds canvas {canvas_width:.0}x{canvas_height:.0}"
            ),
            LayoutWarning::DegradedAesthetics => {
                write!(f, "grid fallback used, archetype shape not preserved")
            }
        }
    }
}

/// The positioned drawing handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<LayoutEdge>,
    pub bounds: LayoutBounds,
    pub processing_time_ms: u64,
    pub success: bool,
    pub quality_metrics: QualityMetrics,
    pub warnings: Vec<LayoutWarning>,
    pub pipeline: PipelineKind,
}

impl LayoutResult {
    /// Looks up a positioned node by id.
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Returns true if any warning satisfies the predicate.
    pub fn has_warning(&self, predicate: impl Fn(&LayoutWarning) -> bool) -> bool {
        self.warnings.iter().any(predicate)
    }
}
