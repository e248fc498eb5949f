//! Configuration types for Diagrid layouts.
//!
//! This module provides the configuration structures that control canvas size,
//! spacing, iteration caps and the aesthetic scoring function. All types
//! implement [`serde::Deserialize`] with per-field defaults, so any subset can be
//! loaded from an external TOML or JSON document.
//!
//! # Overview
//!
//! - [`LayoutConfig`] - Canvas, spacing, iteration and time-budget settings.
//! - [`AestheticWeights`] - Weights of the aesthetic score terms.
//!
//! # Example
//!
//! ```
//! # use diagrid::config::LayoutConfig;
//! let config = LayoutConfig {
//!     width: 800.0,
//!     height: 600.0,
//!     ..LayoutConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use diagrid_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::{Archetype, RankDirection},
};

use crate::DiagridError;

const MIN_CYCLE_RADIUS_RATIO: f32 = 0.30;
const MAX_CYCLE_RADIUS_RATIO: f32 = 0.35;

/// Weights of the terms combined into the aesthetic score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AestheticWeights {
    /// Weight of the no-overlap term
    pub overlap: f32,
    /// Weight of the inverse edge-crossing term
    pub crossing: f32,
    /// Weight of the left-right symmetry term
    pub symmetry: f32,
    /// Weight of the compactness term
    pub compactness: f32,
    /// Weight of the edge-length uniformity term
    pub readability: f32,
}

impl Default for AestheticWeights {
    fn default() -> Self {
        Self {
            overlap: 0.4,
            crossing: 0.2,
            symmetry: 0.2,
            compactness: 0.1,
            readability: 0.1,
        }
    }
}

impl AestheticWeights {
    fn values(&self) -> [f32; 5] {
        [
            self.overlap,
            self.crossing,
            self.symmetry,
            self.compactness,
            self.readability,
        ]
    }
}

/// Layout configuration.
///
/// Every field has a default, see [`LayoutConfig::default`]. Call
/// [`LayoutConfig::validate`] before use; [`crate::LayoutEngine::new`] does so.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Canvas width
    pub width: f32,
    /// Canvas height
    pub height: f32,

    /// Minimum node width; labels widen nodes up to twice this value
    pub node_width: f32,
    /// Node height
    pub node_height: f32,
    /// Estimated advance of one label character
    pub char_width: f32,
    /// Horizontal padding added around the label
    pub label_padding: f32,

    /// Horizontal canvas margin
    pub margin_x: f32,
    /// Vertical canvas margin
    pub margin_y: f32,

    /// Required gap between any two node boxes
    pub node_separation: f32,
    /// Offset between parallel edges joining the same pair of nodes
    pub edge_separation: f32,
    /// Gap between layers of the layered placement
    pub rank_separation: f32,
    /// Overrides the archetype's rank direction when set
    pub rank_direction: Option<RankDirection>,

    /// Spacing floor used by the grid fallback
    pub min_spacing: f32,

    /// Overlap resolver iteration cap for regular graphs
    pub max_iterations: usize,
    /// Overlap resolver iteration cap for graphs handled by the complex engine
    pub complex_max_iterations: usize,

    /// Candidate moves tried by the aesthetic optimizer
    pub optimizer_iterations: usize,
    /// Largest single perturbation in pixels
    pub optimizer_step: f32,
    /// Consecutive rejected candidates after which the optimizer stops
    pub optimizer_patience: usize,
    /// Minimum score gain for a candidate to be accepted
    pub convergence_threshold: f32,

    /// Wall-clock budget for one layout call
    pub time_budget_ms: u64,

    /// Graphs with more nodes than this are laid out by the complex engine
    pub complex_threshold: usize,
    /// Clusters with more nodes than this are split
    pub max_cluster_size: usize,

    /// Cycle radius as a fraction of the smaller canvas dimension
    pub cycle_radius_ratio: f32,

    /// Run the archetype post-processor
    pub enable_archetype_optimization: bool,
    /// Run the aesthetic optimizer
    pub enable_aesthetic_pass: bool,

    /// Seed for every randomized decision
    pub seed: u64,

    pub weights: AestheticWeights,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            node_width: 120.0,
            node_height: 60.0,
            char_width: 8.0,
            label_padding: 16.0,
            margin_x: 40.0,
            margin_y: 40.0,
            node_separation: 30.0,
            edge_separation: 10.0,
            rank_separation: 60.0,
            rank_direction: None,
            min_spacing: 30.0,
            max_iterations: 50,
            complex_max_iterations: 100,
            optimizer_iterations: 60,
            optimizer_step: 12.0,
            optimizer_patience: 20,
            convergence_threshold: 1e-4,
            time_budget_ms: 5000,
            complex_threshold: 20,
            max_cluster_size: 12,
            cycle_radius_ratio: 0.35,
            enable_archetype_optimization: true,
            enable_aesthetic_pass: true,
            seed: 42,
            weights: AestheticWeights::default(),
        }
    }
}

impl LayoutConfig {
    /// Checks that the configuration describes a usable canvas.
    ///
    /// # Errors
    ///
    /// Returns [`DiagridError::InvalidConfig`] for non-positive or non-finite
    /// canvas or node dimensions, negative spacings or weights, or a zero
    /// cluster size.
    pub fn validate(&self) -> Result<(), DiagridError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("node_width", self.node_width),
            ("node_height", self.node_height),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(DiagridError::InvalidConfig(format!(
                    "`{name}` must be a positive number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("char_width", self.char_width),
            ("label_padding", self.label_padding),
            ("margin_x", self.margin_x),
            ("margin_y", self.margin_y),
            ("node_separation", self.node_separation),
            ("edge_separation", self.edge_separation),
            ("rank_separation", self.rank_separation),
            ("min_spacing", self.min_spacing),
            ("optimizer_step", self.optimizer_step),
            ("convergence_threshold", self.convergence_threshold),
            ("cycle_radius_ratio", self.cycle_radius_ratio),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(DiagridError::InvalidConfig(format!(
                    "`{name}` must be a non-negative number, got {value}"
                )));
            }
        }

        if self
            .weights
            .values()
            .iter()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(DiagridError::InvalidConfig(
                "aesthetic weights must be non-negative numbers".to_string(),
            ));
        }

        if self.max_cluster_size == 0 {
            return Err(DiagridError::InvalidConfig(
                "`max_cluster_size` must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// The canvas rectangle, anchored at the origin.
    pub fn canvas(&self) -> Bounds {
        Bounds::new_from_top_left(Point::default(), Size::new(self.width, self.height))
    }

    /// The canvas margins.
    pub fn margins(&self) -> Insets {
        Insets::symmetric(self.margin_x, self.margin_y)
    }

    /// The canvas minus its margins.
    pub fn content_area(&self) -> Bounds {
        self.canvas().shrink(self.margins())
    }

    /// The rank direction for an archetype, honoring the configured override.
    pub fn rank_direction_for(&self, archetype: Archetype) -> RankDirection {
        self.rank_direction
            .unwrap_or_else(|| archetype.rank_direction())
    }

    /// The cycle radius ratio clamped to its supported range.
    pub fn effective_cycle_radius_ratio(&self) -> f32 {
        self.cycle_radius_ratio
            .clamp(MIN_CYCLE_RADIUS_RATIO, MAX_CYCLE_RADIUS_RATIO)
    }

    /// The gap the grid fallback leaves between cells.
    pub fn grid_spacing(&self) -> f32 {
        self.min_spacing.max(self.node_separation)
    }
}
