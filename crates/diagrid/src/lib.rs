//! Diagrid - An archetype-aware diagram layout engine.
//!
//! Given nodes, directed edges, a diagram [archetype](model::Archetype) and a
//! [`LayoutConfig`](config::LayoutConfig), Diagrid computes positioned node
//! boxes and routed edge polylines. The result never contains two nodes closer
//! than the configured separation: when a stage cannot deliver that, the
//! layout degrades to a deterministic grid packing and says so in its
//! [warnings](model::LayoutWarning).
//!
//! Layouts are pure functions of their input. The same nodes, edges, archetype
//! and configuration (including its seed) always produce the same result,
//! apart from the measured processing time.
//!
//! # Example
//!
//! ```rust
//! use diagrid::{
//!     LayoutEngine,
//!     config::LayoutConfig,
//!     model::{Archetype, EdgeSpec, NodeSpec},
//! };
//!
//! let nodes = vec![
//!     NodeSpec::new("a", "Receive order"),
//!     NodeSpec::new("b", "Ship"),
//!     NodeSpec::new("c", "Invoice"),
//! ];
//! let edges = vec![EdgeSpec::new("a", "b"), EdgeSpec::new("b", "c")];
//!
//! let engine = LayoutEngine::new(LayoutConfig::default()).expect("valid config");
//! let result = engine.layout(&nodes, &edges, Archetype::Flow);
//!
//! assert!(result.success);
//! assert_eq!(result.quality_metrics.overlap_count, 0);
//! ```

pub mod config;

mod error;
mod layout;

pub use diagrid_core::{geometry, model};

pub use error::DiagridError;
pub(crate) use error::LayoutError;

use log::debug;

use config::LayoutConfig;
use layout::{archetypes::StrategyRegistry, controller::Controller};
use model::{Archetype, EdgeSpec, LayoutResult, NodeSpec};

/// A validated layout configuration.
///
/// The engine holds no per-call state, so one engine may serve any number of
/// layouts, also from several threads at once.
///
/// # Examples
///
/// ```rust
/// use diagrid::{LayoutEngine, model::{Archetype, NodeSpec}};
///
/// let engine = LayoutEngine::default();
/// let result = engine.layout(&[NodeSpec::new("solo", "Solo")], &[], Archetype::Matrix);
/// assert_eq!(result.nodes.len(), 1);
/// ```
pub struct LayoutEngine {
    config: LayoutConfig,
    registry: StrategyRegistry,
}

impl LayoutEngine {
    /// Create a layout engine.
    ///
    /// # Errors
    ///
    /// Returns [`DiagridError::InvalidConfig`] if `config` fails
    /// [`LayoutConfig::validate`].
    pub fn new(config: LayoutConfig) -> Result<Self, DiagridError> {
        config.validate()?;
        debug!(seed = config.seed, time_budget_ms = config.time_budget_ms; "Layout engine ready");
        Ok(Self {
            config,
            registry: StrategyRegistry::new(),
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `nodes` and `edges` as `archetype`.
    ///
    /// This never fails. Malformed graphs, failed stages and an exceeded time
    /// budget are reported through [`LayoutResult::warnings`]; an empty node
    /// list yields `success = false`.
    pub fn layout(
        &self,
        nodes: &[NodeSpec],
        edges: &[EdgeSpec],
        archetype: Archetype,
    ) -> LayoutResult {
        Controller::new(&self.config, &self.registry).run(nodes, edges, archetype)
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            config: LayoutConfig::default(),
            registry: StrategyRegistry::new(),
        }
    }
}

/// Lay out a graph in one call.
///
/// Equivalent to [`LayoutEngine::new`] followed by [`LayoutEngine::layout`].
///
/// # Errors
///
/// Returns [`DiagridError::InvalidConfig`] if `config` is invalid, for example
/// when the canvas has a non-positive dimension.
pub fn generate_layout(
    nodes: &[NodeSpec],
    edges: &[EdgeSpec],
    archetype: Archetype,
    config: &LayoutConfig,
) -> Result<LayoutResult, DiagridError> {
    let engine = LayoutEngine::new(config.clone())?;
    Ok(engine.layout(nodes, edges, archetype))
}
