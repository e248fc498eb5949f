//! Archetype post-processors.
//!
//! Each [`Archetype`] has a strategy that re-places the base layered drawing
//! into the archetype's characteristic shape. Strategies are pure geometric
//! transforms; the overlap resolver repairs whatever overlap they leave and the
//! grid fallback backs it up.
//!
//! Strategies are looked up through a [`StrategyRegistry`]. The first
//! registered strategy that [supports](ArchetypeStrategy::supports) an
//! archetype wins; archetypes nobody claims get a pass-through strategy.

mod cycle;
mod flow;
mod matrix;
mod timeline;
mod tree;

pub use cycle::Cycle;
pub use flow::Flow;
pub use matrix::Matrix;
pub use timeline::Timeline;
pub use tree::Tree;

use diagrid_core::{
    geometry::Size,
    model::{Archetype, RankDirection},
};

use crate::{
    LayoutError,
    config::LayoutConfig,
    layout::{
        graph::LayoutGraph,
        placement::Placement,
        routing::{EdgeRouter, EdgeRouting},
    },
};

/// Slack added to computed spacings so float rounding never makes neighbours touch.
const SPACING_SLACK: f32 = 1.0;

/// Everything a strategy may consult besides the placement itself.
pub struct ArchetypeContext<'a, 'g> {
    graph: &'a LayoutGraph<'g>,
    config: &'a LayoutConfig,
    direction: RankDirection,
}

impl<'a, 'g> ArchetypeContext<'a, 'g> {
    pub fn new(
        graph: &'a LayoutGraph<'g>,
        config: &'a LayoutConfig,
        direction: RankDirection,
    ) -> Self {
        Self {
            graph,
            config,
            direction,
        }
    }

    pub fn graph(&self) -> &'a LayoutGraph<'g> {
        self.graph
    }

    pub fn config(&self) -> &'a LayoutConfig {
        self.config
    }

    pub fn direction(&self) -> RankDirection {
        self.direction
    }

    /// An edge router configured for this layout.
    pub fn router(&self, routing: EdgeRouting) -> EdgeRouter {
        let mut router = EdgeRouter::new();
        router
            .set_routing(routing)
            .set_direction(self.direction)
            .set_edge_separation(self.config.edge_separation);
        router
    }
}

/// An archetype-specific re-placement rule.
pub trait ArchetypeStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Returns true if this strategy handles `archetype`
    fn supports(&self, archetype: Archetype) -> bool;

    /// Re-places the nodes of `placement` and reroutes its edges
    fn apply(
        &self,
        placement: &Placement,
        ctx: &ArchetypeContext<'_, '_>,
    ) -> Result<Placement, LayoutError>;

    /// How edges are routed once this strategy has run
    fn edge_routing(&self) -> EdgeRouting {
        EdgeRouting::Orthogonal
    }

    /// Returns true if the strategy's geometry is exact and must not be perturbed
    /// by the aesthetic optimizer
    fn fixed_geometry(&self) -> bool {
        false
    }
}

/// Leaves the base placement untouched.
#[derive(Debug, Default)]
pub struct Passthrough;

impl ArchetypeStrategy for Passthrough {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn supports(&self, _archetype: Archetype) -> bool {
        false
    }

    fn apply(
        &self,
        placement: &Placement,
        _ctx: &ArchetypeContext<'_, '_>,
    ) -> Result<Placement, LayoutError> {
        Ok(placement.clone())
    }
}

/// Looks up the strategy for an archetype.
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn ArchetypeStrategy>>,
    default: Box<dyn ArchetypeStrategy>,
}

impl StrategyRegistry {
    /// A registry holding the built-in strategy of every archetype.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Box::new(Flow))
            .register(Box::new(Tree))
            .register(Box::new(Timeline))
            .register(Box::new(Matrix))
            .register(Box::new(Cycle));
        registry
    }

    /// A registry that only knows the pass-through strategy.
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
            default: Box::new(Passthrough),
        }
    }

    /// Adds a strategy. Strategies registered earlier take precedence.
    pub fn register(&mut self, strategy: Box<dyn ArchetypeStrategy>) -> &mut Self {
        self.strategies.push(strategy);
        self
    }

    /// The strategy for `archetype`, or the pass-through strategy if none supports it.
    pub fn strategy_for(&self, archetype: Archetype) -> &dyn ArchetypeStrategy {
        self.strategies
            .iter()
            .find(|strategy| strategy.supports(archetype))
            .unwrap_or(&self.default)
            .as_ref()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The largest width and height among `sizes`.
fn max_size(sizes: &[Size]) -> Size {
    sizes
        .iter()
        .fold(Size::default(), |acc, &size| acc.max(size))
}
