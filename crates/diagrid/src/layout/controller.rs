//! The pipeline driver.
//!
//! The controller runs the stages in order, turns every stage failure into a
//! safer strategy plus a [`LayoutWarning`], and re-verifies the zero-overlap
//! postcondition before anything is returned. The grid packing of
//! [`fallback`] is the unconditional backstop.

use log::{debug, info, warn};

use diagrid_core::{
    geometry::Size,
    model::{
        Archetype, EdgeSpec, LayoutBounds, LayoutResult, LayoutWarning, NodeSpec, PipelineKind,
        QualityMetrics, RankDirection, Stage,
    },
};

use crate::{
    LayoutError,
    config::LayoutConfig,
    layout::{
        aesthetic::{self, Optimizer},
        archetypes::{ArchetypeContext, StrategyRegistry},
        complex,
        deadline::Deadline,
        fallback,
        graph::LayoutGraph,
        overlap::{self, ResolveOutcome, Resolver},
        placement::Placement,
        placer,
        routing::{EdgeRouter, EdgeRouting},
        seeds, sizing,
        validate::validate,
    },
};

/// Tolerance of the canvas overflow check.
const OVERFLOW_TOLERANCE: f32 = 0.01;

/// Drives one layout call.
pub struct Controller<'a> {
    config: &'a LayoutConfig,
    registry: &'a StrategyRegistry,
}

impl<'a> Controller<'a> {
    pub fn new(config: &'a LayoutConfig, registry: &'a StrategyRegistry) -> Self {
        Self { config, registry }
    }

    /// Lays out `nodes` and `edges` as `archetype`.
    ///
    /// Never fails: malformed input, failed stages and blown budgets all
    /// degrade into an overlap-free layout with warnings. Only empty input
    /// produces `success = false`.
    pub fn run(
        &self,
        nodes: &[NodeSpec],
        edges: &[EdgeSpec],
        archetype: Archetype,
    ) -> LayoutResult {
        let deadline = Deadline::new(self.config.time_budget_ms);
        info!(
            node_count = nodes.len(),
            edge_count = edges.len(),
            archetype = archetype.as_str();
            "Starting layout"
        );

        if nodes.is_empty() {
            info!("No nodes to lay out");
            return empty_result(&deadline);
        }

        let validation = validate(nodes, edges);
        let graph = validation.graph();
        let sizes = sizing::node_sizes(graph.nodes(), self.config);
        let direction = self.config.rank_direction_for(archetype);

        let mut warnings = Vec::new();
        let (placement, pipeline) = match validation.structural_error() {
            Some(error) => {
                warn!(error:%; "Malformed graph, falling back to grid layout");
                warnings.push(LayoutWarning::StructuralFallback {
                    reason: error.to_string(),
                });
                warnings.extend(validation.dropped_edge_warnings());
                (
                    self.grid(graph, &sizes, archetype),
                    PipelineKind::GridFallback,
                )
            }
            None => self.pipeline(graph, &sizes, archetype, direction, &deadline, &mut warnings),
        };

        self.finish(graph, &sizes, archetype, placement, pipeline, warnings, &deadline)
    }

    /// Base placement, archetype post-processing, resolution and aesthetics.
    fn pipeline(
        &self,
        graph: &LayoutGraph<'_>,
        sizes: &[Size],
        archetype: Archetype,
        direction: RankDirection,
        deadline: &Deadline,
        warnings: &mut Vec<LayoutWarning>,
    ) -> (Placement, PipelineKind) {
        let config = self.config;
        let is_complex = graph.node_count() > config.complex_threshold;

        let base = if is_complex {
            let mut engine = complex::Engine::new(config);
            engine.set_direction(direction);
            let layout = engine.layout(graph, sizes, deadline);
            debug!(cluster_count = layout.cluster_count; "Complex base placement done");
            warnings.extend(layout.warnings);
            layout.placement
        } else {
            let mut engine = placer::Engine::new();
            engine
                .set_node_separation(config.node_separation)
                .set_rank_separation(config.rank_separation)
                .set_direction(direction);
            match engine.place(graph, sizes) {
                Ok(centers) => {
                    let router = self.router(EdgeRouting::Orthogonal, direction);
                    Placement::from_centers(graph, &centers, sizes, &router)
                        .fitted_to_canvas(config)
                }
                Err(error) => {
                    warn!(error:%; "Base placement failed, falling back to grid layout");
                    warnings.push(LayoutWarning::StageFallback {
                        stage: Stage::BasePlacement,
                        reason: error.to_string(),
                    });
                    return (
                        self.grid(graph, sizes, archetype),
                        PipelineKind::GridFallback,
                    );
                }
            }
        };
        debug!(node_count = base.len(); "Base placement done");

        let pipeline = if is_complex {
            PipelineKind::Complex
        } else {
            PipelineKind::Standard
        };

        let mut routing = EdgeRouting::Orthogonal;
        let mut fixed_geometry = false;
        let shaped = if config.enable_archetype_optimization {
            let strategy = self.registry.strategy_for(archetype);
            let ctx = ArchetypeContext::new(graph, config, direction);
            match strategy.apply(&base, &ctx) {
                Ok(shaped) => {
                    debug!(strategy = strategy.name(); "Archetype post-processing done");
                    routing = strategy.edge_routing();
                    fixed_geometry = strategy.fixed_geometry();
                    shaped
                }
                Err(LayoutError::Structural(reason)) => {
                    warn!(
                        strategy = strategy.name(),
                        reason = reason;
                        "Graph does not fit the archetype, falling back to grid layout"
                    );
                    warnings.push(LayoutWarning::StructuralFallback { reason });
                    return (
                        self.grid(graph, sizes, archetype),
                        PipelineKind::GridFallback,
                    );
                }
                Err(error) => {
                    warn!(strategy = strategy.name(), error:%; "Archetype post-processing failed");
                    warnings.push(LayoutWarning::StageFallback {
                        stage: Stage::ArchetypePostProcess,
                        reason: error.to_string(),
                    });
                    base
                }
            }
        } else {
            base
        };

        let router = self.router(routing, direction);
        let canvas = config.canvas();
        // Post-processors may deliberately overflow the canvas
        let clamp_area = shaped
            .node_bounds()
            .map_or(canvas, |bounds| canvas.merge(&bounds));

        let mut resolver = Resolver::new();
        resolver
            .set_separation(config.node_separation)
            .set_max_iterations(if is_complex {
                config.complex_max_iterations
            } else {
                config.max_iterations
            })
            .set_seed(config.seed ^ seeds::OVERLAP);
        let resolution = resolver.resolve(shaped.nodes(), clamp_area, deadline);

        let resolved = match resolution.outcome {
            ResolveOutcome::Converged { iterations } => {
                debug!(iterations = iterations; "Overlap resolution converged");
                Placement::routed(graph, resolution.nodes, &router)
            }
            ResolveOutcome::Exhausted {
                iterations,
                remaining,
            } => {
                let error = LayoutError::Convergence {
                    stage: Stage::OverlapResolution,
                    iterations,
                    remaining_overlaps: remaining,
                };
                warn!(error:%, remaining = remaining; "Falling back to grid layout");
                warnings.push(LayoutWarning::ConvergenceFailure {
                    stage: Stage::OverlapResolution,
                    iterations,
                    remaining_overlaps: remaining,
                });
                push_once(warnings, LayoutWarning::DegradedAesthetics);
                return (
                    self.grid(graph, sizes, archetype),
                    PipelineKind::GridFallback,
                );
            }
            ResolveOutcome::DeadlineExpired {
                iterations,
                remaining,
            } => {
                warn!(
                    iterations = iterations,
                    remaining = remaining;
                    "Time budget ran out during overlap resolution, falling back to grid layout"
                );
                push_once(warnings, LayoutWarning::DegradedAesthetics);
                return (
                    self.grid(graph, sizes, archetype),
                    PipelineKind::GridFallback,
                );
            }
        };

        if !config.enable_aesthetic_pass || fixed_geometry || deadline.is_expired() {
            return (resolved, pipeline);
        }

        let mut optimizer = Optimizer::from_config(config);
        optimizer.set_seed(config.seed ^ seeds::AESTHETIC);
        let optimization = optimizer.optimize(&resolved, graph, &router, clamp_area, deadline);
        debug!(
            steps = optimization.steps,
            accepted = optimization.accepted,
            score = optimization.score;
            "Aesthetic optimization done"
        );

        (optimization.placement, pipeline)
    }

    /// Verifies the postcondition and assembles the result.
    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        graph: &LayoutGraph<'_>,
        sizes: &[Size],
        archetype: Archetype,
        placement: Placement,
        pipeline: PipelineKind,
        mut warnings: Vec<LayoutWarning>,
        deadline: &Deadline,
    ) -> LayoutResult {
        let config = self.config;

        let overlaps = overlap::detect(placement.nodes(), config.node_separation);
        let (placement, pipeline) = if overlaps.is_empty() {
            (placement, pipeline)
        } else {
            warn!(
                overlap_count = overlaps.len();
                "Overlap postcondition failed, falling back to grid layout"
            );
            push_once(&mut warnings, LayoutWarning::DegradedAesthetics);
            (
                self.grid(graph, sizes, archetype),
                PipelineKind::GridFallback,
            )
        };

        if deadline.is_expired() {
            let elapsed_ms = deadline.elapsed_ms();
            let budget_ms = deadline.budget_ms();
            let error = LayoutError::BudgetExceeded {
                elapsed_ms,
                budget_ms,
            };
            warn!(error:%; "Returning best layout so far");
            warnings.push(LayoutWarning::BudgetExceeded {
                elapsed_ms,
                budget_ms,
            });
        }

        let bounds = placement.bounds().unwrap_or_default();
        if bounds.min_x() < -OVERFLOW_TOLERANCE
            || bounds.min_y() < -OVERFLOW_TOLERANCE
            || bounds.max_x() > config.width + OVERFLOW_TOLERANCE
            || bounds.max_y() > config.height + OVERFLOW_TOLERANCE
        {
            debug!(
                width = bounds.width(),
                height = bounds.height();
                "Layout overflows the canvas"
            );
            warnings.push(LayoutWarning::CanvasOverflow {
                width: bounds.width(),
                height: bounds.height(),
                canvas_width: config.width,
                canvas_height: config.height,
            });
        }

        let quality_metrics = aesthetic::measure(&placement, config);
        let (nodes, edges) = placement.into_parts();
        let processing_time_ms = deadline.elapsed_ms();

        info!(
            pipeline:?,
            node_count = nodes.len(),
            warning_count = warnings.len(),
            aesthetic_score = quality_metrics.aesthetic_score,
            processing_time_ms = processing_time_ms;
            "Layout finished"
        );

        LayoutResult {
            nodes,
            edges,
            bounds: LayoutBounds::from(bounds),
            processing_time_ms,
            success: true,
            quality_metrics,
            warnings,
            pipeline,
        }
    }

    fn grid(&self, graph: &LayoutGraph<'_>, sizes: &[Size], archetype: Archetype) -> Placement {
        fallback::grid_placement(graph, sizes, archetype, self.config)
    }

    fn router(&self, routing: EdgeRouting, direction: RankDirection) -> EdgeRouter {
        let mut router = EdgeRouter::new();
        router
            .set_routing(routing)
            .set_direction(direction)
            .set_edge_separation(self.config.edge_separation);
        router
    }
}

fn push_once(warnings: &mut Vec<LayoutWarning>, warning: LayoutWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}

fn empty_result(deadline: &Deadline) -> LayoutResult {
    LayoutResult {
        nodes: Vec::new(),
        edges: Vec::new(),
        bounds: LayoutBounds::default(),
        processing_time_ms: deadline.elapsed_ms(),
        success: false,
        quality_metrics: QualityMetrics::default(),
        warnings: vec![LayoutWarning::EmptyInput],
        pipeline: PipelineKind::Empty,
    }
}
