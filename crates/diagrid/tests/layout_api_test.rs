//! Integration tests for the public layout API.

use std::thread;

use diagrid::{
    DiagridError, LayoutEngine,
    config::LayoutConfig,
    generate_layout,
    geometry::Point,
    model::{
        Archetype, EdgeSpec, LayoutResult, LayoutWarning, NodeSpec, PipelineKind, PositionedNode,
    },
};

fn nodes(ids: &[&str]) -> Vec<NodeSpec> {
    ids.iter().map(|id| NodeSpec::new(*id, *id)).collect()
}

fn chain(ids: &[&str]) -> Vec<EdgeSpec> {
    ids.windows(2).map(|pair| EdgeSpec::new(pair[0], pair[1])).collect()
}

fn numbered(count: usize) -> Vec<NodeSpec> {
    (0..count)
        .map(|i| NodeSpec::new(format!("n{i}"), format!("Step {i}")))
        .collect()
}

fn numbered_edges(pairs: &[(usize, usize)]) -> Vec<EdgeSpec> {
    pairs
        .iter()
        .map(|&(from, to)| EdgeSpec::new(format!("n{from}"), format!("n{to}")))
        .collect()
}

/// Gap between two node boxes along each axis; negative when they overlap on that axis.
fn gaps(a: &PositionedNode, b: &PositionedNode) -> (f32, f32) {
    let gap_x = (b.x - (a.x + a.w)).max(a.x - (b.x + b.w));
    let gap_y = (b.y - (a.y + a.h)).max(a.y - (b.y + b.h));
    (gap_x, gap_y)
}

fn assert_separated(result: &LayoutResult, separation: f32) {
    for (i, a) in result.nodes.iter().enumerate() {
        for b in &result.nodes[i + 1..] {
            let (gap_x, gap_y) = gaps(a, b);
            assert!(
                gap_x >= separation - 1e-3 || gap_y >= separation - 1e-3,
                "{} and {} are too close: gaps ({gap_x}, {gap_y})",
                a.id(),
                b.id()
            );
        }
    }
}

fn without_timing(mut result: LayoutResult) -> LayoutResult {
    result.processing_time_ms = 0;
    result
}

#[test]
fn test_three_node_flow() {
    let ids = ["A", "B", "C"];
    let result = generate_layout(
        &nodes(&ids),
        &chain(&ids),
        Archetype::Flow,
        &LayoutConfig::default(),
    )
    .expect("valid config");

    assert!(result.success);
    assert_eq!(result.pipeline, PipelineKind::Standard);
    assert_eq!(result.quality_metrics.overlap_count, 0);
    assert_eq!(result.nodes.len(), 3);
    assert_eq!(result.edges.len(), 2);
    assert!(result.edges.iter().all(|edge| edge.points.len() >= 2));

    let y = |id: &str| result.node(id).expect("node is laid out").center().y();
    assert!(y("A") < y("B"));
    assert!(y("B") < y("C"));
    assert_separated(&result, 30.0);
}

#[test]
fn test_five_node_cycle_lies_on_circle() {
    let ids = ["plan", "do", "check", "act", "learn"];
    let mut edges = chain(&ids);
    edges.push(EdgeSpec::new("learn", "plan"));
    let config = LayoutConfig::default();

    let result =
        generate_layout(&nodes(&ids), &edges, Archetype::Cycle, &config).expect("valid config");

    assert!(result.success);
    assert_eq!(result.quality_metrics.overlap_count, 0);

    let expected = config.cycle_radius_ratio * config.width.min(config.height);
    let center = Point::new(config.width / 2.0, config.height / 2.0);
    for node in &result.nodes {
        let radius = node.center().distance(center);
        assert!(
            (radius - expected).abs() <= expected * 0.05,
            "{} sits at radius {radius}, expected {expected}",
            node.id()
        );
    }
}

#[test]
fn test_large_graph_uses_complex_engine() {
    let pairs: Vec<(usize, usize)> = (0..24)
        .map(|i| (i, i + 1))
        .chain([(0, 5), (7, 12), (14, 20)])
        .collect();
    let config = LayoutConfig::default();

    let result = generate_layout(&numbered(25), &numbered_edges(&pairs), Archetype::Flow, &config)
        .expect("valid config");

    assert!(result.success);
    assert_eq!(result.pipeline, PipelineKind::Complex);
    assert_eq!(result.nodes.len(), 25);
    assert_eq!(result.quality_metrics.overlap_count, 0);
    assert!(!result.has_warning(|w| matches!(w, LayoutWarning::BudgetExceeded { .. })));
    assert!(result.processing_time_ms <= config.time_budget_ms);
    assert_separated(&result, config.node_separation);
}

#[test]
fn test_identical_unconnected_nodes_are_placed_apart_deterministically() {
    let twins = vec![NodeSpec::new("left", "Twin"), NodeSpec::new("right", "Twin")];
    let config = LayoutConfig::default();

    let first = generate_layout(&twins, &[], Archetype::Flow, &config).expect("valid config");
    let second = generate_layout(&twins, &[], Archetype::Flow, &config).expect("valid config");

    assert_eq!(first.quality_metrics.overlap_count, 0);
    assert_separated(&first, config.node_separation);
    assert_ne!(
        first.nodes[0].center(),
        first.nodes[1].center(),
        "twins must not share a center"
    );
    assert_eq!(without_timing(first), without_timing(second));
}

#[test]
fn test_tree_with_cycle_falls_back_to_grid() {
    let ids = ["root", "left", "right"];
    let mut edges = chain(&ids);
    edges.push(EdgeSpec::new("right", "root"));

    let result = generate_layout(
        &nodes(&ids),
        &edges,
        Archetype::Tree,
        &LayoutConfig::default(),
    )
    .expect("valid config");

    assert!(result.success);
    assert_eq!(result.pipeline, PipelineKind::GridFallback);
    assert_eq!(result.quality_metrics.overlap_count, 0);
    assert!(result.has_warning(|w| matches!(w, LayoutWarning::StructuralFallback { .. })));
}

#[test]
fn test_tree_levels_stack_top_to_bottom() {
    let nodes = nodes(&["ceo", "cto", "cfo", "dev", "ops"]);
    let edges = vec![
        EdgeSpec::new("ceo", "cto"),
        EdgeSpec::new("ceo", "cfo"),
        EdgeSpec::new("cto", "dev"),
        EdgeSpec::new("cto", "ops"),
    ];

    let result = generate_layout(&nodes, &edges, Archetype::Tree, &LayoutConfig::default())
        .expect("valid config");

    assert!(result.success);
    assert_eq!(result.pipeline, PipelineKind::Standard);
    let y = |id: &str| result.node(id).expect("node is laid out").center().y();
    assert!(y("ceo") < y("cto"));
    assert!(y("cto") < y("dev"));
    assert_separated(&result, 30.0);
}

#[test]
fn test_timeline_preserves_input_order() {
    let ids = ["2019", "2020", "2021", "2022", "2023", "2024"];
    let mut edges = chain(&ids);
    // A back edge must not reorder the timeline
    edges.push(EdgeSpec::new("2024", "2019"));

    let result = generate_layout(
        &nodes(&ids),
        &edges,
        Archetype::Timeline,
        &LayoutConfig::default(),
    )
    .expect("valid config");

    assert!(result.success);
    let xs: Vec<f32> = ids
        .iter()
        .map(|id| result.node(id).expect("node is laid out").center().x())
        .collect();
    assert!(xs.windows(2).all(|pair| pair[0] <= pair[1]), "{xs:?}");
}

#[test]
fn test_matrix_is_square_grid() {
    let result = generate_layout(
        &numbered(9),
        &[],
        Archetype::Matrix,
        &LayoutConfig::default(),
    )
    .expect("valid config");

    let mut rows: Vec<f32> = result.nodes.iter().map(|node| node.center().y()).collect();
    rows.sort_by(f32::total_cmp);
    rows.dedup();
    assert_eq!(rows.len(), 3);
    assert_eq!(result.quality_metrics.overlap_count, 0);
}

#[test]
fn test_layouts_are_deterministic() {
    let pairs = [(0, 1), (1, 2), (2, 3), (0, 4), (4, 5), (5, 6), (6, 2), (7, 3)];
    let config = LayoutConfig {
        seed: 1234,
        ..LayoutConfig::default()
    };

    for archetype in Archetype::ALL {
        let first = generate_layout(&numbered(8), &numbered_edges(&pairs), archetype, &config)
            .expect("valid config");
        let second = generate_layout(&numbered(8), &numbered_edges(&pairs), archetype, &config)
            .expect("valid config");
        assert_eq!(
            without_timing(first),
            without_timing(second),
            "{archetype} layout is not deterministic"
        );
    }
}

#[test]
fn test_empty_input_is_unsuccessful() {
    let result =
        generate_layout(&[], &[], Archetype::Flow, &LayoutConfig::default()).expect("valid config");

    assert!(!result.success);
    assert!(result.nodes.is_empty());
    assert!(result.edges.is_empty());
    assert_eq!(result.pipeline, PipelineKind::Empty);
    assert!(result.has_warning(|w| *w == LayoutWarning::EmptyInput));
}

#[test]
fn test_invalid_config_fails_fast() {
    let config = LayoutConfig {
        width: -10.0,
        ..LayoutConfig::default()
    };

    let result = generate_layout(&nodes(&["a"]), &[], Archetype::Flow, &config);
    assert!(matches!(result, Err(DiagridError::InvalidConfig(_))));
    assert!(LayoutEngine::new(config).is_err());
}

#[test]
fn test_unknown_endpoint_is_dropped_with_warning() {
    let ids = ["a", "b"];
    let mut edges = chain(&ids);
    edges.push(EdgeSpec::new("b", "ghost"));

    let result = generate_layout(&nodes(&ids), &edges, Archetype::Flow, &LayoutConfig::default())
        .expect("valid config");

    assert!(result.success);
    assert_eq!(result.edges.len(), 1);
    assert_eq!(result.pipeline, PipelineKind::GridFallback);
    assert!(result.has_warning(|w| matches!(
        w,
        LayoutWarning::DroppedEdge { from, to } if from == "b" && to == "ghost"
    )));
}

#[test]
fn test_duplicate_ids_keep_every_node() {
    let nodes = vec![
        NodeSpec::new("a", "First"),
        NodeSpec::new("a", "Second"),
        NodeSpec::new("b", "Third"),
    ];
    let edges = vec![EdgeSpec::new("a", "b")];

    let result = generate_layout(&nodes, &edges, Archetype::Flow, &LayoutConfig::default())
        .expect("valid config");

    assert!(result.success);
    assert_eq!(result.nodes.len(), 3);
    assert_eq!(result.quality_metrics.overlap_count, 0);
    assert!(result.has_warning(|w| matches!(w, LayoutWarning::StructuralFallback { .. })));
}

#[test]
fn test_edge_endpoints_lie_on_node_boundaries() {
    let pairs = [(0, 1), (0, 2), (1, 3), (2, 3), (3, 3), (1, 2), (1, 2)];
    for archetype in [Archetype::Flow, Archetype::Cycle, Archetype::Matrix] {
        let result = generate_layout(
            &numbered(4),
            &numbered_edges(&pairs),
            archetype,
            &LayoutConfig::default(),
        )
        .expect("valid config");

        for edge in &result.edges {
            let source = result.node(&edge.spec.from).expect("source is laid out");
            let target = result.node(&edge.spec.to).expect("target is laid out");
            let first = edge.points.first().copied().expect("edge has points");
            let last = edge.points.last().copied().expect("edge has points");
            assert!(
                source.bounds().is_on_boundary(first, 0.01),
                "{archetype}: {first:?} is not on {}",
                source.id()
            );
            assert!(
                target.bounds().is_on_boundary(last, 0.01),
                "{archetype}: {last:?} is not on {}",
                target.id()
            );
        }
    }
}

#[test]
fn test_small_layouts_stay_on_canvas() {
    let config = LayoutConfig::default();
    for archetype in Archetype::ALL {
        let result = generate_layout(
            &numbered(5),
            &numbered_edges(&[(0, 1), (1, 2), (1, 3), (3, 4)]),
            archetype,
            &config,
        )
        .expect("valid config");

        assert!(result.warnings.is_empty(), "{archetype}: {:?}", result.warnings);
        for node in &result.nodes {
            assert!(node.x >= 0.0 && node.x + node.w <= config.width);
            assert!(node.y >= 0.0 && node.y + node.h <= config.height);
        }
    }
}

#[test]
fn test_zero_budget_returns_best_effort_layout() {
    let config = LayoutConfig {
        time_budget_ms: 0,
        ..LayoutConfig::default()
    };

    let result = generate_layout(
        &numbered(6),
        &numbered_edges(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]),
        Archetype::Flow,
        &config,
    )
    .expect("valid config");

    assert!(result.success);
    assert_eq!(result.quality_metrics.overlap_count, 0);
    assert!(result.has_warning(|w| matches!(w, LayoutWarning::BudgetExceeded { .. })));
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = LayoutEngine::default();
    let nodes = numbered(12);
    let edges = numbered_edges(&[(0, 1), (1, 2), (2, 3), (3, 0), (4, 5), (5, 6), (8, 9)]);

    let expected = without_timing(engine.layout(&nodes, &edges, Archetype::Flow));

    let results: Vec<LayoutResult> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.layout(&nodes, &edges, Archetype::Flow)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("layout thread panicked"))
            .collect()
    });

    for result in results {
        assert_eq!(without_timing(result), expected);
    }
}
