//! Structural validation of the input graph.
//!
//! Validation never fails outright. It always produces a usable
//! [`LayoutGraph`] (first occurrence wins for duplicate ids, edges with unknown
//! endpoints are left out) and records what was wrong, so the controller can
//! decide to fall back to grid packing.

use indexmap::IndexMap;
use log::{debug, warn};

use diagrid_core::model::{EdgeSpec, LayoutWarning, NodeSpec};

use crate::{
    LayoutError,
    layout::graph::{GraphEdge, LayoutGraph},
};

/// A structural problem found in the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    /// The node at this input position has an empty id
    EmptyId(usize),
    /// Two or more nodes share this id
    DuplicateId(String),
    /// The edge references a node id that does not exist
    UnknownEndpoint { from: String, to: String },
}

/// The outcome of [`validate`].
#[derive(Debug)]
pub struct Validation<'a> {
    graph: LayoutGraph<'a>,
    issues: Vec<Issue>,
}

impl<'a> Validation<'a> {
    pub fn graph(&self) -> &LayoutGraph<'a> {
        &self.graph
    }

    #[cfg(test)]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[cfg(test)]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// A single structural error summarizing every issue, if any were found.
    pub fn structural_error(&self) -> Option<LayoutError> {
        if self.issues.is_empty() {
            return None;
        }

        let mut empty_ids = Vec::new();
        let mut duplicates = Vec::new();
        let mut unknown = 0;
        for issue in &self.issues {
            match issue {
                Issue::EmptyId(position) => empty_ids.push(position.to_string()),
                Issue::DuplicateId(id) => duplicates.push(id.as_str()),
                Issue::UnknownEndpoint { .. } => unknown += 1,
            }
        }

        let mut parts = Vec::new();
        if !empty_ids.is_empty() {
            parts.push(format!("empty node id at position(s) {}", empty_ids.join(", ")));
        }
        if !duplicates.is_empty() {
            parts.push(format!("duplicate node id(s) {}", duplicates.join(", ")));
        }
        if unknown > 0 {
            parts.push(format!("{unknown} edge(s) referencing unknown nodes"));
        }
        Some(LayoutError::Structural(parts.join("; ")))
    }

    /// A [`LayoutWarning::DroppedEdge`] for every edge that was left out.
    pub fn dropped_edge_warnings(&self) -> Vec<LayoutWarning> {
        self.issues
            .iter()
            .filter_map(|issue| match issue {
                Issue::UnknownEndpoint { from, to } => Some(LayoutWarning::DroppedEdge {
                    from: from.clone(),
                    to: to.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// Validates the input and builds the index-based graph.
pub fn validate<'a>(nodes: &'a [NodeSpec], edges: &'a [EdgeSpec]) -> Validation<'a> {
    let mut issues = Vec::new();
    let mut index: IndexMap<&'a str, usize> = IndexMap::with_capacity(nodes.len());

    for (position, node) in nodes.iter().enumerate() {
        if node.id.is_empty() {
            issues.push(Issue::EmptyId(position));
            continue;
        }
        if index.contains_key(node.id.as_str()) {
            let duplicate = Issue::DuplicateId(node.id.clone());
            if !issues.contains(&duplicate) {
                issues.push(duplicate);
            }
            continue;
        }
        index.insert(node.id.as_str(), position);
    }

    let mut graph_edges = Vec::with_capacity(edges.len());
    for edge in edges {
        match (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
            (Some(&source), Some(&target)) => {
                graph_edges.push(GraphEdge::new(edge, source, target));
            }
            _ => {
                warn!(from = edge.from, to = edge.to; "Dropping edge with unknown endpoint");
                issues.push(Issue::UnknownEndpoint {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
        }
    }

    debug!(
        node_count = nodes.len(),
        edge_count = graph_edges.len(),
        issue_count = issues.len();
        "Input validated"
    );

    Validation {
        graph: LayoutGraph::new(nodes.iter().collect(), graph_edges),
        issues,
    }
}
