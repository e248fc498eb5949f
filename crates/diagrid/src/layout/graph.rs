//! Index-based view of the input graph.
//!
//! Nodes are addressed by their position in the input slice; every later stage
//! works on these indices so iteration order, and therefore the layout, is
//! deterministic.

use petgraph::{Direction, algo, graph::DiGraph};

use diagrid_core::model::{EdgeSpec, NodeSpec};

/// An edge whose endpoints have been resolved to node indices.
#[derive(Debug, Clone, Copy)]
pub struct GraphEdge<'a> {
    spec: &'a EdgeSpec,
    source: usize,
    target: usize,
}

impl<'a> GraphEdge<'a> {
    pub fn new(spec: &'a EdgeSpec, source: usize, target: usize) -> Self {
        Self {
            spec,
            source,
            target,
        }
    }

    pub fn spec(&self) -> &'a EdgeSpec {
        self.spec
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// The graph being laid out.
#[derive(Debug, Clone)]
pub struct LayoutGraph<'a> {
    nodes: Vec<&'a NodeSpec>,
    edges: Vec<GraphEdge<'a>>,
    /// Undirected adjacency without self-loops, sorted and deduplicated
    neighbours: Vec<Vec<usize>>,
}

impl<'a> LayoutGraph<'a> {
    /// Builds a graph. Edge endpoints must be valid indices into `nodes`.
    pub fn new(nodes: Vec<&'a NodeSpec>, edges: Vec<GraphEdge<'a>>) -> Self {
        let mut neighbours = vec![Vec::new(); nodes.len()];
        for edge in edges.iter().filter(|edge| !edge.is_self_loop()) {
            neighbours[edge.source].push(edge.target);
            neighbours[edge.target].push(edge.source);
        }
        for list in &mut neighbours {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            nodes,
            edges,
            neighbours,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, index: usize) -> &'a NodeSpec {
        self.nodes[index]
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &'a NodeSpec> + '_ {
        self.nodes.iter().copied()
    }

    pub fn edges(&self) -> &[GraphEdge<'a>] {
        &self.edges
    }

    /// Nodes sharing an edge with `index`, in either direction.
    pub fn neighbours(&self, index: usize) -> &[usize] {
        &self.neighbours[index]
    }

    /// Returns true if every node has at most one parent and there are no cycles.
    pub fn is_forest(&self) -> bool {
        let mut graph = DiGraph::<(), ()>::with_capacity(self.nodes.len(), self.edges.len());
        let indices: Vec<_> = self.nodes.iter().map(|_| graph.add_node(())).collect();
        for edge in &self.edges {
            graph.add_edge(indices[edge.source], indices[edge.target], ());
        }

        if algo::is_cyclic_directed(&graph) {
            return false;
        }

        indices.iter().all(|&index| {
            let mut parents: Vec<_> = graph
                .neighbors_directed(index, Direction::Incoming)
                .collect();
            parents.sort_unstable();
            parents.dedup();
            parents.len() <= 1
        })
    }

    /// Returns the subgraph induced by `members`.
    ///
    /// Node `i` of the subgraph is `members[i]` of this graph.
    pub fn subgraph(&self, members: &[usize]) -> LayoutGraph<'a> {
        let mut local = vec![None; self.nodes.len()];
        for (local_index, &member) in members.iter().enumerate() {
            local[member] = Some(local_index);
        }

        let nodes = members.iter().map(|&member| self.nodes[member]).collect();
        let edges = self
            .edges
            .iter()
            .filter_map(|edge| match (local[edge.source], local[edge.target]) {
                (Some(source), Some(target)) => Some(GraphEdge::new(edge.spec, source, target)),
                _ => None,
            })
            .collect();

        LayoutGraph::new(nodes, edges)
    }
}
