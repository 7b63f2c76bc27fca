#![allow(dead_code, reason = "each test binary uses a subset of the fixtures")]

use graphsplit_core::{AnyGraph, Edge, EdgeType, Graph, GraphDataset, HeteroGraph};

/// Undirected cycle over `nodes` nodes with `nodes` edges.
#[must_use]
pub fn ring(nodes: usize) -> Graph {
    Graph::new(nodes, ring_edges(nodes), false).expect("ring endpoints are in range")
}

#[must_use]
pub fn ring_edges(nodes: usize) -> Vec<Edge> {
    (0..nodes).map(|u| (u, (u + 1) % nodes)).collect()
}

#[must_use]
pub fn writes() -> EdgeType {
    EdgeType::new("author", "writes", "paper")
}

#[must_use]
pub fn cites() -> EdgeType {
    EdgeType::new("paper", "cites", "paper")
}

/// 20 authors writing 40 papers' worth of edges and a 30-paper citation ring.
#[must_use]
pub fn bibliography() -> HeteroGraph {
    let authored: Vec<Edge> = (0..20).flat_map(|a| [(a, a), (a, (a + 10) % 30)]).collect();
    HeteroGraph::new(
        [("author", 20), ("paper", 30)],
        [(writes(), authored), (cites(), ring_edges(30))],
        false,
    )
    .expect("bibliography endpoints are in range")
}

/// Unwraps the single homogeneous graph held by each split container.
#[must_use]
pub fn only_graphs(splits: &[GraphDataset]) -> Vec<Graph> {
    splits
        .iter()
        .map(|split| {
            let graphs = split.graphs().expect("splits are materialised");
            assert_eq!(graphs.len(), 1, "one view per input graph");
            graphs[0].as_homogeneous().expect("homogeneous view").clone()
        })
        .collect()
}

#[must_use]
pub fn only_hetero(splits: &[GraphDataset]) -> Vec<HeteroGraph> {
    splits
        .iter()
        .map(|split| {
            let graphs = split.graphs().expect("splits are materialised");
            graphs[0].as_hetero().expect("heterogeneous view").clone()
        })
        .collect()
}

#[must_use]
pub fn node_counts(graphs: &[AnyGraph]) -> Vec<usize> {
    graphs.iter().map(AnyGraph::num_nodes).collect()
}

/// Whether `(u, v)` is a positive edge in either orientation.
#[must_use]
pub fn is_edge_of(edges: &[Edge], (u, v): Edge) -> bool {
    edges.iter().any(|&(a, b)| (a, b) == (u, v) || (a, b) == (v, u))
}
