//! Attributed graph model consumed and produced by the split engine.
//!
//! Views derived during splitting share their source's tensors through
//! `Arc` and own freshly allocated label indices.

mod hetero;
mod homogeneous;
mod tensor;
mod types;

pub(crate) use self::homogeneous::check_edges;
pub use self::{
    hetero::{HeteroGraph, TypedAttributes},
    homogeneous::{Attributes, Graph},
    tensor::Tensor,
    types::{CustomSplit, Edge, EdgeIndex, EdgeType, NodeId, NodeType},
};

/// A dataset element: either homogeneous or heterogeneous.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyGraph {
    /// Single node and edge type.
    Homogeneous(Graph),
    /// Typed nodes and edges.
    Heterogeneous(HeteroGraph),
}

impl AnyGraph {
    /// Total number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        match self {
            Self::Homogeneous(graph) => graph.num_nodes(),
            Self::Heterogeneous(graph) => graph.num_nodes(),
        }
    }

    /// Total number of edges, undirected edges counted once.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        match self {
            Self::Homogeneous(graph) => graph.num_edges(),
            Self::Heterogeneous(graph) => graph.num_edges(),
        }
    }

    /// Whether the graph is heterogeneous.
    #[must_use]
    pub fn is_hetero(&self) -> bool {
        matches!(self, Self::Heterogeneous(_))
    }

    /// Borrows the homogeneous graph, if this is one.
    #[must_use]
    pub fn as_homogeneous(&self) -> Option<&Graph> {
        match self {
            Self::Homogeneous(graph) => Some(graph),
            Self::Heterogeneous(_) => None,
        }
    }

    /// Borrows the heterogeneous graph, if this is one.
    #[must_use]
    pub fn as_hetero(&self) -> Option<&HeteroGraph> {
        match self {
            Self::Heterogeneous(graph) => Some(graph),
            Self::Homogeneous(_) => None,
        }
    }

    /// Clones the graph with freshly allocated attribute tensors.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        match self {
            Self::Homogeneous(graph) => Self::Homogeneous(graph.deep_copy()),
            Self::Heterogeneous(graph) => Self::Heterogeneous(graph.deep_copy()),
        }
    }

    pub(crate) fn node_feature_columns(&self) -> usize {
        match self {
            Self::Homogeneous(graph) => graph.node_feature().map_or(0, Tensor::columns),
            Self::Heterogeneous(graph) => max_columns(graph.attributes().node_feature.values()),
        }
    }

    pub(crate) fn node_label_classes(&self) -> usize {
        match self {
            Self::Homogeneous(graph) => graph.node_label().map_or(0, Tensor::class_count),
            Self::Heterogeneous(graph) => max_classes(graph.attributes().node_label.values()),
        }
    }

    pub(crate) fn edge_feature_columns(&self) -> usize {
        match self {
            Self::Homogeneous(graph) => graph.edge_feature().map_or(0, Tensor::columns),
            Self::Heterogeneous(graph) => max_columns(graph.attributes().edge_feature.values()),
        }
    }

    pub(crate) fn edge_label_classes(&self) -> usize {
        match self {
            Self::Homogeneous(graph) => graph.edge_label().map_or(0, Tensor::class_count),
            Self::Heterogeneous(graph) => max_classes(graph.attributes().edge_label.values()),
        }
    }

    pub(crate) fn graph_feature_columns(&self) -> usize {
        match self {
            Self::Homogeneous(graph) => graph.graph_feature().map_or(0, graph_columns),
            Self::Heterogeneous(graph) => graph
                .attributes()
                .graph_feature
                .as_deref()
                .map_or(0, graph_columns),
        }
    }

    pub(crate) fn graph_label_classes(&self) -> usize {
        match self {
            Self::Homogeneous(graph) => graph.graph_label().map_or(0, Tensor::class_count),
            Self::Heterogeneous(graph) => graph.graph_label().map_or(0, Tensor::class_count),
        }
    }
}

impl From<Graph> for AnyGraph {
    fn from(graph: Graph) -> Self {
        Self::Homogeneous(graph)
    }
}

impl From<HeteroGraph> for AnyGraph {
    fn from(graph: HeteroGraph) -> Self {
        Self::Heterogeneous(graph)
    }
}

// A graph-level feature vector of length d counts as d features.
fn graph_columns(tensor: &Tensor) -> usize {
    if tensor.is_vector() {
        tensor.rows()
    } else {
        tensor.columns()
    }
}

fn max_columns<'a>(tensors: impl Iterator<Item = &'a std::sync::Arc<Tensor>>) -> usize {
    tensors.map(|tensor| tensor.columns()).max().unwrap_or(0)
}

fn max_classes<'a>(tensors: impl Iterator<Item = &'a std::sync::Arc<Tensor>>) -> usize {
    tensors.map(|tensor| tensor.class_count()).max().unwrap_or(0)
}
