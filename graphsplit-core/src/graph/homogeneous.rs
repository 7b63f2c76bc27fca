//! Homogeneous attributed graphs and their split views.

use std::sync::Arc;

use crate::error::GraphError;

use super::{
    tensor::Tensor,
    types::{CustomSplit, Edge, EdgeIndex, NodeId},
};

/// Feature and label tensors shared between a graph and its split views.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    pub(crate) node_feature: Option<Arc<Tensor>>,
    pub(crate) node_label: Option<Arc<Tensor>>,
    pub(crate) edge_feature: Option<Arc<Tensor>>,
    pub(crate) edge_label: Option<Arc<Tensor>>,
    pub(crate) graph_feature: Option<Arc<Tensor>>,
    pub(crate) graph_label: Option<Arc<Tensor>>,
}

impl Attributes {
    fn deep_copy(&self) -> Self {
        let copy = |slot: &Option<Arc<Tensor>>| slot.as_deref().cloned().map(Arc::new);
        Self {
            node_feature: copy(&self.node_feature),
            node_label: copy(&self.node_label),
            edge_feature: copy(&self.edge_feature),
            edge_label: copy(&self.edge_label),
            graph_feature: copy(&self.graph_feature),
            graph_label: copy(&self.graph_label),
        }
    }
}

/// A homogeneous attributed graph.
///
/// Undirected graphs store each edge once; [`Graph::edge_index`] and
/// [`Graph::edge_label_index`] list both orientations.
///
/// # Examples
/// ```
/// use graphsplit_core::{Graph, Tensor};
///
/// let graph = Graph::new(3, vec![(0, 1), (1, 2)], false)?
///     .with_node_feature(Tensor::new(vec![3, 1], vec![0.5, 1.5, 2.5])?)?;
/// assert_eq!(graph.num_edges(), 2);
/// assert_eq!(graph.edge_index().len(), 4);
/// assert_eq!(graph.node_label_index(), &[0, 1, 2]);
/// # Ok::<(), graphsplit_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    num_nodes: usize,
    directed: bool,
    edges: Arc<[Edge]>,
    message_edges: Arc<[Edge]>,
    attributes: Arc<Attributes>,
    node_label_index: Vec<NodeId>,
    label_edges: Vec<Edge>,
    negative_edges: Vec<Edge>,
    custom_splits: Option<CustomSplit>,
    custom_disjoint_split: Option<Vec<Edge>>,
}

impl Graph {
    /// Creates a graph with `num_nodes` nodes and the given edges.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfRange`] when an edge references a node
    /// id of `num_nodes` or above.
    pub fn new(num_nodes: usize, edges: Vec<Edge>, directed: bool) -> Result<Self, GraphError> {
        check_edges(&edges, num_nodes, num_nodes)?;
        let edges: Arc<[Edge]> = Arc::from(edges);
        Ok(Self {
            num_nodes,
            directed,
            label_edges: edges.to_vec(),
            message_edges: Arc::clone(&edges),
            edges,
            attributes: Arc::new(Attributes::default()),
            node_label_index: (0..num_nodes).collect(),
            negative_edges: Vec::new(),
            custom_splits: None,
            custom_disjoint_split: None,
        })
    }

    /// Attaches a per-node feature tensor.
    ///
    /// # Errors
    /// Returns [`GraphError::RowCountMismatch`] when the row count differs from
    /// the node count.
    pub fn with_node_feature(mut self, tensor: Tensor) -> Result<Self, GraphError> {
        check_rows("node_feature", &tensor, self.num_nodes, "nodes")?;
        Arc::make_mut(&mut self.attributes).node_feature = Some(Arc::new(tensor));
        Ok(self)
    }

    /// Attaches a per-node label tensor.
    ///
    /// # Errors
    /// Returns [`GraphError::RowCountMismatch`] when the row count differs from
    /// the node count.
    pub fn with_node_label(mut self, tensor: Tensor) -> Result<Self, GraphError> {
        check_rows("node_label", &tensor, self.num_nodes, "nodes")?;
        Arc::make_mut(&mut self.attributes).node_label = Some(Arc::new(tensor));
        Ok(self)
    }

    /// Attaches a per-edge feature tensor.
    ///
    /// # Errors
    /// Returns [`GraphError::RowCountMismatch`] when the row count differs from
    /// the edge count.
    pub fn with_edge_feature(mut self, tensor: Tensor) -> Result<Self, GraphError> {
        check_rows("edge_feature", &tensor, self.edges.len(), "edges")?;
        Arc::make_mut(&mut self.attributes).edge_feature = Some(Arc::new(tensor));
        Ok(self)
    }

    /// Attaches a per-edge label tensor.
    ///
    /// # Errors
    /// Returns [`GraphError::RowCountMismatch`] when the row count differs from
    /// the edge count.
    pub fn with_edge_label(mut self, tensor: Tensor) -> Result<Self, GraphError> {
        check_rows("edge_label", &tensor, self.edges.len(), "edges")?;
        Arc::make_mut(&mut self.attributes).edge_label = Some(Arc::new(tensor));
        Ok(self)
    }

    /// Attaches a graph-level feature tensor.
    #[must_use]
    pub fn with_graph_feature(mut self, tensor: Tensor) -> Self {
        Arc::make_mut(&mut self.attributes).graph_feature = Some(Arc::new(tensor));
        self
    }

    /// Attaches a graph-level label tensor.
    #[must_use]
    pub fn with_graph_label(mut self, tensor: Tensor) -> Self {
        Arc::make_mut(&mut self.attributes).graph_label = Some(Arc::new(tensor));
        self
    }

    /// Restricts the nodes eligible for node-level splitting.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfRange`] for ids outside the graph.
    pub fn with_node_label_index(mut self, index: Vec<NodeId>) -> Result<Self, GraphError> {
        if let Some(&node) = index.iter().find(|&&node| node >= self.num_nodes) {
            return Err(GraphError::NodeOutOfRange {
                node,
                num_nodes: self.num_nodes,
            });
        }
        self.node_label_index = index;
        Ok(self)
    }

    /// Restricts the edges eligible for edge-level splitting.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfRange`] for endpoints outside the graph.
    pub fn with_label_edges(mut self, edges: Vec<Edge>) -> Result<Self, GraphError> {
        check_edges(&edges, self.num_nodes, self.num_nodes)?;
        self.label_edges = edges;
        Ok(self)
    }

    /// Supplies the partition used when `general_split_mode = custom`.
    #[must_use]
    pub fn with_custom_splits(mut self, splits: CustomSplit) -> Self {
        self.custom_splits = Some(splits);
        self
    }

    /// Supplies message edges used when `disjoint_split_mode = custom`.
    #[must_use]
    pub fn with_custom_disjoint_split(mut self, message_edges: Vec<Edge>) -> Self {
        self.custom_disjoint_split = Some(message_edges);
        self
    }

    /// Number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges, counting each undirected edge once.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether edges are directed.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// All edges of the source graph, shared by every view.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges forming this view's message-passing structure.
    #[must_use]
    pub fn message_edges(&self) -> &[Edge] {
        &self.message_edges
    }

    /// Structural edge index, symmetrised for undirected graphs.
    #[must_use]
    pub fn edge_index(&self) -> EdgeIndex {
        self.orient(&self.message_edges)
    }

    /// Node ids serving as node-level targets.
    #[must_use]
    pub fn node_label_index(&self) -> &[NodeId] {
        &self.node_label_index
    }

    /// Positive target edges, listed once per undirected edge.
    #[must_use]
    pub fn label_edges(&self) -> &[Edge] {
        &self.label_edges
    }

    /// Sampled negative target edges.
    #[must_use]
    pub fn negative_edges(&self) -> &[Edge] {
        &self.negative_edges
    }

    /// Edge-level targets: symmetrised positives followed by negatives.
    #[must_use]
    pub fn edge_label_index(&self) -> EdgeIndex {
        let mut index = self.orient(&self.label_edges);
        index.extend(&self.negative_edges);
        index
    }

    /// Binary link targets aligned with [`Graph::edge_label_index`].
    #[must_use]
    pub fn edge_label_targets(&self) -> Vec<u8> {
        let positives = self.positive_count();
        let mut targets = vec![1_u8; positives];
        targets.resize(positives + self.negative_edges.len(), 0);
        targets
    }

    /// Number of positive columns in [`Graph::edge_label_index`].
    #[must_use]
    pub fn positive_count(&self) -> usize {
        if self.directed {
            self.label_edges.len()
        } else {
            self.label_edges.len() * 2
        }
    }

    /// Per-node features.
    #[must_use]
    pub fn node_feature(&self) -> Option<&Tensor> {
        self.attributes.node_feature.as_deref()
    }

    /// Per-node labels.
    #[must_use]
    pub fn node_label(&self) -> Option<&Tensor> {
        self.attributes.node_label.as_deref()
    }

    /// Per-edge features.
    #[must_use]
    pub fn edge_feature(&self) -> Option<&Tensor> {
        self.attributes.edge_feature.as_deref()
    }

    /// Per-edge labels.
    #[must_use]
    pub fn edge_label(&self) -> Option<&Tensor> {
        self.attributes.edge_label.as_deref()
    }

    /// Graph-level features.
    #[must_use]
    pub fn graph_feature(&self) -> Option<&Tensor> {
        self.attributes.graph_feature.as_deref()
    }

    /// Graph-level labels.
    #[must_use]
    pub fn graph_label(&self) -> Option<&Tensor> {
        self.attributes.graph_label.as_deref()
    }

    /// Shared attribute bundle.
    #[must_use]
    pub fn attributes(&self) -> &Arc<Attributes> {
        &self.attributes
    }

    /// Caller-supplied custom partition, if any.
    #[must_use]
    pub fn custom_splits(&self) -> Option<&CustomSplit> {
        self.custom_splits.as_ref()
    }

    /// Caller-supplied message edges for custom disjoint training, if any.
    #[must_use]
    pub fn custom_disjoint_split(&self) -> Option<&[Edge]> {
        self.custom_disjoint_split.as_deref()
    }

    /// Clones the graph with freshly allocated attribute tensors.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            attributes: Arc::new(self.attributes.deep_copy()),
            edges: Arc::from(self.edges.to_vec()),
            message_edges: Arc::from(self.message_edges.to_vec()),
            ..self.clone()
        }
    }

    pub(crate) fn node_view(&self, node_label_index: Vec<NodeId>) -> Self {
        Self {
            node_label_index,
            custom_splits: None,
            custom_disjoint_split: None,
            ..self.clone()
        }
    }

    pub(crate) fn edge_view(
        &self,
        message_edges: Option<Arc<[Edge]>>,
        label_edges: Vec<Edge>,
        negative_edges: Vec<Edge>,
    ) -> Self {
        Self {
            message_edges: message_edges.unwrap_or_else(|| Arc::clone(&self.message_edges)),
            label_edges,
            negative_edges,
            custom_splits: None,
            custom_disjoint_split: None,
            ..self.clone()
        }
    }

    fn orient(&self, edges: &[Edge]) -> EdgeIndex {
        if self.directed {
            EdgeIndex::from_pairs(edges.to_vec())
        } else {
            EdgeIndex::symmetrized(edges)
        }
    }
}

pub(crate) fn check_edges(
    edges: &[Edge],
    source_nodes: usize,
    destination_nodes: usize,
) -> Result<(), GraphError> {
    for &(u, v) in edges {
        if u >= source_nodes {
            return Err(GraphError::NodeOutOfRange {
                node: u,
                num_nodes: source_nodes,
            });
        }
        if v >= destination_nodes {
            return Err(GraphError::NodeOutOfRange {
                node: v,
                num_nodes: destination_nodes,
            });
        }
    }
    Ok(())
}

pub(crate) fn check_rows(
    attribute: &'static str,
    tensor: &Tensor,
    expected: usize,
    unit: &'static str,
) -> Result<(), GraphError> {
    if tensor.rows() == expected {
        Ok(())
    } else {
        Err(GraphError::RowCountMismatch {
            attribute,
            expected,
            actual: tensor.rows(),
            unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn path() -> Graph {
        Graph::new(4, vec![(0, 1), (1, 2), (2, 3)], false).expect("valid graph")
    }

    #[rstest]
    fn rejects_out_of_range_edges() {
        let err = Graph::new(2, vec![(0, 2)], false).expect_err("edge must be rejected");
        assert_eq!(
            err,
            GraphError::NodeOutOfRange {
                node: 2,
                num_nodes: 2
            }
        );
    }

    #[rstest]
    fn rejects_feature_with_wrong_rows(path: Graph) {
        let err = path
            .with_node_feature(Tensor::from_vec(vec![0.0; 3]))
            .expect_err("rows must match nodes");
        assert!(matches!(
            err,
            GraphError::RowCountMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[rstest]
    fn undirected_label_index_lists_both_orientations(path: Graph) {
        let index = path.edge_label_index();
        assert_eq!(index.len(), 6);
        assert!(index.pairs().contains(&(1, 0)));
        assert_eq!(path.edge_label_targets(), vec![1; 6]);
    }

    #[rstest]
    fn negatives_follow_positives(path: Graph) {
        let view = path.edge_view(None, vec![(0, 1)], vec![(0, 3)]);
        assert_eq!(view.edge_label_index().pairs(), &[(0, 1), (1, 0), (0, 3)]);
        assert_eq!(view.edge_label_targets(), vec![1, 1, 0]);
    }

    #[rstest]
    fn views_share_attributes_but_deep_copy_does_not(path: Graph) {
        let graph = path
            .with_node_label(Tensor::from_vec(vec![0.0, 1.0, 0.0, 1.0]))
            .expect("valid labels");
        let view = graph.node_view(vec![0, 1]);
        assert!(Arc::ptr_eq(graph.attributes(), view.attributes()));
        let copy = graph.deep_copy();
        assert!(!Arc::ptr_eq(graph.attributes(), copy.attributes()));
        assert_eq!(copy.node_label(), graph.node_label());
    }
}
