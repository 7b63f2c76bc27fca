//! Heterogeneous graphs keyed by node type and edge type.

use std::{collections::BTreeMap, sync::Arc};

use crate::error::GraphError;

use super::{
    homogeneous::{check_edges, check_rows},
    tensor::Tensor,
    types::{CustomSplit, Edge, EdgeIndex, EdgeType, NodeId, NodeType},
};

/// Per-type tensors shared between a heterogeneous graph and its views.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypedAttributes {
    pub(crate) node_feature: BTreeMap<NodeType, Arc<Tensor>>,
    pub(crate) node_label: BTreeMap<NodeType, Arc<Tensor>>,
    pub(crate) edge_feature: BTreeMap<EdgeType, Arc<Tensor>>,
    pub(crate) edge_label: BTreeMap<EdgeType, Arc<Tensor>>,
    pub(crate) graph_feature: Option<Arc<Tensor>>,
    pub(crate) graph_label: Option<Arc<Tensor>>,
}

impl TypedAttributes {
    fn deep_copy(&self) -> Self {
        fn copy_map<K: Clone + Ord>(map: &BTreeMap<K, Arc<Tensor>>) -> BTreeMap<K, Arc<Tensor>> {
            map.iter()
                .map(|(key, tensor)| (key.clone(), Arc::new(Tensor::clone(tensor))))
                .collect()
        }
        Self {
            node_feature: copy_map(&self.node_feature),
            node_label: copy_map(&self.node_label),
            edge_feature: copy_map(&self.edge_feature),
            edge_label: copy_map(&self.edge_label),
            graph_feature: self.graph_feature.as_deref().cloned().map(Arc::new),
            graph_label: self.graph_label.as_deref().cloned().map(Arc::new),
        }
    }
}

/// A heterogeneous attributed graph.
///
/// Node ids are local to their node type. In undirected graphs only relations
/// whose endpoints share a node type are reported in both orientations.
///
/// # Examples
/// ```
/// use graphsplit_core::{EdgeType, HeteroGraph};
///
/// let writes = EdgeType::new("author", "writes", "paper");
/// let graph = HeteroGraph::new(
///     [("author", 2), ("paper", 3)],
///     [(writes.clone(), vec![(0, 0), (0, 1), (1, 2)])],
///     true,
/// )?;
/// assert_eq!(graph.num_nodes_of(&"paper".into()), Some(3));
/// assert_eq!(graph.edge_label_index()[&writes].len(), 3);
/// # Ok::<(), graphsplit_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HeteroGraph {
    directed: bool,
    node_counts: BTreeMap<NodeType, usize>,
    edges: BTreeMap<EdgeType, Arc<[Edge]>>,
    message_edges: BTreeMap<EdgeType, Arc<[Edge]>>,
    attributes: Arc<TypedAttributes>,
    node_label_index: BTreeMap<NodeType, Vec<NodeId>>,
    label_edges: BTreeMap<EdgeType, Vec<Edge>>,
    negative_edges: BTreeMap<EdgeType, Vec<Edge>>,
    custom_splits: Option<CustomSplit>,
    custom_disjoint_split: Option<BTreeMap<EdgeType, Vec<Edge>>>,
}

impl HeteroGraph {
    /// Creates a heterogeneous graph from per-type node counts and edge lists.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNodeType`] when an edge type names an
    /// undeclared node type, [`GraphError::NodeOutOfRange`] when an endpoint
    /// exceeds its type's node count, and [`GraphError::DuplicateEdgeType`]
    /// when an edge type appears twice.
    pub fn new<N, T, E>(node_counts: N, edges: E, directed: bool) -> Result<Self, GraphError>
    where
        N: IntoIterator<Item = (T, usize)>,
        T: Into<NodeType>,
        E: IntoIterator<Item = (EdgeType, Vec<Edge>)>,
    {
        let node_counts: BTreeMap<NodeType, usize> = node_counts
            .into_iter()
            .map(|(node_type, count)| (node_type.into(), count))
            .collect();
        let mut edge_map = BTreeMap::new();
        for (edge_type, list) in edges {
            let sources = count_of(&node_counts, edge_type.source())?;
            let destinations = count_of(&node_counts, edge_type.destination())?;
            check_edges(&list, sources, destinations)?;
            if edge_map.contains_key(&edge_type) {
                return Err(GraphError::DuplicateEdgeType {
                    edge_type: edge_type.to_string(),
                });
            }
            edge_map.insert(edge_type, Arc::<[Edge]>::from(list));
        }
        Ok(Self {
            directed,
            node_label_index: node_counts
                .iter()
                .map(|(node_type, &count)| (node_type.clone(), (0..count).collect()))
                .collect(),
            label_edges: edge_map
                .iter()
                .map(|(edge_type, list)| (edge_type.clone(), list.to_vec()))
                .collect(),
            negative_edges: edge_map
                .keys()
                .map(|edge_type| (edge_type.clone(), Vec::new()))
                .collect(),
            message_edges: edge_map.clone(),
            edges: edge_map,
            node_counts,
            attributes: Arc::new(TypedAttributes::default()),
            custom_splits: None,
            custom_disjoint_split: None,
        })
    }

    /// Attaches per-node features for one node type.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNodeType`] for undeclared types and
    /// [`GraphError::RowCountMismatch`] when rows differ from the type's node
    /// count.
    pub fn with_node_feature(
        mut self,
        node_type: impl Into<NodeType>,
        tensor: Tensor,
    ) -> Result<Self, GraphError> {
        let node_type = node_type.into();
        check_rows("node_feature", &tensor, count_of(&self.node_counts, &node_type)?, "nodes")?;
        Arc::make_mut(&mut self.attributes)
            .node_feature
            .insert(node_type, Arc::new(tensor));
        Ok(self)
    }

    /// Attaches per-node labels for one node type.
    ///
    /// # Errors
    /// Same conditions as [`HeteroGraph::with_node_feature`].
    pub fn with_node_label(
        mut self,
        node_type: impl Into<NodeType>,
        tensor: Tensor,
    ) -> Result<Self, GraphError> {
        let node_type = node_type.into();
        check_rows("node_label", &tensor, count_of(&self.node_counts, &node_type)?, "nodes")?;
        Arc::make_mut(&mut self.attributes)
            .node_label
            .insert(node_type, Arc::new(tensor));
        Ok(self)
    }

    /// Attaches per-edge features for one edge type.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownEdgeType`] for undeclared types and
    /// [`GraphError::RowCountMismatch`] when rows differ from the type's edge
    /// count.
    pub fn with_edge_feature(mut self, edge_type: EdgeType, tensor: Tensor) -> Result<Self, GraphError> {
        check_rows("edge_feature", &tensor, self.edge_count_of(&edge_type)?, "edges")?;
        Arc::make_mut(&mut self.attributes)
            .edge_feature
            .insert(edge_type, Arc::new(tensor));
        Ok(self)
    }

    /// Attaches per-edge labels for one edge type.
    ///
    /// # Errors
    /// Same conditions as [`HeteroGraph::with_edge_feature`].
    pub fn with_edge_label(mut self, edge_type: EdgeType, tensor: Tensor) -> Result<Self, GraphError> {
        check_rows("edge_label", &tensor, self.edge_count_of(&edge_type)?, "edges")?;
        Arc::make_mut(&mut self.attributes)
            .edge_label
            .insert(edge_type, Arc::new(tensor));
        Ok(self)
    }

    /// Attaches a graph-level label tensor.
    #[must_use]
    pub fn with_graph_label(mut self, tensor: Tensor) -> Self {
        Arc::make_mut(&mut self.attributes).graph_label = Some(Arc::new(tensor));
        self
    }

    /// Attaches a graph-level feature tensor.
    #[must_use]
    pub fn with_graph_feature(mut self, tensor: Tensor) -> Self {
        Arc::make_mut(&mut self.attributes).graph_feature = Some(Arc::new(tensor));
        self
    }

    /// Restricts the nodes of one type eligible for node-level splitting.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNodeType`] for undeclared types and
    /// [`GraphError::NodeOutOfRange`] for ids outside the type.
    pub fn with_node_label_index(
        mut self,
        node_type: impl Into<NodeType>,
        index: Vec<NodeId>,
    ) -> Result<Self, GraphError> {
        let node_type = node_type.into();
        let num_nodes = count_of(&self.node_counts, &node_type)?;
        if let Some(&node) = index.iter().find(|&&node| node >= num_nodes) {
            return Err(GraphError::NodeOutOfRange { node, num_nodes });
        }
        self.node_label_index.insert(node_type, index);
        Ok(self)
    }

    /// Restricts the edges of one type eligible for edge-level splitting.
    ///
    /// Negative sampling still excludes every edge of the type.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownEdgeType`] for undeclared types and
    /// [`GraphError::NodeOutOfRange`] for endpoints outside their types.
    pub fn with_label_edges(mut self, edge_type: EdgeType, edges: Vec<Edge>) -> Result<Self, GraphError> {
        self.edge_count_of(&edge_type)?;
        let (sources, destinations) = self.endpoint_counts(&edge_type)?;
        check_edges(&edges, sources, destinations)?;
        self.label_edges.insert(edge_type, edges);
        Ok(self)
    }

    /// Supplies the partition used when `general_split_mode = custom`.
    #[must_use]
    pub fn with_custom_splits(mut self, splits: CustomSplit) -> Self {
        self.custom_splits = Some(splits);
        self
    }

    /// Supplies per-type message edges used when `disjoint_split_mode = custom`.
    #[must_use]
    pub fn with_custom_disjoint_split(mut self, message_edges: BTreeMap<EdgeType, Vec<Edge>>) -> Self {
        self.custom_disjoint_split = Some(message_edges);
        self
    }

    /// Whether edges are directed.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Declared node types with their node counts.
    #[must_use]
    pub fn node_counts(&self) -> &BTreeMap<NodeType, usize> {
        &self.node_counts
    }

    /// Node count of one type.
    #[must_use]
    pub fn num_nodes_of(&self, node_type: &NodeType) -> Option<usize> {
        self.node_counts.get(node_type).copied()
    }

    /// Total node count across types.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.node_counts.values().sum()
    }

    /// Total edge count across types.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.values().map(|list| list.len()).sum()
    }

    /// Declared edge types.
    pub fn edge_types(&self) -> impl Iterator<Item = &EdgeType> {
        self.edges.keys()
    }

    /// Every edge of the source graph, per type.
    #[must_use]
    pub fn edges(&self) -> &BTreeMap<EdgeType, Arc<[Edge]>> {
        &self.edges
    }

    /// Edges forming this view's message-passing structure, per type.
    #[must_use]
    pub fn message_edges(&self) -> &BTreeMap<EdgeType, Arc<[Edge]>> {
        &self.message_edges
    }

    /// Structural edge index per type.
    #[must_use]
    pub fn edge_index(&self) -> BTreeMap<EdgeType, EdgeIndex> {
        self.message_edges
            .iter()
            .map(|(edge_type, list)| (edge_type.clone(), self.orient(edge_type, list)))
            .collect()
    }

    /// Node-level targets per type.
    #[must_use]
    pub fn node_label_index(&self) -> &BTreeMap<NodeType, Vec<NodeId>> {
        &self.node_label_index
    }

    /// Positive target edges per type, listed once per undirected edge.
    #[must_use]
    pub fn label_edges(&self) -> &BTreeMap<EdgeType, Vec<Edge>> {
        &self.label_edges
    }

    /// Sampled negative target edges per type.
    #[must_use]
    pub fn negative_edges(&self) -> &BTreeMap<EdgeType, Vec<Edge>> {
        &self.negative_edges
    }

    /// Edge-level targets per type: oriented positives followed by negatives.
    #[must_use]
    pub fn edge_label_index(&self) -> BTreeMap<EdgeType, EdgeIndex> {
        self.label_edges
            .iter()
            .map(|(edge_type, list)| {
                let mut index = self.orient(edge_type, list);
                if let Some(negatives) = self.negative_edges.get(edge_type) {
                    index.extend(negatives);
                }
                (edge_type.clone(), index)
            })
            .collect()
    }

    /// Whether the given relation is reported in both orientations.
    #[must_use]
    pub fn is_symmetric(&self, edge_type: &EdgeType) -> bool {
        !self.directed && edge_type.is_self_relation()
    }

    /// Shared attribute bundle.
    #[must_use]
    pub fn attributes(&self) -> &Arc<TypedAttributes> {
        &self.attributes
    }

    /// Per-node features of one type.
    #[must_use]
    pub fn node_feature(&self, node_type: &NodeType) -> Option<&Tensor> {
        self.attributes.node_feature.get(node_type).map(|tensor| &**tensor)
    }

    /// Per-node labels of one type.
    #[must_use]
    pub fn node_label(&self, node_type: &NodeType) -> Option<&Tensor> {
        self.attributes.node_label.get(node_type).map(|tensor| &**tensor)
    }

    /// Graph-level labels.
    #[must_use]
    pub fn graph_label(&self) -> Option<&Tensor> {
        self.attributes.graph_label.as_deref()
    }

    /// Caller-supplied custom partition, if any.
    #[must_use]
    pub fn custom_splits(&self) -> Option<&CustomSplit> {
        self.custom_splits.as_ref()
    }

    /// Caller-supplied per-type message edges, if any.
    #[must_use]
    pub fn custom_disjoint_split(&self) -> Option<&BTreeMap<EdgeType, Vec<Edge>>> {
        self.custom_disjoint_split.as_ref()
    }

    /// Clones the graph with freshly allocated attribute tensors.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            attributes: Arc::new(self.attributes.deep_copy()),
            ..self.clone()
        }
    }

    pub(crate) fn edge_count_of(&self, edge_type: &EdgeType) -> Result<usize, GraphError> {
        self.edges
            .get(edge_type)
            .map(|list| list.len())
            .ok_or_else(|| GraphError::UnknownEdgeType {
                edge_type: edge_type.to_string(),
            })
    }

    pub(crate) fn endpoint_counts(&self, edge_type: &EdgeType) -> Result<(usize, usize), GraphError> {
        Ok((
            count_of(&self.node_counts, edge_type.source())?,
            count_of(&self.node_counts, edge_type.destination())?,
        ))
    }

    pub(crate) fn node_view(&self, node_label_index: BTreeMap<NodeType, Vec<NodeId>>) -> Self {
        Self {
            node_label_index,
            custom_splits: None,
            custom_disjoint_split: None,
            ..self.clone()
        }
    }

    pub(crate) fn edge_view(
        &self,
        message_edges: BTreeMap<EdgeType, Arc<[Edge]>>,
        label_edges: BTreeMap<EdgeType, Vec<Edge>>,
        negative_edges: BTreeMap<EdgeType, Vec<Edge>>,
    ) -> Self {
        Self {
            message_edges,
            label_edges,
            negative_edges,
            custom_splits: None,
            custom_disjoint_split: None,
            ..self.clone()
        }
    }

    fn orient(&self, edge_type: &EdgeType, edges: &[Edge]) -> EdgeIndex {
        if self.is_symmetric(edge_type) {
            EdgeIndex::symmetrized(edges)
        } else {
            EdgeIndex::from_pairs(edges.to_vec())
        }
    }
}

fn count_of(counts: &BTreeMap<NodeType, usize>, node_type: &NodeType) -> Result<usize, GraphError> {
    counts
        .get(node_type)
        .copied()
        .ok_or_else(|| GraphError::UnknownNodeType {
            node_type: node_type.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rejects_edges_to_unknown_node_types() {
        let err = HeteroGraph::new(
            [("a", 2)],
            [(EdgeType::new("a", "r", "b"), vec![(0, 0)])],
            true,
        )
        .expect_err("unknown type must fail");
        assert!(matches!(err, GraphError::UnknownNodeType { .. }));
    }

    #[rstest]
    fn checks_endpoints_against_their_own_type() {
        let err = HeteroGraph::new(
            [("a", 2), ("b", 5)],
            [(EdgeType::new("a", "r", "b"), vec![(0, 4), (3, 0)])],
            true,
        )
        .expect_err("source id 3 exceeds type a");
        assert_eq!(
            err,
            GraphError::NodeOutOfRange {
                node: 3,
                num_nodes: 2
            }
        );
    }

    #[rstest]
    fn undirected_graphs_only_mirror_self_relations() {
        let same = EdgeType::new("a", "knows", "a");
        let cross = EdgeType::new("a", "likes", "b");
        let graph = HeteroGraph::new(
            [("a", 3), ("b", 3)],
            [
                (same.clone(), vec![(0, 1), (1, 2)]),
                (cross.clone(), vec![(0, 0), (2, 1)]),
            ],
            false,
        )
        .expect("valid graph");
        let index = graph.edge_label_index();
        assert_eq!(index[&same].len(), 4);
        assert_eq!(index[&cross].len(), 2);
    }

    #[rstest]
    fn repeated_edge_types_are_rejected() {
        let knows = EdgeType::new("a", "knows", "a");
        let err = HeteroGraph::new(
            [("a", 3)],
            [(knows.clone(), vec![(0, 1)]), (knows, vec![(1, 2)])],
            false,
        )
        .expect_err("second list would replace the first");
        assert!(matches!(err, GraphError::DuplicateEdgeType { .. }));
        assert_eq!(err.code().as_str(), "GRAPH_DUPLICATE_EDGE_TYPE");
    }

    #[rstest]
    fn label_targets_can_be_restricted_per_type() {
        let knows = EdgeType::new("a", "knows", "a");
        let graph = HeteroGraph::new(
            [("a", 4), ("b", 2)],
            [(knows.clone(), vec![(0, 1), (1, 2), (2, 3)])],
            false,
        )
        .expect("valid graph")
        .with_node_label_index("a", vec![3, 1])
        .expect("ids in range")
        .with_label_edges(knows.clone(), vec![(1, 2)])
        .expect("endpoints in range");
        assert_eq!(graph.node_label_index()[&NodeType::from("a")], vec![3, 1]);
        assert_eq!(graph.node_label_index()[&NodeType::from("b")], vec![0, 1]);
        assert_eq!(graph.label_edges()[&knows], vec![(1, 2)]);
        assert_eq!(graph.edges()[&knows].len(), 3);
    }

    #[rstest]
    #[case::node_range(
        HeteroGraph::new([("a", 2)], Vec::<(EdgeType, Vec<Edge>)>::new(), true)
            .expect("valid graph")
            .with_node_label_index("a", vec![2])
            .expect_err("id 2 is outside type a")
    )]
    #[case::unknown_node_type(
        HeteroGraph::new([("a", 2)], Vec::<(EdgeType, Vec<Edge>)>::new(), true)
            .expect("valid graph")
            .with_node_label_index("b", vec![0])
            .expect_err("type b is undeclared")
    )]
    #[case::unknown_edge_type(
        HeteroGraph::new([("a", 2)], Vec::<(EdgeType, Vec<Edge>)>::new(), true)
            .expect("valid graph")
            .with_label_edges(EdgeType::new("a", "r", "a"), vec![(0, 1)])
            .expect_err("relation is undeclared")
    )]
    fn restricting_targets_validates_types_and_ids(#[case] err: GraphError) {
        assert!(matches!(
            err,
            GraphError::NodeOutOfRange { .. }
                | GraphError::UnknownNodeType { .. }
                | GraphError::UnknownEdgeType { .. }
        ));
    }
}
