//! Identifier, type-key, and edge-index primitives.

use std::{collections::BTreeMap, fmt};

/// Node identifier, local to its node type in heterogeneous graphs.
pub type NodeId = usize;

/// Directed endpoint pair `(source, destination)`.
pub type Edge = (NodeId, NodeId);

/// Node type key of a heterogeneous graph.
///
/// # Examples
/// ```
/// use graphsplit_core::NodeType;
///
/// let node_type = NodeType::from("author");
/// assert_eq!(node_type.as_str(), "author");
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeType(String);

impl NodeType {
    /// Returns the type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeType {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Edge type key: `(source type, relation, destination type)`.
///
/// # Examples
/// ```
/// use graphsplit_core::EdgeType;
///
/// let cites = EdgeType::new("paper", "cites", "paper");
/// assert!(cites.is_self_relation());
/// assert_eq!(cites.to_string(), "paper__cites__paper");
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeType {
    source: NodeType,
    relation: String,
    destination: NodeType,
}

impl EdgeType {
    /// Creates an edge type key.
    #[must_use]
    pub fn new(
        source: impl Into<NodeType>,
        relation: impl Into<String>,
        destination: impl Into<NodeType>,
    ) -> Self {
        Self {
            source: source.into(),
            relation: relation.into(),
            destination: destination.into(),
        }
    }

    /// Source node type.
    #[must_use]
    pub fn source(&self) -> &NodeType {
        &self.source
    }

    /// Relation name.
    #[must_use]
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Destination node type.
    #[must_use]
    pub fn destination(&self) -> &NodeType {
        &self.destination
    }

    /// Whether both endpoints share a node type.
    #[must_use]
    pub fn is_self_relation(&self) -> bool {
        self.source == self.destination
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}__{}", self.source, self.relation, self.destination)
    }
}

/// A `2 × E` array of endpoint pairs stored pair-wise.
///
/// # Examples
/// ```
/// use graphsplit_core::EdgeIndex;
///
/// let index = EdgeIndex::symmetrized(&[(0, 1), (1, 2)]);
/// assert_eq!(index.len(), 4);
/// assert_eq!(index.sources(), vec![0, 1, 1, 2]);
/// assert_eq!(index.targets(), vec![1, 2, 0, 1]);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EdgeIndex {
    pairs: Vec<Edge>,
}

impl EdgeIndex {
    /// Wraps the given pairs unchanged.
    #[must_use]
    pub fn from_pairs(pairs: Vec<Edge>) -> Self {
        Self { pairs }
    }

    /// Lists every pair followed by every reversed pair.
    #[must_use]
    pub fn symmetrized(edges: &[Edge]) -> Self {
        let mut pairs = Vec::with_capacity(edges.len() * 2);
        pairs.extend_from_slice(edges);
        pairs.extend(edges.iter().map(|&(u, v)| (v, u)));
        Self { pairs }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the index has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Endpoint pairs in column order.
    #[must_use]
    pub fn pairs(&self) -> &[Edge] {
        &self.pairs
    }

    /// First row.
    #[must_use]
    pub fn sources(&self) -> Vec<NodeId> {
        self.pairs.iter().map(|&(u, _)| u).collect()
    }

    /// Second row.
    #[must_use]
    pub fn targets(&self) -> Vec<NodeId> {
        self.pairs.iter().map(|&(_, v)| v).collect()
    }

    pub(crate) fn extend(&mut self, more: &[Edge]) {
        self.pairs.extend_from_slice(more);
    }
}

/// Caller-supplied partition consumed by `general_split_mode = custom`.
///
/// Each outer entry is one target split, in split order. Edge entries are
/// listed once per undirected edge; the engine symmetrises them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CustomSplit {
    /// Node ids per split.
    Nodes(Vec<Vec<NodeId>>),
    /// Edges per split.
    Edges(Vec<Vec<Edge>>),
    /// Node ids per split, keyed by node type.
    TypedNodes(Vec<BTreeMap<NodeType, Vec<NodeId>>>),
    /// Edges per split, keyed by edge type.
    TypedEdges(Vec<BTreeMap<EdgeType, Vec<Edge>>>),
}

impl CustomSplit {
    /// Number of target splits described.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Nodes(groups) => groups.len(),
            Self::Edges(groups) => groups.len(),
            Self::TypedNodes(groups) => groups.len(),
            Self::TypedEdges(groups) => groups.len(),
        }
    }

    /// Whether no splits are described.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
