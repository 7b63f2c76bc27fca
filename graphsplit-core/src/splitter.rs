//! Per-graph split state machine.
//!
//! A [`GraphSplitter`] turns one graph (transductive) or a whole graph list
//! (inductive) into split views for the configured task. Homogeneous graphs
//! partition their label indices directly; heterogeneous graphs route every
//! partition through [`TypedSplitRouter`].

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use rand::rngs::SmallRng;
use tracing::{debug, instrument};

use crate::{
    config::{
        DEFAULT_SPLIT_RATIOS, DatasetConfig, EdgeSplitMode, EdgeTrainMode, SplitMode, SplitRequest,
        SplitTypes, Task, validate_ratios,
    },
    disjoint::{DisjointSplit, split_by_message_edges, split_by_ratio},
    error::{GraphError, Result, SplitError},
    graph::{
        AnyGraph, CustomSplit, Edge, EdgeIndex, EdgeType, Graph, HeteroGraph, NodeId, NodeType,
        check_edges,
    },
    negative::{NegativeUniverse, negative_count, sample_negatives},
    partition::{partition, split_sizes_of},
    rng::{GRAPH_ORDER_STREAM, NEGATIVE_STREAM, SHUFFLE_STREAM, ordered, stream_rng},
    typed::{TypedSplitRouter, participating_types},
};

type TypedEdges = BTreeMap<EdgeType, Vec<Edge>>;

/// Splits graphs under one dataset configuration and one request.
///
/// # Examples
/// ```
/// use graphsplit_core::{AnyGraph, DatasetConfig, Graph, GraphSplitter, SplitRequest};
///
/// let graph: AnyGraph = Graph::new(10, vec![(0, 1)], false)?.into();
/// let config = DatasetConfig::default();
/// let request = SplitRequest::new();
/// let views = GraphSplitter::new(&config, &request).split_transductive(&graph, 0)?;
/// let sizes: Vec<usize> = views
///     .iter()
///     .map(|view| view.as_homogeneous().map_or(0, |g| g.node_label_index().len()))
///     .collect();
/// assert_eq!(sizes, vec![6, 1, 3]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct GraphSplitter<'a> {
    config: &'a DatasetConfig,
    request: &'a SplitRequest,
}

impl<'a> GraphSplitter<'a> {
    /// Creates a splitter for `config` and `request`.
    #[must_use]
    pub fn new(config: &'a DatasetConfig, request: &'a SplitRequest) -> Self {
        Self { config, request }
    }

    /// Produces one view per split of `graph`, sharing its structure.
    ///
    /// `position` is the graph's index in its dataset and selects the
    /// graph's random streams.
    ///
    /// # Errors
    /// Returns [`SplitError::UnsupportedTask`] for the graph task,
    /// [`SplitError::InvalidSplitConfiguration`] for inconsistent ratios,
    /// split types (including any split types on a homogeneous graph), or
    /// custom partitions, [`SplitError::InsufficientItems`]
    /// when a partition has too few items, and
    /// [`SplitError::SamplingExhausted`] when negatives cannot be drawn.
    #[instrument(
        name = "graph.split",
        err,
        skip(self, graph),
        fields(task = %self.config.task, hetero = graph.is_hetero()),
    )]
    pub fn split_transductive(&self, graph: &AnyGraph, position: usize) -> Result<Vec<AnyGraph>> {
        if self.config.task == Task::Graph {
            return Err(SplitError::unsupported(
                Task::Graph,
                "transductive splits; graphs are assigned wholesale",
            ));
        }
        let views: Vec<AnyGraph> = match graph {
            AnyGraph::Homogeneous(graph) => self
                .split_homogeneous(graph, position)?
                .into_iter()
                .map(AnyGraph::from)
                .collect(),
            AnyGraph::Heterogeneous(graph) => self
                .split_hetero(graph, position)?
                .into_iter()
                .map(AnyGraph::from)
                .collect(),
        };
        record_graphs_split(1);
        Ok(views)
    }

    /// Partitions whole graphs into splits.
    ///
    /// Random mode sizes the splits over the graph count; custom mode uses
    /// `custom_groups`, a list of dataset positions per split. Input order is
    /// kept within each split. Link prediction graphs receive negatives, and
    /// in disjoint mode the training graphs split their edges into message
    /// and supervision sets.
    ///
    /// # Errors
    /// Returns [`SplitError::InvalidSplitConfiguration`] for bad ratios or
    /// custom groups, [`SplitError::InsufficientItems`] when there are fewer
    /// graphs than splits, and any per-graph link preparation failure.
    #[instrument(
        name = "graph.split_inductive",
        err,
        skip(self, graphs, custom_groups),
        fields(task = %self.config.task, graphs = graphs.len()),
    )]
    pub fn split_inductive(
        &self,
        graphs: &[AnyGraph],
        custom_groups: Option<&[Vec<usize>]>,
    ) -> Result<Vec<Vec<AnyGraph>>> {
        let groups = self.graph_groups(graphs.len(), custom_groups)?;
        let out = groups
            .iter()
            .enumerate()
            .map(|(split, positions)| {
                positions
                    .iter()
                    .map(|&position| self.prepare_inductive(&graphs[position], position, split == 0))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        record_graphs_split(graphs.len());
        Ok(out)
    }

    fn random_ratios(&self) -> Result<&'a [f64]> {
        let ratios = self.request.ratios().unwrap_or(&DEFAULT_SPLIT_RATIOS);
        validate_ratios(ratios)?;
        Ok(ratios)
    }

    fn custom_count(&self, groups: usize) -> Result<usize> {
        match self.request.ratios() {
            Some(ratios) if ratios.len() != groups => Err(SplitError::invalid(format!(
                "{} split ratios given but the custom split lists {groups} groups",
                ratios.len()
            ))),
            Some(ratios) => {
                validate_ratios(ratios)?;
                Ok(groups)
            }
            None if (2..=3).contains(&groups) => Ok(groups),
            None => Err(SplitError::invalid(format!(
                "custom splits must list 2 or 3 groups (got {groups})"
            ))),
        }
    }

    fn shuffle_rng(&self, position: usize) -> SmallRng {
        stream_rng(self.config.seed, position, SHUFFLE_STREAM)
    }

    fn split_homogeneous(&self, graph: &Graph, position: usize) -> Result<Vec<Graph>> {
        if self.request.split_types().is_some() {
            return Err(SplitError::invalid(format!(
                "{} split types need a heterogeneous graph",
                self.config.task
            )));
        }
        match self.config.task {
            Task::Node => Ok(self
                .node_parts(graph, position)?
                .into_iter()
                .map(|part| graph.node_view(part))
                .collect()),
            Task::Edge => Ok(self
                .edge_parts(graph, position)?
                .into_iter()
                .map(|part| graph.edge_view(None, part, Vec::new()))
                .collect()),
            Task::LinkPred => {
                let parts = self.edge_parts(graph, position)?;
                self.link_views(graph, parts, position)
            }
            Task::Graph => Err(SplitError::unsupported(Task::Graph, "per-graph label indices")),
        }
    }

    fn node_parts(&self, graph: &Graph, position: usize) -> Result<Vec<Vec<NodeId>>> {
        match self.config.general_split_mode {
            SplitMode::Random => {
                let ratios = self.random_ratios()?;
                let items = ordered(
                    graph.node_label_index(),
                    self.config.shuffle,
                    &mut self.shuffle_rng(position),
                );
                let sizes = split_sizes_of(items.len(), ratios, "nodes")?;
                Ok(partition(&items, &sizes))
            }
            SplitMode::Custom => match graph.custom_splits() {
                Some(CustomSplit::Nodes(groups)) => {
                    self.custom_count(groups.len())?;
                    for group in groups {
                        check_nodes(group, graph.num_nodes())?;
                    }
                    Ok(groups.clone())
                }
                Some(_) => Err(SplitError::invalid(
                    "node tasks on homogeneous graphs need `CustomSplit::Nodes`",
                )),
                None => Err(missing_custom_splits()),
            },
        }
    }

    fn edge_parts(&self, graph: &Graph, position: usize) -> Result<Vec<Vec<Edge>>> {
        match self.config.general_split_mode {
            SplitMode::Random => {
                let ratios = self.random_ratios()?;
                let items = ordered(
                    graph.label_edges(),
                    self.config.shuffle,
                    &mut self.shuffle_rng(position),
                );
                let sizes = split_sizes_of(items.len(), ratios, "edges")?;
                Ok(partition(&items, &sizes))
            }
            SplitMode::Custom => match graph.custom_splits() {
                Some(CustomSplit::Edges(groups)) => {
                    self.custom_count(groups.len())?;
                    for group in groups {
                        check_edges(group, graph.num_nodes(), graph.num_nodes())?;
                    }
                    Ok(groups.clone())
                }
                Some(_) => Err(SplitError::invalid(
                    "edge tasks on homogeneous graphs need `CustomSplit::Edges`",
                )),
                None => Err(missing_custom_splits()),
            },
        }
    }

    /// Builds link prediction views: split `i > 0` uses the edges of all
    /// earlier splits as structure.
    fn link_views(
        &self,
        graph: &Graph,
        parts: Vec<Vec<Edge>>,
        position: usize,
    ) -> Result<Vec<Graph>> {
        let universe = NegativeUniverse::over_nodes(
            graph.num_nodes(),
            &oriented(graph.edges(), !graph.is_directed()),
        );
        let factor = if graph.is_directed() { 1 } else { 2 };
        let mut rng = stream_rng(self.config.seed, position, NEGATIVE_STREAM);
        let mut cumulative: Vec<Edge> = Vec::new();
        let mut views = Vec::with_capacity(parts.len());
        for (split, part) in parts.into_iter().enumerate() {
            let (structure, labels) = if split == 0 {
                let targets = self.train_targets(
                    &part,
                    graph.custom_disjoint_split(),
                    graph.is_directed(),
                )?;
                (targets.message, targets.supervision)
            } else {
                (cumulative.clone(), part.clone())
            };
            let requested =
                negative_count(self.config.edge_negative_sampling_ratio, labels.len() * factor);
            let negatives = sample_negatives(&universe, requested, &mut rng)?;
            views.push(graph.edge_view(Some(Arc::from(structure)), labels, negatives));
            cumulative.extend(part);
        }
        Ok(views)
    }

    fn train_targets(
        &self,
        train: &[Edge],
        custom_message: Option<&[Edge]>,
        directed: bool,
    ) -> Result<DisjointSplit> {
        match (self.config.edge_train_mode, self.config.disjoint_split_mode) {
            (EdgeTrainMode::All, _) => Ok(DisjointSplit {
                message: train.to_vec(),
                supervision: train.to_vec(),
            }),
            (EdgeTrainMode::Disjoint, SplitMode::Random) => {
                split_by_ratio(train, self.config.edge_message_ratio)
            }
            (EdgeTrainMode::Disjoint, SplitMode::Custom) => {
                let message = custom_message.ok_or_else(|| {
                    SplitError::invalid(
                        "custom disjoint split mode needs custom message edges on every graph",
                    )
                })?;
                split_by_message_edges(train, message, directed)
            }
        }
    }

    fn split_hetero(&self, graph: &HeteroGraph, position: usize) -> Result<Vec<HeteroGraph>> {
        match self.config.task {
            Task::Node => Ok(self
                .hetero_node_parts(graph, position)?
                .into_iter()
                .map(|part| graph.node_view(part))
                .collect()),
            Task::Edge => {
                let (parts, _) = self.hetero_edge_parts(graph, position)?;
                Ok(parts
                    .into_iter()
                    .map(|part| {
                        let negatives = part.keys().map(|key| (key.clone(), Vec::new())).collect();
                        graph.edge_view(graph.message_edges().clone(), part, negatives)
                    })
                    .collect())
            }
            Task::LinkPred => {
                let (parts, participants) = self.hetero_edge_parts(graph, position)?;
                self.hetero_link_views(graph, parts, &participants, position)
            }
            Task::Graph => Err(SplitError::unsupported(Task::Graph, "per-graph label indices")),
        }
    }

    fn hetero_node_parts(
        &self,
        graph: &HeteroGraph,
        position: usize,
    ) -> Result<Vec<BTreeMap<NodeType, Vec<NodeId>>>> {
        let base = graph.node_label_index();
        match self.config.general_split_mode {
            SplitMode::Random => {
                let ratios = self.random_ratios()?;
                let selected = match self.request.split_types() {
                    None => None,
                    Some(SplitTypes::Nodes(types)) => Some(types),
                    Some(SplitTypes::Edges(_)) => {
                        return Err(SplitError::invalid("node tasks take node split types"));
                    }
                };
                let participants = participating_types(base.keys(), selected)?;
                let items = self.ordered_types(base, &participants, position);
                TypedSplitRouter::new(ratios, EdgeSplitMode::Exact).route(&items, &participants, "nodes")
            }
            SplitMode::Custom => match graph.custom_splits() {
                Some(CustomSplit::TypedNodes(groups)) => {
                    self.custom_count(groups.len())?;
                    for group in groups {
                        for (node_type, ids) in group {
                            let count = graph.num_nodes_of(node_type).ok_or_else(|| {
                                GraphError::UnknownNodeType {
                                    node_type: node_type.to_string(),
                                }
                            })?;
                            check_nodes(ids, count)?;
                        }
                    }
                    Ok(typed_custom(base, groups).0)
                }
                Some(_) => Err(SplitError::invalid(
                    "node tasks on heterogeneous graphs need `CustomSplit::TypedNodes`",
                )),
                None => Err(missing_custom_splits()),
            },
        }
    }

    fn hetero_edge_parts(
        &self,
        graph: &HeteroGraph,
        position: usize,
    ) -> Result<(Vec<TypedEdges>, BTreeSet<EdgeType>)> {
        let base = graph.label_edges();
        match self.config.general_split_mode {
            SplitMode::Random => {
                let ratios = self.random_ratios()?;
                let selected = match self.request.split_types() {
                    None => None,
                    Some(SplitTypes::Edges(types)) => Some(types),
                    Some(SplitTypes::Nodes(_)) => {
                        return Err(SplitError::invalid(format!(
                            "{} tasks take edge split types",
                            self.config.task
                        )));
                    }
                };
                let participants = participating_types(base.keys(), selected)?;
                let items = self.ordered_types(base, &participants, position);
                let parts = TypedSplitRouter::new(ratios, self.config.edge_split_mode).route(
                    &items,
                    &participants,
                    "edges",
                )?;
                Ok((parts, participants))
            }
            SplitMode::Custom => match graph.custom_splits() {
                Some(CustomSplit::TypedEdges(groups)) => {
                    self.custom_count(groups.len())?;
                    for group in groups {
                        for (edge_type, edges) in group {
                            let (sources, destinations) = graph.endpoint_counts(edge_type)?;
                            graph.edge_count_of(edge_type)?;
                            check_edges(edges, sources, destinations)?;
                        }
                    }
                    Ok(typed_custom(base, groups))
                }
                Some(_) => Err(SplitError::invalid(
                    "edge tasks on heterogeneous graphs need `CustomSplit::TypedEdges`",
                )),
                None => Err(missing_custom_splits()),
            },
        }
    }

    fn ordered_types<K, T>(
        &self,
        items: &BTreeMap<K, Vec<T>>,
        participants: &BTreeSet<K>,
        position: usize,
    ) -> BTreeMap<K, Vec<T>>
    where
        K: Clone + Ord,
        T: Clone,
    {
        let mut rng = self.shuffle_rng(position);
        items
            .iter()
            .map(|(key, list)| {
                let shuffle = self.config.shuffle && participants.contains(key);
                (key.clone(), ordered(list, shuffle, &mut rng))
            })
            .collect()
    }

    fn hetero_link_views(
        &self,
        graph: &HeteroGraph,
        parts: Vec<TypedEdges>,
        participants: &BTreeSet<EdgeType>,
        position: usize,
    ) -> Result<Vec<HeteroGraph>> {
        let universes = participants
            .iter()
            .map(|edge_type| Ok((edge_type.clone(), typed_universe(graph, edge_type)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        let mut rng = stream_rng(self.config.seed, position, NEGATIVE_STREAM);
        let mut cumulative: TypedEdges = BTreeMap::new();
        let mut views = Vec::with_capacity(parts.len());
        for (split, part) in parts.into_iter().enumerate() {
            let mut message = graph.message_edges().clone();
            let mut labels = BTreeMap::new();
            let mut negatives = BTreeMap::new();
            for (edge_type, edges) in part {
                let Some(universe) = universes.get(&edge_type) else {
                    labels.insert(edge_type.clone(), edges);
                    negatives.insert(edge_type, Vec::new());
                    continue;
                };
                let (structure, targets) = if split == 0 {
                    let custom = graph
                        .custom_disjoint_split()
                        .and_then(|custom| custom.get(&edge_type))
                        .map(Vec::as_slice);
                    let train =
                        self.train_targets(&edges, custom, !graph.is_symmetric(&edge_type))?;
                    (train.message, train.supervision)
                } else {
                    let seen = cumulative.get(&edge_type).cloned().unwrap_or_default();
                    (seen, edges.clone())
                };
                let factor = if graph.is_symmetric(&edge_type) { 2 } else { 1 };
                let requested =
                    negative_count(self.config.edge_negative_sampling_ratio, targets.len() * factor);
                let sampled = sample_negatives(universe, requested, &mut rng)?;
                debug!(edge_type = %edge_type, split, negatives = sampled.len(), "sampled typed negatives");
                message.insert(edge_type.clone(), Arc::from(structure));
                labels.insert(edge_type.clone(), targets);
                negatives.insert(edge_type.clone(), sampled);
                cumulative.entry(edge_type).or_default().extend(edges);
            }
            views.push(graph.edge_view(message, labels, negatives));
        }
        Ok(views)
    }

    fn graph_groups(
        &self,
        graphs: usize,
        custom_groups: Option<&[Vec<usize>]>,
    ) -> Result<Vec<Vec<usize>>> {
        match self.config.general_split_mode {
            SplitMode::Random => {
                let ratios = self.random_ratios()?;
                let mut rng = stream_rng(self.config.seed, 0, GRAPH_ORDER_STREAM);
                let positions: Vec<usize> = (0..graphs).collect();
                let positions = ordered(&positions, self.config.shuffle, &mut rng);
                let sizes = split_sizes_of(graphs, ratios, "graphs")?;
                Ok(partition(&positions, &sizes)
                    .into_iter()
                    .map(|mut group| {
                        group.sort_unstable();
                        group
                    })
                    .collect())
            }
            SplitMode::Custom => {
                let groups = custom_groups.ok_or_else(|| {
                    SplitError::invalid("inductive custom splits need custom split graphs")
                })?;
                self.custom_count(groups.len())?;
                check_graph_groups(groups, graphs)?;
                Ok(groups.to_vec())
            }
        }
    }

    fn prepare_inductive(&self, graph: &AnyGraph, position: usize, train: bool) -> Result<AnyGraph> {
        if self.config.task != Task::LinkPred {
            return Ok(graph.clone());
        }
        let disjoint = train && self.config.edge_train_mode == EdgeTrainMode::Disjoint;
        let mut shuffle_rng = self.shuffle_rng(position);
        let mut negative_rng = stream_rng(self.config.seed, position, NEGATIVE_STREAM);
        let ratio = self.config.edge_negative_sampling_ratio;
        match graph {
            AnyGraph::Homogeneous(graph) => {
                let labels = ordered(graph.label_edges(), self.config.shuffle, &mut shuffle_rng);
                let (structure, labels) = if disjoint {
                    let split = self.train_targets(
                        &labels,
                        graph.custom_disjoint_split(),
                        graph.is_directed(),
                    )?;
                    (Some(Arc::from(split.message)), split.supervision)
                } else {
                    (None, labels)
                };
                let universe = NegativeUniverse::over_nodes(
                    graph.num_nodes(),
                    &oriented(graph.edges(), !graph.is_directed()),
                );
                let factor = if graph.is_directed() { 1 } else { 2 };
                let requested = negative_count(ratio, labels.len() * factor);
                let negatives = sample_negatives(&universe, requested, &mut negative_rng)?;
                Ok(graph.edge_view(structure, labels, negatives).into())
            }
            AnyGraph::Heterogeneous(graph) => {
                let mut message = graph.message_edges().clone();
                let mut labels = BTreeMap::new();
                let mut negatives = BTreeMap::new();
                for (edge_type, list) in graph.label_edges() {
                    let list = ordered(list, self.config.shuffle, &mut shuffle_rng);
                    let targets = if disjoint {
                        let custom = graph
                            .custom_disjoint_split()
                            .and_then(|custom| custom.get(edge_type))
                            .map(Vec::as_slice);
                        let split =
                            self.train_targets(&list, custom, !graph.is_symmetric(edge_type))?;
                        message.insert(edge_type.clone(), Arc::from(split.message));
                        split.supervision
                    } else {
                        list
                    };
                    let factor = if graph.is_symmetric(edge_type) { 2 } else { 1 };
                    let universe = typed_universe(graph, edge_type)?;
                    let requested = negative_count(ratio, targets.len() * factor);
                    let sampled = sample_negatives(&universe, requested, &mut negative_rng)?;
                    labels.insert(edge_type.clone(), targets);
                    negatives.insert(edge_type.clone(), sampled);
                }
                Ok(graph.edge_view(message, labels, negatives).into())
            }
        }
    }
}

fn missing_custom_splits() -> SplitError {
    SplitError::invalid("custom split mode needs custom splits on every graph")
}

fn oriented(edges: &[Edge], symmetric: bool) -> EdgeIndex {
    if symmetric {
        EdgeIndex::symmetrized(edges)
    } else {
        EdgeIndex::from_pairs(edges.to_vec())
    }
}

fn typed_universe(graph: &HeteroGraph, edge_type: &EdgeType) -> Result<NegativeUniverse> {
    let (sources, destinations) = graph.endpoint_counts(edge_type)?;
    let edges = graph.edges().get(edge_type).map_or(&[][..], |list| &list[..]);
    let existing = oriented(edges, graph.is_symmetric(edge_type));
    Ok(NegativeUniverse::new(
        sources,
        destinations,
        edge_type.is_self_relation(),
        existing.pairs().iter().copied(),
    ))
}

fn check_nodes(ids: &[NodeId], num_nodes: usize) -> Result<()> {
    match ids.iter().find(|&&node| node >= num_nodes) {
        Some(&node) => Err(GraphError::NodeOutOfRange { node, num_nodes }.into()),
        None => Ok(()),
    }
}

fn check_graph_groups(groups: &[Vec<usize>], graphs: usize) -> Result<()> {
    let mut seen = BTreeSet::new();
    for &position in groups.iter().flatten() {
        if position >= graphs {
            return Err(SplitError::invalid(format!(
                "custom split graph {position} is out of range for {graphs} graphs"
            )));
        }
        if !seen.insert(position) {
            return Err(SplitError::invalid(format!(
                "custom split graph {position} appears in more than one split"
            )));
        }
    }
    Ok(())
}

/// Applies caller-supplied typed groups. Keys named by any group
/// participate; all other keys pass through whole.
fn typed_custom<K, T>(
    base: &BTreeMap<K, Vec<T>>,
    groups: &[BTreeMap<K, Vec<T>>],
) -> (Vec<BTreeMap<K, Vec<T>>>, BTreeSet<K>)
where
    K: Clone + Ord,
    T: Clone,
{
    let participants: BTreeSet<K> = groups.iter().flat_map(|group| group.keys().cloned()).collect();
    let parts = groups
        .iter()
        .map(|group| {
            base.iter()
                .map(|(key, full)| {
                    let list = if participants.contains(key) {
                        group.get(key).cloned().unwrap_or_default()
                    } else {
                        full.clone()
                    };
                    (key.clone(), list)
                })
                .collect()
        })
        .collect();
    (parts, participants)
}

#[cfg(feature = "metrics")]
fn record_graphs_split(graphs: usize) {
    metrics::counter!("graphsplit_graphs_split").increment(graphs as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_graphs_split(_graphs: usize) {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn ring(nodes: usize) -> Graph {
        let edges = (0..nodes).map(|u| (u, (u + 1) % nodes)).collect();
        Graph::new(nodes, edges, false).expect("valid ring")
    }

    fn config(task: Task) -> DatasetConfig {
        DatasetConfig {
            task,
            ..DatasetConfig::default()
        }
    }

    fn homogeneous(views: &[AnyGraph]) -> Vec<&Graph> {
        views
            .iter()
            .map(|view| view.as_homogeneous().expect("homogeneous view"))
            .collect()
    }

    #[fixture]
    fn request() -> SplitRequest {
        SplitRequest::new()
    }

    #[rstest]
    fn edge_task_symmetrises_partitions(request: SplitRequest) {
        let config = config(Task::Edge);
        let graph: AnyGraph = ring(100).into();
        let views = GraphSplitter::new(&config, &request)
            .split_transductive(&graph, 0)
            .expect("split must succeed");
        let sizes: Vec<usize> = homogeneous(&views)
            .iter()
            .map(|view| view.edge_label_index().len())
            .collect();
        assert_eq!(sizes, vec![156, 20, 24]);
    }

    #[rstest]
    fn link_pred_structure_grows_across_splits(request: SplitRequest) {
        let config = config(Task::LinkPred);
        let graph: AnyGraph = ring(100).into();
        let views = GraphSplitter::new(&config, &request)
            .split_transductive(&graph, 0)
            .expect("split must succeed");
        let views = homogeneous(&views);
        assert_eq!(views[0].message_edges().len(), 78);
        assert_eq!(views[1].message_edges().len(), 78);
        assert_eq!(views[2].message_edges().len(), 88);
        assert_eq!(views[0].edge_label_index().len(), 312);
        assert_eq!(views[0].negative_edges().len(), 156);
    }

    #[rstest]
    fn disjoint_training_separates_message_and_supervision(request: SplitRequest) {
        let config = DatasetConfig {
            edge_train_mode: EdgeTrainMode::Disjoint,
            edge_message_ratio: 0.5,
            ..config(Task::LinkPred)
        };
        let graph: AnyGraph = ring(100).into();
        let views = GraphSplitter::new(&config, &request)
            .split_transductive(&graph, 0)
            .expect("split must succeed");
        let train = homogeneous(&views)[0];
        assert_eq!(train.message_edges().len(), 39);
        assert_eq!(train.label_edges().len(), 39);
        for edge in train.label_edges() {
            assert!(!train.message_edges().contains(edge));
        }
    }

    #[rstest]
    fn graph_task_rejects_transductive_splits(request: SplitRequest) {
        let config = config(Task::Graph);
        let graph: AnyGraph = ring(5).into();
        let err = GraphSplitter::new(&config, &request)
            .split_transductive(&graph, 0)
            .expect_err("graph task is inductive only");
        assert!(matches!(err, SplitError::UnsupportedTask { task: Task::Graph, .. }));
    }

    #[rstest]
    fn custom_node_groups_are_used_verbatim() {
        let config = DatasetConfig {
            general_split_mode: SplitMode::Custom,
            ..config(Task::Node)
        };
        let request = SplitRequest::new();
        let groups = vec![vec![4, 0, 2], vec![1], vec![3]];
        let graph: AnyGraph = ring(5).with_custom_splits(CustomSplit::Nodes(groups.clone())).into();
        let views = GraphSplitter::new(&config, &request)
            .split_transductive(&graph, 0)
            .expect("split must succeed");
        let indices: Vec<Vec<NodeId>> = homogeneous(&views)
            .iter()
            .map(|view| view.node_label_index().to_vec())
            .collect();
        assert_eq!(indices, groups);
    }

    #[rstest]
    fn custom_group_count_must_match_explicit_ratios() {
        let config = DatasetConfig {
            general_split_mode: SplitMode::Custom,
            ..config(Task::Node)
        };
        let request = SplitRequest::new().with_ratios(vec![0.5, 0.5]);
        let graph: AnyGraph = ring(5)
            .with_custom_splits(CustomSplit::Nodes(vec![vec![0], vec![1], vec![2]]))
            .into();
        let err = GraphSplitter::new(&config, &request)
            .split_transductive(&graph, 0)
            .expect_err("count mismatch");
        assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
    }

    #[rstest]
    fn inductive_groups_keep_input_order(request: SplitRequest) {
        let config = config(Task::Graph);
        let graphs: Vec<AnyGraph> = (3..13).map(|n| ring(n).into()).collect();
        let splits = GraphSplitter::new(&config, &request.inductive())
            .split_inductive(&graphs, None)
            .expect("split must succeed");
        let sizes: Vec<usize> = splits.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![6, 1, 3]);
        for split in &splits {
            let nodes: Vec<usize> = split.iter().map(AnyGraph::num_nodes).collect();
            let mut sorted = nodes.clone();
            sorted.sort_unstable();
            assert_eq!(nodes, sorted);
        }
    }

    #[rstest]
    #[case::out_of_range(vec![vec![0], vec![5]])]
    #[case::overlap(vec![vec![0, 1], vec![1]])]
    fn inductive_custom_groups_are_checked(#[case] groups: Vec<Vec<usize>>) {
        let config = DatasetConfig {
            general_split_mode: SplitMode::Custom,
            ..config(Task::Graph)
        };
        let request = SplitRequest::new().inductive();
        let graphs: Vec<AnyGraph> = (3..6).map(|n| ring(n).into()).collect();
        let err = GraphSplitter::new(&config, &request)
            .split_inductive(&graphs, Some(&groups))
            .expect_err("groups must be rejected");
        assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
    }
}
