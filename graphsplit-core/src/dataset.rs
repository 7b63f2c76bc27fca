//! Dataset containers and the split engine.

use std::{borrow::Cow, fmt, slice, sync::Arc};

use tracing::{debug, instrument};

use crate::{
    config::{DEFAULT_SPLIT_RATIOS, DatasetConfig, SplitRequest, Task},
    error::{GeneratorError, Result, SplitError},
    generator::{GeneratedGraphs, Generator},
    graph::AnyGraph,
    splitter::GraphSplitter,
};

#[derive(Clone)]
enum Source {
    Graphs(Vec<AnyGraph>),
    Generator(Arc<dyn Generator>),
}

/// An ordered collection of graphs prepared for one task.
///
/// Built with [`crate::GraphDatasetBuilder`]. Generator-backed datasets have
/// no fixed length: indexed access regenerates a graph and a split drains one
/// generator cycle.
///
/// # Examples
/// ```
/// use graphsplit_core::{Graph, GraphDatasetBuilder, SplitRequest, Task};
///
/// let edges: Vec<_> = (0..100).map(|u| (u, (u + 1) % 100)).collect();
/// let dataset = GraphDatasetBuilder::new()
///     .with_task(Task::Edge)
///     .build([Graph::new(100, edges, false)?])?;
/// let splits = dataset.split(&SplitRequest::new())?;
/// let sizes: Vec<usize> = splits
///     .iter()
///     .filter_map(|split| split.graphs()?.first()?.as_homogeneous())
///     .map(|graph| graph.edge_label_index().len())
///     .collect();
/// assert_eq!(sizes, vec![156, 20, 24]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct GraphDataset {
    config: DatasetConfig,
    source: Source,
    custom_split_graphs: Option<Vec<Vec<usize>>>,
}

impl GraphDataset {
    pub(crate) fn from_graphs(
        config: DatasetConfig,
        graphs: Vec<AnyGraph>,
        custom_split_graphs: Option<Vec<Vec<usize>>>,
    ) -> Self {
        Self {
            config,
            source: Source::Graphs(graphs),
            custom_split_graphs,
        }
    }

    pub(crate) fn from_generator(config: DatasetConfig, generator: Arc<dyn Generator>) -> Self {
        Self {
            config,
            source: Source::Generator(generator),
            custom_split_graphs: None,
        }
    }

    /// Settings the dataset was built with.
    #[must_use]
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Task the dataset is prepared for.
    #[must_use]
    pub fn task(&self) -> Task {
        self.config.task
    }

    /// Number of graphs, or `None` when backed by a generator.
    #[must_use]
    pub fn graph_count(&self) -> Option<usize> {
        match &self.source {
            Source::Graphs(graphs) => Some(graphs.len()),
            Source::Generator(_) => None,
        }
    }

    /// Whether graphs are produced on demand.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        matches!(self.source, Source::Generator(_))
    }

    /// The materialised graphs, if any.
    #[must_use]
    pub fn graphs(&self) -> Option<&[AnyGraph]> {
        match &self.source {
            Source::Graphs(graphs) => Some(graphs),
            Source::Generator(_) => None,
        }
    }

    /// Returns the graph at `index`.
    ///
    /// Generator-backed datasets produce a fresh graph on every call.
    ///
    /// # Errors
    /// Returns [`SplitError::Generator`] when generation fails.
    pub fn get(&self, index: usize) -> Result<Option<Cow<'_, AnyGraph>>> {
        match &self.source {
            Source::Graphs(graphs) => Ok(graphs.get(index).map(Cow::Borrowed)),
            Source::Generator(generator) => generator
                .generate()
                .map(|graph| Some(Cow::Owned(graph)))
                .map_err(|error| generation_failed(generator.as_ref(), error)),
        }
    }

    /// Iterates the graphs; infinite for generator-backed datasets.
    #[must_use]
    pub fn iter(&self) -> DatasetIter<'_> {
        match &self.source {
            Source::Graphs(graphs) => DatasetIter::Graphs(graphs.iter()),
            Source::Generator(generator) => DatasetIter::Generated {
                name: generator.name(),
                graphs: GeneratedGraphs::new(generator.as_ref()),
            },
        }
    }

    /// Splits the dataset into one container per split, in split order.
    ///
    /// Transductive requests split every graph into views that keep graph
    /// order; inductive requests assign whole graphs to splits.
    ///
    /// # Errors
    /// Returns [`SplitError::InsufficientItems`] for an empty dataset and
    /// propagates every [`GraphSplitter`] failure; no partial result is
    /// returned.
    #[instrument(
        name = "dataset.split",
        err,
        skip(self, request),
        fields(
            task = %self.config.task,
            transductive = request.is_transductive(),
            graphs = ?self.graph_count(),
        ),
    )]
    pub fn split(&self, request: &SplitRequest) -> Result<Vec<GraphDataset>> {
        let graphs = self.materialise()?;
        if graphs.is_empty() {
            return Err(SplitError::InsufficientItems {
                items: 0,
                splits: request.ratios().map_or(DEFAULT_SPLIT_RATIOS.len(), <[f64]>::len),
                unit: "graphs",
            });
        }
        let splitter = GraphSplitter::new(&self.config, request);
        let containers = if request.is_transductive() {
            split_each(&splitter, &graphs)?
        } else {
            splitter.split_inductive(&graphs, self.custom_split_graphs.as_deref())?
        };
        debug!(splits = containers.len(), "dataset split complete");
        Ok(containers
            .into_iter()
            .map(|graphs| Self::from_graphs(self.config.clone(), graphs, None))
            .collect())
    }

    /// Keeps the graphs matching `predicate`, in order.
    ///
    /// With `deep_copy` the retained graphs get their own attribute storage.
    ///
    /// # Errors
    /// Returns [`SplitError::InvalidSplitConfiguration`] for generator-backed
    /// datasets, which have no fixed graph list to filter.
    ///
    /// # Examples
    /// ```
    /// use graphsplit_core::{Graph, GraphDatasetBuilder};
    ///
    /// let dataset = GraphDatasetBuilder::new().build([
    ///     Graph::new(3, vec![(0, 1)], false)?,
    ///     Graph::new(8, vec![(0, 1)], false)?,
    /// ])?;
    /// let large = dataset.filter(|graph| graph.num_nodes() > 5, false)?;
    /// assert_eq!(large.graph_count(), Some(1));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn filter<F>(&self, mut predicate: F, deep_copy: bool) -> Result<GraphDataset>
    where
        F: FnMut(&AnyGraph) -> bool,
    {
        let Source::Graphs(graphs) = &self.source else {
            return Err(SplitError::invalid(
                "generator-backed datasets cannot be filtered",
            ));
        };
        let kept = graphs
            .iter()
            .filter(|graph| predicate(graph))
            .map(|graph| if deep_copy { graph.deep_copy() } else { graph.clone() })
            .collect();
        Ok(Self::from_graphs(self.config.clone(), kept, None))
    }

    /// Node feature width of the first graph.
    ///
    /// # Errors
    /// Returns [`SplitError::Generator`] when probing a generator fails.
    pub fn num_node_features(&self) -> Result<usize> {
        self.first_graph(AnyGraph::node_feature_columns)
    }

    /// Largest node class count across graphs.
    ///
    /// # Errors
    /// Returns [`SplitError::Generator`] when probing a generator fails.
    pub fn num_node_labels(&self) -> Result<usize> {
        self.max_over_graphs(AnyGraph::node_label_classes)
    }

    /// Edge feature width of the first graph.
    ///
    /// # Errors
    /// Returns [`SplitError::Generator`] when probing a generator fails.
    pub fn num_edge_features(&self) -> Result<usize> {
        self.first_graph(AnyGraph::edge_feature_columns)
    }

    /// Largest edge class count across graphs.
    ///
    /// # Errors
    /// Returns [`SplitError::Generator`] when probing a generator fails.
    pub fn num_edge_labels(&self) -> Result<usize> {
        self.max_over_graphs(AnyGraph::edge_label_classes)
    }

    /// Graph feature width of the first graph.
    ///
    /// # Errors
    /// Returns [`SplitError::Generator`] when probing a generator fails.
    pub fn num_graph_features(&self) -> Result<usize> {
        self.first_graph(AnyGraph::graph_feature_columns)
    }

    /// Largest graph class count across graphs.
    ///
    /// # Errors
    /// Returns [`SplitError::Generator`] when probing a generator fails.
    pub fn num_graph_labels(&self) -> Result<usize> {
        self.max_over_graphs(AnyGraph::graph_label_classes)
    }

    /// Label count for the configured task.
    ///
    /// # Errors
    /// Returns [`SplitError::Generator`] when probing a generator fails.
    pub fn num_labels(&self) -> Result<usize> {
        match self.config.task {
            Task::Node => self.num_node_labels(),
            Task::Edge | Task::LinkPred => self.num_edge_labels(),
            Task::Graph => self.num_graph_labels(),
        }
    }

    fn materialise(&self) -> Result<Cow<'_, [AnyGraph]>> {
        match &self.source {
            Source::Graphs(graphs) => Ok(Cow::Borrowed(graphs)),
            Source::Generator(generator) => {
                let cycle = generator.cycle_len();
                debug!(generator = generator.name(), cycle, "draining one generator cycle");
                GeneratedGraphs::new(generator.as_ref())
                    .take(cycle)
                    .collect::<core::result::Result<Vec<_>, _>>()
                    .map(Cow::Owned)
                    .map_err(|error| generation_failed(generator.as_ref(), error))
            }
        }
    }

    fn first_graph(&self, property: impl Fn(&AnyGraph) -> usize) -> Result<usize> {
        Ok(self.get(0)?.map_or(0, |graph| property(&graph)))
    }

    fn max_over_graphs(&self, property: impl Fn(&AnyGraph) -> usize) -> Result<usize> {
        match &self.source {
            Source::Graphs(graphs) => Ok(graphs.iter().map(property).max().unwrap_or(0)),
            Source::Generator(_) => self.first_graph(property),
        }
    }
}

impl fmt::Debug for GraphDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Graphs(graphs) => format!("{} graphs", graphs.len()),
            Source::Generator(generator) => format!("generator `{}`", generator.name()),
        };
        f.debug_struct("GraphDataset")
            .field("config", &self.config)
            .field("source", &source)
            .finish_non_exhaustive()
    }
}

impl<'a> IntoIterator for &'a GraphDataset {
    type Item = Result<Cow<'a, AnyGraph>>;
    type IntoIter = DatasetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`GraphDataset::iter`].
#[derive(Debug)]
pub enum DatasetIter<'a> {
    /// Walks a materialised graph list.
    Graphs(slice::Iter<'a, AnyGraph>),
    /// Generates graphs without end.
    Generated {
        /// Generator name, reported with failures.
        name: &'a str,
        /// Underlying generator iterator.
        graphs: GeneratedGraphs<'a>,
    },
}

impl<'a> Iterator for DatasetIter<'a> {
    type Item = Result<Cow<'a, AnyGraph>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Graphs(graphs) => graphs.next().map(|graph| Ok(Cow::Borrowed(graph))),
            Self::Generated { name, graphs } => graphs.next().map(|result| {
                result.map(Cow::Owned).map_err(|error| SplitError::Generator {
                    generator: (*name).to_owned(),
                    error,
                })
            }),
        }
    }
}

fn split_each(splitter: &GraphSplitter<'_>, graphs: &[AnyGraph]) -> Result<Vec<Vec<AnyGraph>>> {
    let mut containers: Vec<Vec<AnyGraph>> = Vec::new();
    for (position, graph) in graphs.iter().enumerate() {
        let views = splitter.split_transductive(graph, position)?;
        if containers.is_empty() {
            containers = views.iter().map(|_| Vec::with_capacity(graphs.len())).collect();
        } else if views.len() != containers.len() {
            return Err(SplitError::invalid(format!(
                "graph {position} splits into {} parts but earlier graphs split into {}",
                views.len(),
                containers.len()
            )));
        }
        for (container, view) in containers.iter_mut().zip(views) {
            container.push(view);
        }
    }
    Ok(containers)
}

fn generation_failed(generator: &dyn Generator, error: GeneratorError) -> SplitError {
    SplitError::Generator {
        generator: generator.name().to_owned(),
        error,
    }
}
