//! Builder for [`GraphDataset`] instances.
//!
//! Collects the task and mode settings, validates them once, and attaches
//! either a graph list or a generator.

use std::sync::Arc;

use crate::{
    Result,
    config::{DatasetConfig, EdgeSplitMode, EdgeTrainMode, SplitMode, Task},
    dataset::GraphDataset,
    error::SplitError,
    generator::Generator,
    graph::AnyGraph,
};

/// Configures and constructs [`GraphDataset`] instances.
///
/// # Examples
/// ```
/// use graphsplit_core::{EdgeTrainMode, Graph, GraphDatasetBuilder, Task};
///
/// let dataset = GraphDatasetBuilder::new()
///     .with_task(Task::LinkPred)
///     .with_edge_train_mode(EdgeTrainMode::Disjoint)
///     .with_edge_message_ratio(0.6)
///     .build([Graph::new(4, vec![(0, 1), (1, 2), (2, 3)], false)?])
///     .expect("builder configuration is valid");
/// assert_eq!(dataset.task(), Task::LinkPred);
/// assert_eq!(dataset.config().edge_message_ratio(), 0.6);
/// # Ok::<(), graphsplit_core::GraphError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphDatasetBuilder {
    config: DatasetConfig,
    custom_split_graphs: Option<Vec<Vec<usize>>>,
}

impl GraphDatasetBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use graphsplit_core::{GraphDatasetBuilder, Task};
    ///
    /// let builder = GraphDatasetBuilder::new();
    /// assert_eq!(builder.config().task(), Task::Node);
    /// assert_eq!(builder.config().edge_negative_sampling_ratio(), 1.0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the learning task.
    #[must_use]
    pub fn with_task(mut self, task: Task) -> Self {
        self.config.task = task;
        self
    }

    /// Chooses whether link prediction trains on all edges or on disjoint
    /// message and supervision sets.
    #[must_use]
    pub fn with_edge_train_mode(mut self, mode: EdgeTrainMode) -> Self {
        self.config.edge_train_mode = mode;
        self
    }

    /// Overrides the fraction of training edges kept as message edges.
    ///
    /// Defaults to [`crate::DEFAULT_EDGE_MESSAGE_RATIO`].
    #[must_use]
    pub fn with_edge_message_ratio(mut self, ratio: f64) -> Self {
        self.config.edge_message_ratio = ratio;
        self
    }

    /// Overrides the number of negatives drawn per positive target.
    ///
    /// Defaults to [`crate::DEFAULT_NEGATIVE_SAMPLING_RATIO`].
    #[must_use]
    pub fn with_edge_negative_sampling_ratio(mut self, ratio: f64) -> Self {
        self.config.edge_negative_sampling_ratio = ratio;
        self
    }

    /// Chooses ratio-based or caller-supplied partitions.
    #[must_use]
    pub fn with_general_split_mode(mut self, mode: SplitMode) -> Self {
        self.config.general_split_mode = mode;
        self
    }

    /// Chooses ratio-based or caller-supplied message edges.
    #[must_use]
    pub fn with_disjoint_split_mode(mut self, mode: SplitMode) -> Self {
        self.config.disjoint_split_mode = mode;
        self
    }

    /// Chooses per-type or global allocation for typed edge splits.
    #[must_use]
    pub fn with_edge_split_mode(mut self, mode: EdgeSplitMode) -> Self {
        self.config.edge_split_mode = mode;
        self
    }

    /// Seeds every shuffle and negative sample.
    ///
    /// # Examples
    /// ```
    /// use graphsplit_core::GraphDatasetBuilder;
    ///
    /// let builder = GraphDatasetBuilder::new().with_seed(42);
    /// assert_eq!(builder.config().seed(), 42);
    /// ```
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Disables shuffling when `false`, partitioning in input order.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.config.shuffle = shuffle;
        self
    }

    /// Lists dataset positions per split for inductive custom splits.
    #[must_use]
    pub fn with_custom_split_graphs(mut self, groups: Vec<Vec<usize>>) -> Self {
        self.custom_split_graphs = Some(groups);
        self
    }

    /// Returns the configuration accumulated so far.
    #[must_use]
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Validates the configuration and wraps `graphs` in a dataset.
    ///
    /// # Errors
    /// Returns [`SplitError::InvalidSplitConfiguration`] when a ratio is out of
    /// range or `graphs` is empty.
    pub fn build<I, G>(self, graphs: I) -> Result<GraphDataset>
    where
        I: IntoIterator<Item = G>,
        G: Into<AnyGraph>,
    {
        self.config.validate()?;
        let graphs: Vec<AnyGraph> = graphs.into_iter().map(Into::into).collect();
        if graphs.is_empty() {
            return Err(SplitError::invalid(
                "a dataset needs at least one graph or a generator",
            ));
        }
        Ok(GraphDataset::from_graphs(
            self.config,
            graphs,
            self.custom_split_graphs,
        ))
    }

    /// Validates the configuration and backs the dataset with `generator`.
    ///
    /// # Errors
    /// Returns [`SplitError::InvalidSplitConfiguration`] when a ratio is out of
    /// range or custom split graphs were supplied, as generated graphs have
    /// no stable positions.
    pub fn build_with_generator<G>(self, generator: G) -> Result<GraphDataset>
    where
        G: Generator + 'static,
    {
        self.config.validate()?;
        if self.custom_split_graphs.is_some() {
            return Err(SplitError::invalid(
                "custom split graphs need a materialised graph list",
            ));
        }
        Ok(GraphDataset::from_generator(self.config, Arc::new(generator)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{DEFAULT_EDGE_MESSAGE_RATIO, DEFAULT_NEGATIVE_SAMPLING_RATIO},
        generator::RandomGraphGenerator,
        graph::Graph,
    };
    use rstest::rstest;

    fn edge() -> Graph {
        Graph::new(2, vec![(0, 1)], false).expect("valid graph")
    }

    #[rstest]
    fn defaults_match_documented_values() {
        let builder = GraphDatasetBuilder::new();
        let config = builder.config();
        assert_eq!(config.task(), Task::Node);
        assert_eq!(config.edge_train_mode(), EdgeTrainMode::All);
        assert_eq!(config.edge_message_ratio(), DEFAULT_EDGE_MESSAGE_RATIO);
        assert_eq!(
            config.edge_negative_sampling_ratio(),
            DEFAULT_NEGATIVE_SAMPLING_RATIO
        );
        assert_eq!(config.general_split_mode(), SplitMode::Random);
        assert_eq!(config.edge_split_mode(), EdgeSplitMode::Exact);
        assert!(config.shuffle());
    }

    #[rstest]
    #[case::message_ratio(GraphDatasetBuilder::new().with_edge_message_ratio(1.5))]
    #[case::negative_ratio(GraphDatasetBuilder::new().with_edge_negative_sampling_ratio(-0.5))]
    fn build_rejects_out_of_range_ratios(#[case] builder: GraphDatasetBuilder) {
        let err = builder.build([edge()]).expect_err("configuration must be rejected");
        assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
    }

    #[rstest]
    fn build_rejects_empty_graph_lists() {
        let err = GraphDatasetBuilder::new()
            .build(Vec::<Graph>::new())
            .expect_err("empty dataset");
        assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
    }

    #[rstest]
    fn generator_datasets_reject_custom_graph_groups() {
        let generator = RandomGraphGenerator::new(vec![5], 0.5, 0).expect("valid parameters");
        let err = GraphDatasetBuilder::new()
            .with_custom_split_graphs(vec![vec![0], vec![1]])
            .build_with_generator(generator)
            .expect_err("positions are unstable");
        assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
    }
}
