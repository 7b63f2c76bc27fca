//! Split configuration shared by the dataset and per-graph splitters.
//!
//! The task and mode enums form closed sets; everything that varies per
//! `split` call lives in [`SplitRequest`].

use std::{collections::BTreeSet, fmt};

use crate::{
    error::{Result, SplitError},
    graph::{EdgeType, NodeType},
};

/// Default train/validation/test ratios.
pub const DEFAULT_SPLIT_RATIOS: [f64; 3] = [0.8, 0.1, 0.1];

/// Default fraction of train edges kept as message edges in disjoint mode.
pub const DEFAULT_EDGE_MESSAGE_RATIO: f64 = 0.8;

/// Default number of negatives per positive target edge.
pub const DEFAULT_NEGATIVE_SAMPLING_RATIO: f64 = 1.0;

const RATIO_TOLERANCE: f64 = 1e-6;

/// Learning task a dataset is prepared for.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Task {
    /// Node classification.
    #[default]
    Node,
    /// Edge classification.
    Edge,
    /// Link prediction with negative sampling.
    LinkPred,
    /// Whole-graph classification.
    Graph,
}

impl Task {
    /// Returns the canonical lowercase name of the task.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::LinkPred => "link_pred",
            Self::Graph => "graph",
        }
    }

    /// Whether the task targets edges.
    #[must_use]
    pub const fn is_edge_level(self) -> bool {
        matches!(self, Self::Edge | Self::LinkPred)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How link prediction uses its training edges.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EdgeTrainMode {
    /// Train edges serve as both structure and supervision.
    #[default]
    All,
    /// Train edges are divided into message and supervision edges.
    Disjoint,
}

/// Whether partitions are computed from ratios or supplied by the caller.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SplitMode {
    /// Ratio-based partitioning.
    #[default]
    Random,
    /// Caller-supplied partitions.
    Custom,
}

/// Rounding policy for heterogeneous graphs.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EdgeSplitMode {
    /// Every type is partitioned independently.
    #[default]
    Exact,
    /// One global partition is apportioned across types.
    Approximate,
}

/// Type allow-list restricting which types of a heterogeneous graph are split.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SplitTypes {
    /// Node types, used by node tasks.
    Nodes(BTreeSet<NodeType>),
    /// Edge types, used by edge and link prediction tasks.
    Edges(BTreeSet<EdgeType>),
}

impl SplitTypes {
    /// Builds a node-type allow-list.
    ///
    /// # Examples
    /// ```
    /// use graphsplit_core::SplitTypes;
    ///
    /// let types = SplitTypes::nodes(["paper"]);
    /// assert!(matches!(types, SplitTypes::Nodes(set) if set.len() == 1));
    /// ```
    #[must_use]
    pub fn nodes<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeType>,
    {
        Self::Nodes(types.into_iter().map(Into::into).collect())
    }

    /// Builds an edge-type allow-list.
    #[must_use]
    pub fn edges<I>(types: I) -> Self
    where
        I: IntoIterator<Item = EdgeType>,
    {
        Self::Edges(types.into_iter().collect())
    }
}

/// Immutable settings fixed when a [`crate::GraphDataset`] is built.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetConfig {
    pub(crate) task: Task,
    pub(crate) edge_train_mode: EdgeTrainMode,
    pub(crate) edge_message_ratio: f64,
    pub(crate) edge_negative_sampling_ratio: f64,
    pub(crate) general_split_mode: SplitMode,
    pub(crate) disjoint_split_mode: SplitMode,
    pub(crate) edge_split_mode: EdgeSplitMode,
    pub(crate) seed: u64,
    pub(crate) shuffle: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            task: Task::Node,
            edge_train_mode: EdgeTrainMode::All,
            edge_message_ratio: DEFAULT_EDGE_MESSAGE_RATIO,
            edge_negative_sampling_ratio: DEFAULT_NEGATIVE_SAMPLING_RATIO,
            general_split_mode: SplitMode::Random,
            disjoint_split_mode: SplitMode::Random,
            edge_split_mode: EdgeSplitMode::Exact,
            seed: 0,
            shuffle: true,
        }
    }
}

impl DatasetConfig {
    /// Task the dataset is prepared for.
    #[must_use]
    pub fn task(&self) -> Task {
        self.task
    }

    /// Link prediction training mode.
    #[must_use]
    pub fn edge_train_mode(&self) -> EdgeTrainMode {
        self.edge_train_mode
    }

    /// Fraction of train edges kept as message edges in disjoint mode.
    #[must_use]
    pub fn edge_message_ratio(&self) -> f64 {
        self.edge_message_ratio
    }

    /// Negatives sampled per positive target edge.
    #[must_use]
    pub fn edge_negative_sampling_ratio(&self) -> f64 {
        self.edge_negative_sampling_ratio
    }

    /// Partition basis for label indices and graphs.
    #[must_use]
    pub fn general_split_mode(&self) -> SplitMode {
        self.general_split_mode
    }

    /// Partition basis for message versus supervision edges.
    #[must_use]
    pub fn disjoint_split_mode(&self) -> SplitMode {
        self.disjoint_split_mode
    }

    /// Rounding policy for heterogeneous graphs.
    #[must_use]
    pub fn edge_split_mode(&self) -> EdgeSplitMode {
        self.edge_split_mode
    }

    /// Seed from which per-graph shuffles and negative samples derive.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether random-mode splits permute items before partitioning.
    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.edge_message_ratio.is_finite() || !(0.0..=1.0).contains(&self.edge_message_ratio)
        {
            return Err(SplitError::invalid(format!(
                "edge_message_ratio must lie in [0, 1] (got {})",
                self.edge_message_ratio
            )));
        }
        if !self.edge_negative_sampling_ratio.is_finite() || self.edge_negative_sampling_ratio < 0.0
        {
            return Err(SplitError::invalid(format!(
                "edge_negative_sampling_ratio must be finite and non-negative (got {})",
                self.edge_negative_sampling_ratio
            )));
        }
        Ok(())
    }
}

/// Parameters of a single [`crate::GraphDataset::split`] call.
///
/// # Examples
/// ```
/// use graphsplit_core::SplitRequest;
///
/// let request = SplitRequest::new().with_ratios(vec![0.7, 0.3]).inductive();
/// assert!(!request.is_transductive());
/// assert_eq!(request.ratios(), Some(&[0.7, 0.3][..]));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SplitRequest {
    transductive: bool,
    ratios: Option<Vec<f64>>,
    split_types: Option<SplitTypes>,
}

impl Default for SplitRequest {
    fn default() -> Self {
        Self {
            transductive: true,
            ratios: None,
            split_types: None,
        }
    }
}

impl SplitRequest {
    /// Creates a transductive request with default ratios.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests an inductive split over whole graphs.
    #[must_use]
    pub fn inductive(mut self) -> Self {
        self.transductive = false;
        self
    }

    /// Sets whether the split is transductive.
    #[must_use]
    pub fn with_transductive(mut self, transductive: bool) -> Self {
        self.transductive = transductive;
        self
    }

    /// Overrides the split ratios.
    #[must_use]
    pub fn with_ratios(mut self, ratios: Vec<f64>) -> Self {
        self.ratios = Some(ratios);
        self
    }

    /// Restricts splitting to the given types.
    #[must_use]
    pub fn with_split_types(mut self, split_types: SplitTypes) -> Self {
        self.split_types = Some(split_types);
        self
    }

    /// Whether the request is transductive.
    #[must_use]
    pub fn is_transductive(&self) -> bool {
        self.transductive
    }

    /// Caller-provided ratios, if any.
    #[must_use]
    pub fn ratios(&self) -> Option<&[f64]> {
        self.ratios.as_deref()
    }

    /// Type allow-list, if any.
    #[must_use]
    pub fn split_types(&self) -> Option<&SplitTypes> {
        self.split_types.as_ref()
    }
}

/// Checks a ratio vector: two or three finite, non-negative entries summing to one.
///
/// # Errors
/// Returns [`SplitError::InvalidSplitConfiguration`] when any condition fails.
///
/// # Examples
/// ```
/// use graphsplit_core::validate_ratios;
///
/// assert!(validate_ratios(&[0.8, 0.1, 0.1]).is_ok());
/// assert!(validate_ratios(&[0.5, 0.6]).is_err());
/// assert!(validate_ratios(&[1.0]).is_err());
/// ```
pub fn validate_ratios(ratios: &[f64]) -> Result<()> {
    if !(2..=3).contains(&ratios.len()) {
        return Err(SplitError::invalid(format!(
            "expected 2 or 3 split ratios but got {}",
            ratios.len()
        )));
    }
    if let Some(bad) = ratios.iter().find(|r| !r.is_finite() || **r < 0.0) {
        return Err(SplitError::invalid(format!(
            "split ratios must be finite and non-negative (got {bad})"
        )));
    }
    let sum: f64 = ratios.iter().sum();
    if (sum - 1.0).abs() > RATIO_TOLERANCE {
        return Err(SplitError::invalid(format!(
            "split ratios must sum to 1.0 (got {sum})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default(&[0.8, 0.1, 0.1])]
    #[case::two_way(&[0.5, 0.5])]
    #[case::thirds(&[0.3, 0.3, 0.4])]
    fn accepts_valid_ratios(#[case] ratios: &[f64]) {
        assert!(validate_ratios(ratios).is_ok());
    }

    #[rstest]
    #[case::single(&[1.0])]
    #[case::four(&[0.25, 0.25, 0.25, 0.25])]
    #[case::short_sum(&[0.5, 0.4])]
    #[case::negative(&[1.2, -0.2])]
    #[case::nan(&[f64::NAN, 0.5])]
    fn rejects_invalid_ratios(#[case] ratios: &[f64]) {
        let err = validate_ratios(ratios).expect_err("ratios must be rejected");
        assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
    }

    #[rstest]
    #[case::message_above_one(1.5, 1.0)]
    #[case::message_nan(f64::NAN, 1.0)]
    #[case::negative_sampling_below_zero(0.5, -1.0)]
    fn config_validation_rejects_out_of_range(#[case] message: f64, #[case] negative: f64) {
        let config = DatasetConfig {
            edge_message_ratio: message,
            edge_negative_sampling_ratio: negative,
            ..DatasetConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[rstest]
    fn request_defaults_are_transductive_without_ratios() {
        let request = SplitRequest::new();
        assert!(request.is_transductive());
        assert!(request.ratios().is_none());
        assert!(request.split_types().is_none());
    }
}
