//! Error types for the graphsplit core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::config::Task;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while constructing a [`crate::Graph`] or
/// [`crate::HeteroGraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// Tensor values did not fill the declared shape.
    #[error("tensor shape {shape:?} requires {expected} values but {actual} were given")]
    ShapeMismatch {
        /// Declared tensor shape.
        shape: Vec<usize>,
        /// Number of values implied by the shape.
        expected: usize,
        /// Number of values provided.
        actual: usize,
    },
    /// A per-node or per-edge tensor had the wrong number of rows.
    #[error("{attribute} has {actual} rows but the graph has {expected} {unit}")]
    RowCountMismatch {
        /// Name of the offending attribute.
        attribute: &'static str,
        /// Rows required by the graph.
        expected: usize,
        /// Rows present in the tensor.
        actual: usize,
        /// Item kind counted by `expected` (`nodes` or `edges`).
        unit: &'static str,
    },
    /// An edge, label index, or custom split referenced a missing node.
    #[error("node {node} is out of range for {num_nodes} nodes")]
    NodeOutOfRange {
        /// The referenced node id.
        node: usize,
        /// Number of nodes available.
        num_nodes: usize,
    },
    /// A node type key was not declared on the graph.
    #[error("unknown node type `{node_type}`")]
    UnknownNodeType {
        /// The unknown node type.
        node_type: String,
    },
    /// An edge type key was not declared on the graph.
    #[error("unknown edge type `{edge_type}`")]
    UnknownEdgeType {
        /// The unknown edge type rendered as `source__relation__destination`.
        edge_type: String,
    },
    /// An edge type was listed more than once when building a graph.
    #[error("edge type `{edge_type}` is listed more than once")]
    DuplicateEdgeType {
        /// The repeated edge type rendered as `source__relation__destination`.
        edge_type: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// Tensor values did not fill the declared shape.
        ShapeMismatch => ShapeMismatch { .. } => "GRAPH_SHAPE_MISMATCH",
        /// A per-node or per-edge tensor had the wrong number of rows.
        RowCountMismatch => RowCountMismatch { .. } => "GRAPH_ROW_COUNT_MISMATCH",
        /// An edge or index referenced a missing node.
        NodeOutOfRange => NodeOutOfRange { .. } => "GRAPH_NODE_OUT_OF_RANGE",
        /// A node type key was not declared on the graph.
        UnknownNodeType => UnknownNodeType { .. } => "GRAPH_UNKNOWN_NODE_TYPE",
        /// An edge type key was not declared on the graph.
        UnknownEdgeType => UnknownEdgeType { .. } => "GRAPH_UNKNOWN_EDGE_TYPE",
        /// An edge type was listed more than once.
        DuplicateEdgeType => DuplicateEdgeType { .. } => "GRAPH_DUPLICATE_EDGE_TYPE",
    }
}

/// An error produced by [`crate::Generator`] implementations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GeneratorError {
    /// An [`crate::EnsembleGenerator`] was built without sources.
    #[error("ensemble generator requires at least one source")]
    EmptyEnsemble,
    /// A synchronisation primitive became poisoned after a panic.
    #[error("lock for {resource} is poisoned")]
    LockPoisoned {
        /// Name of the poisoned resource.
        resource: &'static str,
    },
    /// Weighted selection received unusable weights.
    #[error("invalid selection weights: {reason}")]
    InvalidWeights {
        /// Description of what was wrong with the weights.
        reason: String,
    },
    /// A selection policy returned an index with no matching source.
    #[error("selected source {index} but only {sources} sources exist")]
    SourceOutOfRange {
        /// Index returned by the policy.
        index: usize,
        /// Number of sources in the ensemble.
        sources: usize,
    },
    /// Generator parameters were rejected.
    #[error("invalid generator parameters: {reason}")]
    InvalidParameters {
        /// Description of the invalid parameter.
        reason: String,
    },
    /// The generated graph failed validation.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

define_error_codes! {
    /// Stable codes describing [`GeneratorError`] variants.
    enum GeneratorErrorCode for GeneratorError {
        /// An ensemble was built without sources.
        EmptyEnsemble => EmptyEnsemble => "GENERATOR_EMPTY_ENSEMBLE",
        /// A synchronisation primitive became poisoned.
        LockPoisoned => LockPoisoned { .. } => "GENERATOR_LOCK_POISONED",
        /// Weighted selection received unusable weights.
        InvalidWeights => InvalidWeights { .. } => "GENERATOR_INVALID_WEIGHTS",
        /// A selection policy returned an out-of-range index.
        SourceOutOfRange => SourceOutOfRange { .. } => "GENERATOR_SOURCE_OUT_OF_RANGE",
        /// Generator parameters were rejected.
        InvalidParameters => InvalidParameters { .. } => "GENERATOR_INVALID_PARAMETERS",
        /// The generated graph failed validation.
        Graph => Graph(..) => "GENERATOR_GRAPH",
    }
}

/// Error type produced when configuring or running a dataset split.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SplitError {
    /// Fewer items were available than the number of requested splits.
    #[error("{items} {unit} cannot be split into {splits} non-empty parts")]
    InsufficientItems {
        /// Number of items available.
        items: usize,
        /// Number of splits requested.
        splits: usize,
        /// Kind of item being partitioned.
        unit: &'static str,
    },
    /// Ratios, split types, or custom partitions disagree with the request.
    #[error("invalid split configuration: {reason}")]
    InvalidSplitConfiguration {
        /// Description of the inconsistency.
        reason: String,
    },
    /// Negative sampling could not find enough non-edges.
    #[error("requested {requested} negative edges but only {available} non-edges exist")]
    SamplingExhausted {
        /// Number of negatives requested.
        requested: usize,
        /// Number of non-edges that could be found.
        available: usize,
    },
    /// The task and mode combination is not defined.
    #[error("task `{task}` does not support {reason}")]
    UnsupportedTask {
        /// Task configured on the dataset.
        task: Task,
        /// Description of the unsupported combination.
        reason: String,
    },
    /// A graph failed validation while deriving a split view.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// A generator failed while producing graphs.
    #[error("generator `{generator}` failed: {error}")]
    Generator {
        /// Name of the failing generator.
        generator: String,
        /// Underlying generator error.
        #[source]
        error: GeneratorError,
    },
}

define_error_codes! {
    /// Stable codes describing [`SplitError`] variants.
    enum SplitErrorCode for SplitError {
        /// Fewer items were available than requested splits.
        InsufficientItems => InsufficientItems { .. } => "SPLIT_INSUFFICIENT_ITEMS",
        /// Ratios, split types, or custom partitions disagree.
        InvalidSplitConfiguration => InvalidSplitConfiguration { .. } => "SPLIT_INVALID_CONFIGURATION",
        /// Negative sampling could not find enough non-edges.
        SamplingExhausted => SamplingExhausted { .. } => "SPLIT_SAMPLING_EXHAUSTED",
        /// The task and mode combination is not defined.
        UnsupportedTask => UnsupportedTask { .. } => "SPLIT_UNSUPPORTED_TASK",
        /// A graph failed validation.
        GraphFailure => Graph(..) => "SPLIT_GRAPH_FAILURE",
        /// A generator failed while producing graphs.
        GeneratorFailure => Generator { .. } => "SPLIT_GENERATOR_FAILURE",
    }
}

impl SplitError {
    /// Retrieve the inner [`GeneratorErrorCode`] when the error originated in a [`crate::Generator`].
    pub const fn generator_code(&self) -> Option<GeneratorErrorCode> {
        match self {
            Self::Generator { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSplitConfiguration {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(task: Task, reason: impl Into<String>) -> Self {
        Self::UnsupportedTask {
            task,
            reason: reason.into(),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SplitError>;
