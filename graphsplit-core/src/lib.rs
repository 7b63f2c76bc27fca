//! Graphsplit core library.
//!
//! Splits attributed graph datasets into train/validation/test partitions
//! for node, edge, link prediction, and graph-level tasks.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod config;
mod dataset;
mod disjoint;
mod error;
mod generator;
mod graph;
mod negative;
mod partition;
mod rng;
mod splitter;
mod typed;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    builder::GraphDatasetBuilder,
    config::{
        DEFAULT_EDGE_MESSAGE_RATIO, DEFAULT_NEGATIVE_SAMPLING_RATIO, DEFAULT_SPLIT_RATIOS,
        DatasetConfig, EdgeSplitMode, EdgeTrainMode, SplitMode, SplitRequest, SplitTypes, Task,
        validate_ratios,
    },
    dataset::{DatasetIter, GraphDataset},
    disjoint::{DisjointSplit, message_edge_count, split_by_message_edges, split_by_ratio},
    error::{
        GeneratorError, GeneratorErrorCode, GraphError, GraphErrorCode, Result, SplitError,
        SplitErrorCode,
    },
    generator::{
        EnsembleGenerator, GeneratedGraphs, Generator, RandomGraphGenerator, RoundRobin,
        SelectionPolicy, Uniform, Weighted,
    },
    graph::{
        AnyGraph, Attributes, CustomSplit, Edge, EdgeIndex, EdgeType, Graph, HeteroGraph, NodeId,
        NodeType, Tensor, TypedAttributes,
    },
    negative::{NegativeUniverse, negative_count, sample_negatives},
    partition::split_sizes,
    splitter::GraphSplitter,
    typed::{TypedSplitRouter, participating_types},
};
