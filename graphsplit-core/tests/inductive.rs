//! Inductive splits that assign whole graphs to splits.

mod common;

use common::{node_counts, ring};
use graphsplit_core::{
    AnyGraph, EdgeTrainMode, Graph, GraphDatasetBuilder, SplitError, SplitMode, SplitRequest, Task,
};
use rstest::rstest;

/// Graph `i` has `i + 2` nodes so positions can be recovered from sizes.
fn sized_graphs(count: usize) -> Vec<Graph> {
    (0..count)
        .map(|i| Graph::new(i + 2, vec![(0, 1)], false).expect("valid graph"))
        .collect()
}

fn groups(splits: &[graphsplit_core::GraphDataset]) -> Vec<Vec<usize>> {
    splits
        .iter()
        .map(|split| node_counts(split.graphs().expect("materialised")))
        .collect()
}

#[rstest]
fn graph_task_assigns_graphs_in_input_order() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::Graph)
        .with_seed(5)
        .build(sized_graphs(10))
        .expect("valid dataset");
    let splits = dataset
        .split(&SplitRequest::new().inductive())
        .expect("split succeeds");
    let sizes: Vec<Option<usize>> = splits.iter().map(|split| split.graph_count()).collect();
    assert_eq!(sizes, vec![Some(6), Some(1), Some(3)]);

    let groups = groups(&splits);
    for group in &groups {
        assert!(group.windows(2).all(|pair| pair[0] < pair[1]), "order kept: {group:?}");
    }
    let mut all: Vec<usize> = groups.concat();
    all.sort_unstable();
    assert_eq!(all, (2..12).collect::<Vec<_>>());
}

#[rstest]
fn graph_task_rejects_transductive_requests() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::Graph)
        .build(sized_graphs(4))
        .expect("valid dataset");
    let err = dataset.split(&SplitRequest::new()).expect_err("graphs split wholesale");
    assert!(matches!(err, SplitError::UnsupportedTask { task: Task::Graph, .. }));
}

#[rstest]
fn fewer_graphs_than_splits_fail() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::Graph)
        .build(sized_graphs(2))
        .expect("valid dataset");
    let err = dataset
        .split(&SplitRequest::new().inductive())
        .expect_err("two graphs, three splits");
    assert!(matches!(err, SplitError::InsufficientItems { items: 2, splits: 3, unit: "graphs" }));
}

#[rstest]
fn custom_graph_groups_are_used_verbatim() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::Graph)
        .with_general_split_mode(SplitMode::Custom)
        .with_custom_split_graphs(vec![vec![3, 1], vec![0, 2]])
        .build(sized_graphs(4))
        .expect("valid dataset");
    let splits = dataset
        .split(&SplitRequest::new().inductive())
        .expect("split succeeds");
    assert_eq!(groups(&splits), vec![vec![5, 3], vec![2, 4]]);
}

#[rstest]
#[case::out_of_range(vec![vec![0, 4], vec![1]])]
#[case::overlapping(vec![vec![0, 1], vec![1, 2]])]
fn custom_graph_groups_are_validated(#[case] custom: Vec<Vec<usize>>) {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::Graph)
        .with_general_split_mode(SplitMode::Custom)
        .with_custom_split_graphs(custom)
        .build(sized_graphs(4))
        .expect("valid dataset");
    let err = dataset
        .split(&SplitRequest::new().inductive())
        .expect_err("groups are invalid");
    assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
}

#[rstest]
fn link_prediction_graphs_gain_negatives_and_disjoint_training() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::LinkPred)
        .with_edge_train_mode(EdgeTrainMode::Disjoint)
        .build((0..4).map(|_| ring(20)))
        .expect("valid dataset");
    let request = SplitRequest::new().with_ratios(vec![0.5, 0.5]).inductive();
    let splits = dataset.split(&request).expect("split succeeds");
    assert_eq!(splits.len(), 2);

    let homogeneous = |graph: &AnyGraph| graph.as_homogeneous().expect("homogeneous").clone();
    for graph in splits[0].graphs().expect("materialised").iter().map(homogeneous) {
        assert_eq!(graph.message_edges().len(), 15);
        assert_eq!(graph.label_edges().len(), 5);
        assert_eq!(graph.edge_label_index().len(), 20);
    }
    for graph in splits[1].graphs().expect("materialised").iter().map(homogeneous) {
        assert_eq!(graph.message_edges().len(), 20);
        assert_eq!(graph.edge_label_index().len(), 80);
    }
}
