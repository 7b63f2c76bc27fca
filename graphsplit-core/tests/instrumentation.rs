//! Spans and events emitted by dataset splits.

mod common;

use common::{bibliography, ring};
use graphsplit_core::{EdgeTrainMode, Graph, GraphDatasetBuilder, SplitRequest, Task};
use graphsplit_test_support::tracing::RecordingLayer;
use rstest::rstest;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt};

#[rstest]
fn split_records_dataset_graph_and_sampling_spans() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::LinkPred)
        .build([ring(40)])
        .expect("valid dataset");
    let (layer, result) = RecordingLayer::capture(|| dataset.split(&SplitRequest::new()));
    result.expect("split succeeds");

    let outer = layer.span_named("dataset.split").expect("dataset span recorded");
    assert_eq!(outer.fields.get("task").map(String::as_str), Some("link_pred"));
    assert_eq!(outer.fields.get("transductive").map(String::as_str), Some("true"));
    assert_eq!(outer.fields.get("graphs").map(String::as_str), Some("Some(1)"));

    let graph = layer.span_named("graph.split").expect("graph span recorded");
    assert_eq!(graph.fields.get("hetero").map(String::as_str), Some("false"));

    let sampled: Vec<_> = layer
        .spans()
        .into_iter()
        .filter(|span| span.name == "negative.sample")
        .collect();
    assert_eq!(sampled.len(), 3, "one sampling span per split");
    assert!(layer.events_at(Level::ERROR).is_empty());
}

#[rstest]
fn failed_splits_emit_error_events() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::Edge)
        .build([Graph::new(2, vec![(0, 1)], false).expect("valid graph")])
        .expect("valid dataset");
    let (layer, result) = RecordingLayer::capture(|| dataset.split(&SplitRequest::new()));
    assert!(result.is_err());
    let errors = layer.events_at(Level::ERROR);
    assert!(
        errors
            .iter()
            .any(|event| event.fields.get("error").is_some_and(|e| e.contains("cannot be split"))),
        "errors: {errors:?}",
    );
}

#[rstest]
fn inductive_splits_record_the_graph_count() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::Graph)
        .build((0..5).map(|_| ring(4)))
        .expect("valid dataset");
    let (layer, result) =
        RecordingLayer::capture(|| dataset.split(&SplitRequest::new().inductive()));
    result.expect("five graphs, three splits");
    let span = layer.span_named("graph.split_inductive").expect("inductive span recorded");
    assert_eq!(span.fields.get("graphs").map(String::as_str), Some("5"));
}

#[rstest]
fn typed_sampling_logs_one_debug_event_per_relation_and_split() {
    let dataset = GraphDatasetBuilder::new()
        .with_task(Task::LinkPred)
        .with_edge_train_mode(EdgeTrainMode::Disjoint)
        .build([bibliography()])
        .expect("valid dataset");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry()
        .with(layer.clone())
        .with(fmt::layer().with_test_writer());

    let splits = tracing::subscriber::with_default(subscriber, || dataset.split(&SplitRequest::new()))
        .expect("split succeeds");
    assert_eq!(splits.len(), 3);

    let sampled: Vec<_> = layer
        .events_at(Level::DEBUG)
        .into_iter()
        .filter(|event| event.message() == Some("sampled typed negatives"))
        .collect();
    assert_eq!(sampled.len(), 6, "two relations across three splits");
    assert!(
        sampled
            .iter()
            .all(|event| event.fields.contains_key("edge_type") && event.fields.contains_key("negatives"))
    );
    let graph = layer.span_named("graph.split").expect("graph span recorded");
    assert_eq!(graph.fields.get("hetero").map(String::as_str), Some("true"));
}
