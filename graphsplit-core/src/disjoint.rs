//! Message/supervision separation for disjoint link-prediction training.

use std::collections::HashMap;

use crate::error::{Result, SplitError};
use crate::graph::Edge;
use crate::partition::floor_share;

/// Training edges divided into message-passing structure and targets.
///
/// Both halves are listed once per undirected edge; views mirror them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DisjointSplit {
    /// Edges kept as graph structure.
    pub message: Vec<Edge>,
    /// Edges used only as prediction targets.
    pub supervision: Vec<Edge>,
}

/// Number of message edges carved out of `train_edges` training edges.
///
/// # Errors
/// Returns [`SplitError::InsufficientItems`] when fewer than two training
/// edges exist, as both halves need at least one edge.
///
/// # Examples
/// ```
/// use graphsplit_core::message_edge_count;
///
/// assert_eq!(message_edge_count(0.5, 78)?, 39);
/// assert_eq!(message_edge_count(0.8, 2)?, 1);
/// # Ok::<(), graphsplit_core::SplitError>(())
/// ```
pub fn message_edge_count(ratio: f64, train_edges: usize) -> Result<usize> {
    if train_edges < 2 {
        return Err(SplitError::InsufficientItems {
            items: train_edges,
            splits: 2,
            unit: "training edges",
        });
    }
    Ok(1 + floor_share(ratio, train_edges - 2))
}

/// Splits already-ordered training edges by the message ratio.
///
/// The leading edges become message edges.
///
/// # Errors
/// Propagates [`message_edge_count`] failures.
pub fn split_by_ratio(train: &[Edge], ratio: f64) -> Result<DisjointSplit> {
    let count = message_edge_count(ratio, train.len())?;
    let (message, supervision) = train.split_at(count);
    Ok(DisjointSplit {
        message: message.to_vec(),
        supervision: supervision.to_vec(),
    })
}

/// Uses caller-chosen message edges; the remaining training edges supervise.
///
/// Matching is a multiset difference. For undirected graphs either
/// orientation of a message edge matches.
///
/// # Errors
/// Returns [`SplitError::InvalidSplitConfiguration`] when a message edge is
/// not among the training edges.
///
/// # Examples
/// ```
/// use graphsplit_core::split_by_message_edges;
///
/// let split = split_by_message_edges(&[(0, 1), (1, 2), (2, 3)], &[(2, 1)], false)?;
/// assert_eq!(split.message, vec![(2, 1)]);
/// assert_eq!(split.supervision, vec![(0, 1), (2, 3)]);
/// # Ok::<(), graphsplit_core::SplitError>(())
/// ```
pub fn split_by_message_edges(
    train: &[Edge],
    message: &[Edge],
    directed: bool,
) -> Result<DisjointSplit> {
    let key = |(u, v): Edge| if directed || u <= v { (u, v) } else { (v, u) };
    let mut available: HashMap<Edge, usize> = HashMap::new();
    for &edge in train {
        *available.entry(key(edge)).or_default() += 1;
    }
    let mut claimed: HashMap<Edge, usize> = HashMap::new();
    for &edge in message {
        match available.get_mut(&key(edge)) {
            Some(count) if *count > 0 => {
                *count -= 1;
                *claimed.entry(key(edge)).or_default() += 1;
            }
            _ => {
                return Err(SplitError::invalid(format!(
                    "custom message edge ({}, {}) is not a training edge",
                    edge.0, edge.1
                )));
            }
        }
    }

    let supervision = train
        .iter()
        .copied()
        .filter(|&edge| match claimed.get_mut(&key(edge)) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .collect();
    Ok(DisjointSplit {
        message: message.to_vec(),
        supervision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::half(0.5, 78, 39)]
    #[case::default_ratio(0.8, 78, 61)]
    #[case::all_message(1.0, 10, 9)]
    #[case::no_message(0.0, 10, 1)]
    fn message_count_keeps_one_edge_per_side(
        #[case] ratio: f64,
        #[case] train: usize,
        #[case] expected: usize,
    ) {
        let count = message_edge_count(ratio, train).expect("enough edges");
        assert_eq!(count, expected);
        assert!(count >= 1 && count < train);
    }

    #[rstest]
    fn single_training_edge_cannot_be_split() {
        let err = message_edge_count(0.5, 1).expect_err("needs two edges");
        assert!(matches!(err, SplitError::InsufficientItems { items: 1, splits: 2, .. }));
    }

    #[rstest]
    fn ratio_split_takes_leading_edges() {
        let train = vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6)];
        let split = split_by_ratio(&train, 0.5).expect("enough edges");
        assert_eq!(split.message, vec![(0, 1), (1, 2), (2, 3)]);
        assert_eq!(split.supervision, vec![(3, 4), (4, 5), (5, 6)]);
    }

    #[rstest]
    fn directed_custom_edges_must_match_orientation() {
        let err = split_by_message_edges(&[(0, 1)], &[(1, 0)], true)
            .expect_err("reverse edge is not a training edge");
        assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
    }

    #[rstest]
    fn duplicate_edges_are_consumed_once_each() {
        let split = split_by_message_edges(&[(0, 1), (0, 1), (1, 2)], &[(0, 1)], true)
            .expect("subset of train");
        assert_eq!(split.supervision, vec![(0, 1), (1, 2)]);
        assert!(split_by_message_edges(&[(0, 1)], &[(0, 1), (0, 1)], true).is_err());
    }
}
