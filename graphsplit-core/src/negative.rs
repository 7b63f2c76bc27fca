//! Negative edge sampling for link prediction targets.
//!
//! Negatives are drawn uniformly from endpoint pairs absent from the source
//! graph, without replacement and without cross-call state. Undirected graphs
//! receive single directed negatives; only positives are mirrored.

use std::collections::HashSet;

use rand::{Rng, rngs::SmallRng, seq::SliceRandom};
use tracing::{instrument, warn};

use crate::error::{Result, SplitError};
use crate::graph::{Edge, EdgeIndex};

/// Rejection draws allowed per requested negative before falling back.
const ATTEMPTS_PER_NEGATIVE: usize = 32;
/// Flat allowance added to the rejection budget for tiny requests.
const ATTEMPT_FLOOR: usize = 64;
/// Largest pair universe enumerated exhaustively once rejection stalls.
const ENUMERATION_LIMIT: usize = 1 << 22;

/// Number of negatives to draw for `positives` targets at `ratio`.
///
/// # Examples
/// ```
/// use graphsplit_core::negative_count;
///
/// assert_eq!(negative_count(1.0, 156), 156);
/// assert_eq!(negative_count(0.5, 5), 3);
/// ```
#[must_use]
pub fn negative_count(ratio: f64, positives: usize) -> usize {
    (ratio * positives as f64).round() as usize
}

/// The endpoint space negatives are drawn from and the pairs they must avoid.
#[derive(Clone, Debug)]
pub struct NegativeUniverse {
    sources: usize,
    destinations: usize,
    exclude_self_loops: bool,
    existing: HashSet<Edge>,
}

impl NegativeUniverse {
    /// Describes a universe of `sources × destinations` pairs minus `existing`.
    ///
    /// `existing` must list every orientation that counts as an edge; for
    /// undirected graphs pass the symmetrised edge index.
    #[must_use]
    pub fn new(
        sources: usize,
        destinations: usize,
        exclude_self_loops: bool,
        existing: impl IntoIterator<Item = Edge>,
    ) -> Self {
        Self {
            sources,
            destinations,
            exclude_self_loops,
            existing: existing.into_iter().collect(),
        }
    }

    /// Universe over `num_nodes` nodes excluding the pairs of `edge_index`
    /// and self-loops.
    #[must_use]
    pub fn over_nodes(num_nodes: usize, edge_index: &EdgeIndex) -> Self {
        Self::new(num_nodes, num_nodes, true, edge_index.pairs().iter().copied())
    }

    fn admits(&self, edge: Edge) -> bool {
        !(self.exclude_self_loops && edge.0 == edge.1) && !self.existing.contains(&edge)
    }

    fn total_pairs(&self) -> usize {
        let pairs = self.sources.saturating_mul(self.destinations);
        if self.exclude_self_loops {
            pairs - self.sources.min(self.destinations)
        } else {
            pairs
        }
    }

    /// Number of distinct pairs a negative may take.
    #[must_use]
    pub fn capacity(&self) -> usize {
        let blocked = self
            .existing
            .iter()
            .filter(|&&(u, v)| {
                u < self.sources && v < self.destinations && !(self.exclude_self_loops && u == v)
            })
            .count();
        self.total_pairs().saturating_sub(blocked)
    }
}

/// Draws `count` distinct non-edges from `universe`.
///
/// # Errors
/// Returns [`SplitError::SamplingExhausted`] when the universe holds fewer
/// than `count` non-edges, or when rejection sampling stalls on a universe
/// too large to enumerate.
///
/// # Examples
/// ```
/// use graphsplit_core::{EdgeIndex, NegativeUniverse, sample_negatives};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let universe = NegativeUniverse::over_nodes(4, &EdgeIndex::symmetrized(&[(0, 1)]));
/// let mut rng = SmallRng::seed_from_u64(3);
/// let negatives = sample_negatives(&universe, 5, &mut rng)?;
/// assert_eq!(negatives.len(), 5);
/// assert!(negatives.iter().all(|&(u, v)| u != v && (u, v) != (0, 1) && (u, v) != (1, 0)));
/// # Ok::<(), graphsplit_core::SplitError>(())
/// ```
#[instrument(name = "negative.sample", err, skip(universe, rng), fields(requested = count))]
pub fn sample_negatives(
    universe: &NegativeUniverse,
    count: usize,
    rng: &mut SmallRng,
) -> Result<Vec<Edge>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let available = universe.capacity();
    if available < count {
        return Err(SplitError::SamplingExhausted {
            requested: count,
            available,
        });
    }

    let mut chosen = HashSet::with_capacity(count);
    let mut negatives = Vec::with_capacity(count);
    let budget = count
        .saturating_mul(ATTEMPTS_PER_NEGATIVE)
        .saturating_add(ATTEMPT_FLOOR);
    let mut rejections = 0_usize;
    for _ in 0..budget {
        if negatives.len() == count {
            break;
        }
        let edge = (
            rng.gen_range(0..universe.sources),
            rng.gen_range(0..universe.destinations),
        );
        if universe.admits(edge) && chosen.insert(edge) {
            negatives.push(edge);
        } else {
            rejections += 1;
        }
    }
    record_rejections(rejections);

    if negatives.len() < count {
        fill_from_complement(universe, &mut chosen, &mut negatives, count, rng)?;
    }
    record_sampled(negatives.len());
    Ok(negatives)
}

fn fill_from_complement(
    universe: &NegativeUniverse,
    chosen: &mut HashSet<Edge>,
    negatives: &mut Vec<Edge>,
    count: usize,
    rng: &mut SmallRng,
) -> Result<()> {
    if universe.total_pairs() > ENUMERATION_LIMIT {
        return Err(SplitError::SamplingExhausted {
            requested: count,
            available: negatives.len(),
        });
    }
    warn!(
        found = negatives.len(),
        requested = count,
        "rejection sampling stalled, enumerating the non-edge complement"
    );
    let remaining: Vec<Edge> = (0..universe.sources)
        .flat_map(|u| (0..universe.destinations).map(move |v| (u, v)))
        .filter(|&edge| universe.admits(edge) && !chosen.contains(&edge))
        .collect();
    let missing = count - negatives.len();
    if remaining.len() < missing {
        return Err(SplitError::SamplingExhausted {
            requested: count,
            available: negatives.len() + remaining.len(),
        });
    }
    for &edge in remaining.choose_multiple(rng, missing) {
        chosen.insert(edge);
        negatives.push(edge);
    }
    Ok(())
}

#[cfg(feature = "metrics")]
fn record_rejections(rejections: usize) {
    metrics::counter!("graphsplit_negative_sampling_rejections").increment(rejections as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_rejections(_rejections: usize) {}

#[cfg(feature = "metrics")]
fn record_sampled(sampled: usize) {
    metrics::counter!("graphsplit_negative_edges_sampled").increment(sampled as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_sampled(_sampled: usize) {}
