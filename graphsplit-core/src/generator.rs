//! On-demand graph production for generator-backed datasets.
//!
//! A [`Generator`] yields a fresh graph per call. [`EnsembleGenerator`]
//! delegates each call to one of its sources through a pluggable
//! [`SelectionPolicy`]; [`RandomGraphGenerator`] draws Erdős–Rényi style
//! graphs whose node counts come from its size tiers.

use std::{
    fmt,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use rand::{
    Rng, SeedableRng,
    distributions::{Distribution, WeightedIndex},
    rngs::SmallRng,
};

use crate::{
    error::GeneratorError,
    graph::{AnyGraph, Graph, Tensor},
};

/// Produces graphs on demand.
///
/// `generate` may be called any number of times; each call returns a newly
/// produced graph.
///
/// # Examples
/// ```
/// use graphsplit_core::{AnyGraph, Generator, GeneratorError, Graph};
///
/// struct Path;
///
/// impl Generator for Path {
///     fn name(&self) -> &str { "path" }
///     fn size_tiers(&self) -> &[usize] { &[4] }
///     fn generate(&self) -> Result<AnyGraph, GeneratorError> {
///         Ok(Graph::new(4, vec![(0, 1), (1, 2), (2, 3)], false)?.into())
///     }
/// }
///
/// let mut graphs = Path.graphs();
/// assert_eq!(graphs.next().transpose()?.map(|g| g.num_edges()), Some(3));
/// assert_eq!(Path.cycle_len(), 1);
/// # Ok::<(), GeneratorError>(())
/// ```
pub trait Generator: Send + Sync {
    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Produces one graph.
    ///
    /// # Errors
    /// Implementations return [`GeneratorError`] when a graph cannot be built.
    fn generate(&self) -> Result<AnyGraph, GeneratorError>;

    /// Node-count tiers the generator draws from, in ascending order.
    fn size_tiers(&self) -> &[usize];

    /// Number of graphs making up one pass over the generator.
    ///
    /// A dataset split drains one cycle. Defaults to one graph per size tier.
    fn cycle_len(&self) -> usize {
        self.size_tiers().len().max(1)
    }

    /// Infinite pull iterator over freshly generated graphs.
    fn graphs(&self) -> GeneratedGraphs<'_>
    where
        Self: Sized,
    {
        GeneratedGraphs::new(self)
    }
}

/// Infinite, non-restartable iterator returned by [`Generator::graphs`].
pub struct GeneratedGraphs<'g> {
    generator: &'g dyn Generator,
}

impl<'g> GeneratedGraphs<'g> {
    /// Wraps any generator, including trait objects.
    #[must_use]
    pub fn new(generator: &'g dyn Generator) -> Self {
        Self { generator }
    }
}

impl fmt::Debug for GeneratedGraphs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedGraphs")
            .field("generator", &self.generator.name())
            .finish()
    }
}

impl Iterator for GeneratedGraphs<'_> {
    type Item = Result<AnyGraph, GeneratorError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generator.generate())
    }
}

/// Chooses which ensemble source serves the next `generate` call.
pub trait SelectionPolicy: Send + Sync + fmt::Debug {
    /// Returns the index of the source to use, below `sources`.
    ///
    /// # Errors
    /// Returns [`GeneratorError::LockPoisoned`] when internal state is
    /// unavailable.
    fn select(&self, sources: usize) -> Result<usize, GeneratorError>;

    /// Number of sources the policy was configured for, if it is fixed.
    fn expected_sources(&self) -> Option<usize> {
        None
    }
}

/// Cycles through the sources in order.
#[derive(Debug, Default)]
pub struct RoundRobin {
    next: AtomicUsize,
}

impl SelectionPolicy for RoundRobin {
    fn select(&self, sources: usize) -> Result<usize, GeneratorError> {
        Ok(self.next.fetch_add(1, Ordering::Relaxed) % sources.max(1))
    }
}

/// Picks a source uniformly at random.
#[derive(Debug)]
pub struct Uniform {
    rng: Mutex<SmallRng>,
}

impl Uniform {
    /// Creates a uniform policy seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl SelectionPolicy for Uniform {
    fn select(&self, sources: usize) -> Result<usize, GeneratorError> {
        let mut rng = self.rng.lock().map_err(|_| GeneratorError::LockPoisoned {
            resource: "uniform selection rng",
        })?;
        Ok(rng.gen_range(0..sources.max(1)))
    }
}

/// Picks sources in proportion to fixed weights.
#[derive(Debug)]
pub struct Weighted {
    index: WeightedIndex<f64>,
    sources: usize,
    rng: Mutex<SmallRng>,
}

impl Weighted {
    /// Creates a weighted policy over one weight per source.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidWeights`] when the weights are empty,
    /// negative, non-finite, or all zero.
    pub fn new(weights: &[f64], seed: u64) -> Result<Self, GeneratorError> {
        if weights.iter().any(|weight| !weight.is_finite()) {
            return Err(GeneratorError::InvalidWeights {
                reason: "weights must be finite".into(),
            });
        }
        let index = WeightedIndex::new(weights).map_err(|err| GeneratorError::InvalidWeights {
            reason: err.to_string(),
        })?;
        Ok(Self {
            index,
            sources: weights.len(),
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        })
    }
}

impl SelectionPolicy for Weighted {
    fn select(&self, _sources: usize) -> Result<usize, GeneratorError> {
        let mut rng = self.rng.lock().map_err(|_| GeneratorError::LockPoisoned {
            resource: "weighted selection rng",
        })?;
        Ok(self.index.sample(&mut *rng))
    }

    fn expected_sources(&self) -> Option<usize> {
        Some(self.sources)
    }
}

/// Delegates each `generate` call to one of several generators.
///
/// # Examples
/// ```
/// use graphsplit_core::{EnsembleGenerator, Generator, RandomGraphGenerator};
///
/// let ensemble = EnsembleGenerator::new(vec![
///     Box::new(RandomGraphGenerator::new(vec![10, 20], 0.2, 1)?),
///     Box::new(RandomGraphGenerator::new(vec![20, 40], 0.1, 2)?),
/// ])?;
/// assert_eq!(ensemble.size_tiers(), &[10, 20, 40]);
/// assert_eq!(ensemble.cycle_len(), 4);
/// assert!(ensemble.generate()?.num_nodes() <= 20);
/// # Ok::<(), graphsplit_core::GeneratorError>(())
/// ```
pub struct EnsembleGenerator {
    sources: Vec<Box<dyn Generator>>,
    policy: Box<dyn SelectionPolicy>,
    tiers: Vec<usize>,
}

impl EnsembleGenerator {
    /// Creates a round-robin ensemble.
    ///
    /// # Errors
    /// Returns [`GeneratorError::EmptyEnsemble`] when `sources` is empty.
    pub fn new(sources: Vec<Box<dyn Generator>>) -> Result<Self, GeneratorError> {
        if sources.is_empty() {
            return Err(GeneratorError::EmptyEnsemble);
        }
        let mut tiers: Vec<usize> = sources
            .iter()
            .flat_map(|source| source.size_tiers().iter().copied())
            .collect();
        tiers.sort_unstable();
        tiers.dedup();
        Ok(Self {
            sources,
            policy: Box::new(RoundRobin::default()),
            tiers,
        })
    }

    /// Replaces the selection policy.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidWeights`] when the policy was
    /// configured for a different number of sources.
    pub fn with_policy(
        mut self,
        policy: impl SelectionPolicy + 'static,
    ) -> Result<Self, GeneratorError> {
        if let Some(expected) = policy.expected_sources() {
            if expected != self.sources.len() {
                return Err(GeneratorError::InvalidWeights {
                    reason: format!(
                        "policy expects {expected} sources but the ensemble has {}",
                        self.sources.len()
                    ),
                });
            }
        }
        self.policy = Box::new(policy);
        Ok(self)
    }

    /// Number of member generators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Always false; ensembles hold at least one source.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Debug for EnsembleGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|source| source.name()).collect();
        f.debug_struct("EnsembleGenerator")
            .field("sources", &names)
            .field("policy", &self.policy)
            .field("tiers", &self.tiers)
            .finish()
    }
}

impl Generator for EnsembleGenerator {
    fn name(&self) -> &str {
        "ensemble"
    }

    fn generate(&self) -> Result<AnyGraph, GeneratorError> {
        let index = self.policy.select(self.sources.len())?;
        let source = self
            .sources
            .get(index)
            .ok_or(GeneratorError::SourceOutOfRange {
                index,
                sources: self.sources.len(),
            })?;
        source.generate()
    }

    fn size_tiers(&self) -> &[usize] {
        &self.tiers
    }

    fn cycle_len(&self) -> usize {
        self.sources.iter().map(|source| source.cycle_len()).sum()
    }
}

/// Random homogeneous graphs: each node pair is linked with a fixed
/// probability, and the node count is drawn from the size tiers.
#[derive(Debug)]
pub struct RandomGraphGenerator {
    name: String,
    tiers: Vec<usize>,
    edge_probability: f64,
    directed: bool,
    node_features: usize,
    node_classes: usize,
    graph_classes: usize,
    cycle_len: Option<usize>,
    rng: Mutex<SmallRng>,
}

impl RandomGraphGenerator {
    /// Creates an undirected generator without attributes.
    ///
    /// # Errors
    /// Returns [`GeneratorError::InvalidParameters`] when `tiers` is empty or
    /// holds a zero, or when `edge_probability` lies outside `[0, 1]`.
    pub fn new(tiers: Vec<usize>, edge_probability: f64, seed: u64) -> Result<Self, GeneratorError> {
        if tiers.is_empty() || tiers.contains(&0) {
            return Err(GeneratorError::InvalidParameters {
                reason: "size tiers must be non-empty and positive".into(),
            });
        }
        if !(0.0..=1.0).contains(&edge_probability) {
            return Err(GeneratorError::InvalidParameters {
                reason: format!("edge probability must lie in [0, 1] (got {edge_probability})"),
            });
        }
        let mut tiers = tiers;
        tiers.sort_unstable();
        tiers.dedup();
        Ok(Self {
            name: "random".into(),
            tiers,
            edge_probability,
            directed: false,
            node_features: 0,
            node_classes: 0,
            graph_classes: 0,
            cycle_len: None,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        })
    }

    /// Overrides the generator name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Generates directed graphs.
    #[must_use]
    pub fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Attaches uniform `[0, 1)` node features of the given width.
    #[must_use]
    pub fn with_node_features(mut self, columns: usize) -> Self {
        self.node_features = columns;
        self
    }

    /// Attaches node class labels drawn from `classes` classes.
    #[must_use]
    pub fn with_node_classes(mut self, classes: usize) -> Self {
        self.node_classes = classes;
        self
    }

    /// Attaches a graph class label drawn from `classes` classes.
    #[must_use]
    pub fn with_graph_classes(mut self, classes: usize) -> Self {
        self.graph_classes = classes;
        self
    }

    /// Sets how many graphs one dataset split drains, overriding the
    /// one-per-tier default. Zero is treated as one.
    #[must_use]
    pub fn with_cycle_len(mut self, graphs: usize) -> Self {
        self.cycle_len = Some(graphs.max(1));
        self
    }

    fn draw(&self, rng: &mut SmallRng) -> Result<Graph, GeneratorError> {
        let nodes = self.tiers[rng.gen_range(0..self.tiers.len())];
        let mut edges = Vec::new();
        for u in 0..nodes {
            let first = if self.directed { 0 } else { u + 1 };
            for v in first..nodes {
                if u != v && rng.gen_bool(self.edge_probability) {
                    edges.push((u, v));
                }
            }
        }
        let mut graph = Graph::new(nodes, edges, self.directed)?;
        if self.node_features > 0 {
            let values = (0..nodes * self.node_features).map(|_| rng.r#gen::<f32>()).collect();
            graph = graph.with_node_feature(Tensor::new(vec![nodes, self.node_features], values)?)?;
        }
        if self.node_classes > 0 {
            let labels = (0..nodes)
                .map(|_| rng.gen_range(0..self.node_classes) as f32)
                .collect();
            graph = graph.with_node_label(Tensor::from_vec(labels))?;
        }
        if self.graph_classes > 0 {
            let label = rng.gen_range(0..self.graph_classes) as f32;
            graph = graph.with_graph_label(Tensor::from_vec(vec![label]));
        }
        Ok(graph)
    }
}

impl Generator for RandomGraphGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self) -> Result<AnyGraph, GeneratorError> {
        let mut rng = self.rng.lock().map_err(|_| GeneratorError::LockPoisoned {
            resource: "random graph generator rng",
        })?;
        Ok(self.draw(&mut rng)?.into())
    }

    fn size_tiers(&self) -> &[usize] {
        &self.tiers
    }

    fn cycle_len(&self) -> usize {
        self.cycle_len.unwrap_or(self.tiers.len())
    }
}
