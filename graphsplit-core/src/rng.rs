//! Seed derivation and shuffling for reproducible splits.

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};

/// SplitMix64 increment (the 64-bit golden ratio) used for per-graph seed
/// derivation.
const GRAPH_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// Stream offsets keep shuffles and negative samples of one graph independent.
pub(crate) const SHUFFLE_STREAM: u64 = 0;
pub(crate) const NEGATIVE_STREAM: u64 = 1;
pub(crate) const GRAPH_ORDER_STREAM: u64 = 2;

#[inline]
pub(crate) fn mix_seed(base_seed: u64, position: usize, stream: u64) -> u64 {
    let lane = (position as u64 + 1).wrapping_mul(GRAPH_SEED_SPACING);
    splitmix64(splitmix64(base_seed ^ lane) ^ stream)
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(GRAPH_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Builds the RNG for one graph position and purpose.
pub(crate) fn stream_rng(base_seed: u64, position: usize, stream: u64) -> SmallRng {
    SmallRng::seed_from_u64(mix_seed(base_seed, position, stream))
}

/// Returns `items` permuted by `rng`, or unchanged when `shuffle` is false.
pub(crate) fn ordered<T: Clone>(items: &[T], shuffle: bool, rng: &mut SmallRng) -> Vec<T> {
    let mut out = items.to_vec();
    if shuffle {
        out.shuffle(rng);
    }
    out
}
