//! Ratio-to-count arithmetic under the minimum-one-per-split rule.
//!
//! Every split first receives one item; the remaining `n - k` items are
//! apportioned by flooring `ratio * (n - k)` for all but the last split, which
//! absorbs the remainder. Sizes never depend on randomness.

use crate::error::{Result, SplitError};

/// Computes per-split sizes for `items` items under `ratios`.
///
/// The ratios are assumed validated (see [`crate::validate_ratios`]).
///
/// # Errors
/// Returns [`SplitError::InsufficientItems`] when `items < ratios.len()`.
///
/// # Examples
/// ```
/// use graphsplit_core::split_sizes;
///
/// assert_eq!(split_sizes(100, &[0.8, 0.1, 0.1])?, vec![78, 10, 12]);
/// assert_eq!(split_sizes(3, &[0.8, 0.1, 0.1])?, vec![1, 1, 1]);
/// assert!(split_sizes(2, &[0.8, 0.1, 0.1]).is_err());
/// # Ok::<(), graphsplit_core::SplitError>(())
/// ```
pub fn split_sizes(items: usize, ratios: &[f64]) -> Result<Vec<usize>> {
    split_sizes_of(items, ratios, "items")
}

pub(crate) fn split_sizes_of(items: usize, ratios: &[f64], unit: &'static str) -> Result<Vec<usize>> {
    let splits = ratios.len();
    if splits == 0 || items < splits {
        return Err(SplitError::InsufficientItems {
            items,
            splits,
            unit,
        });
    }
    let reduced = items - splits;
    let mut remaining = reduced;
    let mut sizes = Vec::with_capacity(splits);
    for &ratio in ratios.iter().take(splits - 1) {
        let share = floor_share(ratio, reduced).min(remaining);
        remaining -= share;
        sizes.push(1 + share);
    }
    let assigned: usize = sizes.iter().sum();
    sizes.push(items - assigned);
    Ok(sizes)
}

/// `floor(ratio * count)`, computed in `f64`.
pub(crate) fn floor_share(ratio: f64, count: usize) -> usize {
    (ratio * count as f64).floor() as usize
}

/// Cuts `items` into consecutive chunks of the given sizes.
///
/// Sizes are expected to sum to `items.len()`; surplus items are dropped and
/// missing items shorten the trailing chunks.
pub(crate) fn partition<T: Clone>(items: &[T], sizes: &[usize]) -> Vec<Vec<T>> {
    let mut offset = 0;
    sizes
        .iter()
        .map(|&size| {
            let start = offset.min(items.len());
            let end = (offset + size).min(items.len());
            offset += size;
            items.get(start..end).map(<[T]>::to_vec).unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::suite_proptest_config;
    use proptest::prelude::*;
    use rstest::rstest;
    use test_strategy::Arbitrary;

    #[derive(Clone, Copy, Debug, Arbitrary)]
    enum RatioProfile {
        Default,
        Balanced,
        TrainHeavy,
        TwoWay,
        EmptyLast,
    }

    impl RatioProfile {
        fn ratios(self) -> &'static [f64] {
            match self {
                Self::Default => &[0.8, 0.1, 0.1],
                Self::Balanced => &[0.3, 0.3, 0.4],
                Self::TrainHeavy => &[0.98, 0.01, 0.01],
                Self::TwoWay => &[0.7, 0.3],
                Self::EmptyLast => &[0.5, 0.5, 0.0],
            }
        }
    }

    #[rstest]
    #[case::hundred_edges(100, &[0.8, 0.1, 0.1], vec![78, 10, 12])]
    #[case::minimum(3, &[0.8, 0.1, 0.1], vec![1, 1, 1])]
    #[case::two_way(10, &[0.7, 0.3], vec![6, 4])]
    #[case::thirds(13, &[0.3, 0.3, 0.4], vec![4, 4, 5])]
    fn sizes_follow_floor_rule(
        #[case] items: usize,
        #[case] ratios: &[f64],
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(split_sizes(items, ratios).expect("enough items"), expected);
    }

    #[rstest]
    #[case::empty(0, &[0.5, 0.5])]
    #[case::one_short(2, &[0.8, 0.1, 0.1])]
    fn too_few_items_fail(#[case] items: usize, #[case] ratios: &[f64]) {
        let err = split_sizes(items, ratios).expect_err("must fail");
        assert_eq!(
            err,
            SplitError::InsufficientItems {
                items,
                splits: ratios.len(),
                unit: "items"
            }
        );
    }

    #[rstest]
    fn partition_preserves_order() {
        let chunks = partition(&[1, 2, 3, 4, 5], &[2, 1, 2]);
        assert_eq!(chunks, vec![vec![1, 2], vec![3], vec![4, 5]]);
    }

    proptest! {
        #![proptest_config(suite_proptest_config(256))]

        #[test]
        fn sizes_conserve_items_and_stay_positive(
            items in 3_usize..5_000,
            profile in any::<RatioProfile>(),
        ) {
            let ratios = profile.ratios();
            let sizes = split_sizes(items, ratios).expect("enough items");
            prop_assert_eq!(sizes.len(), ratios.len());
            prop_assert_eq!(sizes.iter().sum::<usize>(), items);
            prop_assert!(sizes.iter().all(|&size| size >= 1));
        }
    }
}
