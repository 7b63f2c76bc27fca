//! Per-type routing of node and edge partitions in heterogeneous graphs.
//!
//! Participating types are partitioned; every other type passes through
//! whole into each split. Allocation is either exact (the floor rule per
//! type) or approximate (the floor rule once over all participating items,
//! then apportioned across types).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use tracing::debug;

use crate::config::EdgeSplitMode;
use crate::error::{Result, SplitError};
use crate::partition::{partition, split_sizes_of};

/// Routes typed item lists into splits under one ratio vector.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use graphsplit_core::{EdgeSplitMode, TypedSplitRouter};
///
/// let router = TypedSplitRouter::new(&[0.8, 0.1, 0.1], EdgeSplitMode::Approximate);
/// let counts = BTreeMap::from([("a", 2_usize), ("b", 98)]);
/// let sizes = router.allocate(&counts, "edges")?;
/// let totals: Vec<usize> = (0..3).map(|i| sizes.values().map(|s| s[i]).sum()).collect();
/// assert_eq!(totals, vec![78, 10, 12]);
/// # Ok::<(), graphsplit_core::SplitError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TypedSplitRouter<'a> {
    ratios: &'a [f64],
    mode: EdgeSplitMode,
}

impl<'a> TypedSplitRouter<'a> {
    /// Creates a router for `ratios` using the given allocation mode.
    #[must_use]
    pub fn new(ratios: &'a [f64], mode: EdgeSplitMode) -> Self {
        Self { ratios, mode }
    }

    /// Number of output splits.
    #[must_use]
    pub fn splits(&self) -> usize {
        self.ratios.len()
    }

    /// Computes per-type split sizes for participating item counts.
    ///
    /// # Errors
    /// Returns [`SplitError::InsufficientItems`] when a type (exact mode) or
    /// the participating total (approximate mode) holds fewer items than
    /// splits.
    pub fn allocate<K: Clone + Ord>(
        &self,
        counts: &BTreeMap<K, usize>,
        unit: &'static str,
    ) -> Result<BTreeMap<K, Vec<usize>>> {
        match self.mode {
            EdgeSplitMode::Exact => counts
                .iter()
                .map(|(key, &count)| Ok((key.clone(), split_sizes_of(count, self.ratios, unit)?)))
                .collect(),
            EdgeSplitMode::Approximate => self.allocate_approximate(counts, unit),
        }
    }

    fn allocate_approximate<K: Clone + Ord>(
        &self,
        counts: &BTreeMap<K, usize>,
        unit: &'static str,
    ) -> Result<BTreeMap<K, Vec<usize>>> {
        let total: usize = counts.values().sum();
        let global = split_sizes_of(total, self.ratios, unit)?;
        let splits = global.len();
        let keys: Vec<&K> = counts.keys().collect();
        let capacity: Vec<usize> = counts.values().copied().collect();
        let mut assigned = vec![0_usize; keys.len()];
        let mut sizes = vec![Vec::with_capacity(splits); keys.len()];

        for &target in global.iter().take(splits - 1) {
            let mut shares = Vec::with_capacity(keys.len());
            let mut remainders = Vec::with_capacity(keys.len());
            for (slot, &count) in capacity.iter().enumerate() {
                let scaled = target as u128 * count as u128;
                let floor = (scaled / total as u128) as usize;
                shares.push(floor.min(count - assigned[slot]));
                remainders.push(scaled % total as u128);
            }
            let mut deficit = target - shares.iter().sum::<usize>();
            let mut order: Vec<usize> = (0..keys.len()).collect();
            order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
            while deficit > 0 {
                let mut placed = false;
                for &slot in &order {
                    if deficit == 0 {
                        break;
                    }
                    if assigned[slot] + shares[slot] < capacity[slot] {
                        shares[slot] += 1;
                        deficit -= 1;
                        placed = true;
                    }
                }
                if !placed {
                    break;
                }
            }
            for (slot, share) in shares.into_iter().enumerate() {
                assigned[slot] += share;
                sizes[slot].push(share);
            }
        }
        for (slot, list) in sizes.iter_mut().enumerate() {
            list.push(capacity[slot] - assigned[slot]);
        }
        Ok(keys.into_iter().cloned().zip(sizes).collect())
    }

    /// Partitions participating item lists and passes the rest through.
    ///
    /// Items are consumed in their given order. Every key of `items`
    /// appears in every output split.
    ///
    /// # Errors
    /// Propagates [`TypedSplitRouter::allocate`] failures.
    pub fn route<K, T>(
        &self,
        items: &BTreeMap<K, Vec<T>>,
        participants: &BTreeSet<K>,
        unit: &'static str,
    ) -> Result<Vec<BTreeMap<K, Vec<T>>>>
    where
        K: Clone + Display + Ord,
        T: Clone,
    {
        let counts: BTreeMap<K, usize> = items
            .iter()
            .filter(|(key, _)| participants.contains(*key))
            .map(|(key, list)| (key.clone(), list.len()))
            .collect();
        let sizes = self.allocate(&counts, unit)?;
        let mut out = vec![BTreeMap::new(); self.splits()];
        for (key, list) in items {
            match sizes.get(key) {
                Some(type_sizes) => {
                    debug!(key = %key, sizes = ?type_sizes, "allocated typed split");
                    for (split, chunk) in out.iter_mut().zip(partition(list, type_sizes)) {
                        split.insert(key.clone(), chunk);
                    }
                }
                None => {
                    for split in &mut out {
                        split.insert(key.clone(), list.clone());
                    }
                }
            }
        }
        Ok(out)
    }
}

/// Resolves the participating type keys.
///
/// With no selection every available key participates.
///
/// # Errors
/// Returns [`SplitError::InvalidSplitConfiguration`] when the selection names
/// a key the graph does not declare.
pub fn participating_types<'k, K>(
    available: impl IntoIterator<Item = &'k K>,
    selected: Option<&BTreeSet<K>>,
) -> Result<BTreeSet<K>>
where
    K: Clone + Display + Ord + 'k,
{
    let available: BTreeSet<K> = available.into_iter().cloned().collect();
    match selected {
        None => Ok(available),
        Some(selected) => {
            if let Some(unknown) = selected.iter().find(|key| !available.contains(*key)) {
                return Err(SplitError::invalid(format!(
                    "split type `{unknown}` is not present in the graph"
                )));
            }
            Ok(selected.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::suite_proptest_config;
    use proptest::prelude::*;
    use rstest::rstest;

    const DEFAULT: &[f64] = &[0.8, 0.1, 0.1];

    fn totals(sizes: &BTreeMap<&str, Vec<usize>>, splits: usize) -> Vec<usize> {
        (0..splits)
            .map(|split| sizes.values().map(|list| list[split]).sum())
            .collect()
    }

    #[rstest]
    fn exact_mode_applies_floor_rule_per_type() {
        let router = TypedSplitRouter::new(DEFAULT, EdgeSplitMode::Exact);
        let counts = BTreeMap::from([("a", 10_usize), ("b", 100)]);
        let sizes = router.allocate(&counts, "edges").expect("enough items");
        assert_eq!(sizes["a"], vec![6, 1, 3]);
        assert_eq!(sizes["b"], vec![78, 10, 12]);
    }

    #[rstest]
    fn exact_mode_rejects_small_types() {
        let router = TypedSplitRouter::new(DEFAULT, EdgeSplitMode::Exact);
        let counts = BTreeMap::from([("a", 2_usize), ("b", 100)]);
        let err = router.allocate(&counts, "edges").expect_err("type a is too small");
        assert!(matches!(err, SplitError::InsufficientItems { items: 2, .. }));
    }

    #[rstest]
    fn approximate_mode_matches_global_totals() {
        let router = TypedSplitRouter::new(DEFAULT, EdgeSplitMode::Approximate);
        let counts = BTreeMap::from([("a", 2_usize), ("b", 30), ("c", 68)]);
        let sizes = router.allocate(&counts, "edges").expect("enough items");
        assert_eq!(totals(&sizes, 3), vec![78, 10, 12]);
        for (key, list) in &sizes {
            assert_eq!(list.iter().sum::<usize>(), counts[key]);
        }
    }

    #[rstest]
    fn route_passes_excluded_types_through_whole() {
        let router = TypedSplitRouter::new(&[0.5, 0.5], EdgeSplitMode::Exact);
        let items = BTreeMap::from([("a", vec![1, 2, 3, 4]), ("b", vec![9, 8])]);
        let participants = BTreeSet::from(["a"]);
        let routed = router.route(&items, &participants, "nodes").expect("enough items");
        assert_eq!(routed[0]["a"], vec![1, 2]);
        assert_eq!(routed[1]["a"], vec![3, 4]);
        assert_eq!(routed[0]["b"], vec![9, 8]);
        assert_eq!(routed[1]["b"], vec![9, 8]);
    }

    #[rstest]
    fn unknown_split_types_are_rejected() {
        let available = ["a", "b"];
        let selected = BTreeSet::from(["c"]);
        let err = participating_types(available.iter(), Some(&selected)).expect_err("c is unknown");
        assert!(matches!(err, SplitError::InvalidSplitConfiguration { .. }));
        let all = participating_types(available.iter(), None).expect("no selection");
        assert_eq!(all, BTreeSet::from(["a", "b"]));
    }

    proptest! {
        #![proptest_config(suite_proptest_config(128))]

        #[test]
        fn approximate_allocation_conserves_items(
            counts in proptest::collection::vec(0_usize..200, 1..6),
        ) {
            let total: usize = counts.iter().sum();
            prop_assume!(total >= 3);
            let keyed: BTreeMap<usize, usize> = counts.iter().copied().enumerate().collect();
            let router = TypedSplitRouter::new(DEFAULT, EdgeSplitMode::Approximate);
            let sizes = router.allocate(&keyed, "edges").expect("enough items");
            let global = split_sizes_of(total, DEFAULT, "edges").expect("enough items");
            for split in 0..3 {
                let sum: usize = sizes.values().map(|list| list[split]).sum();
                prop_assert_eq!(sum, global[split]);
            }
            for (key, list) in &sizes {
                prop_assert_eq!(list.iter().sum::<usize>(), keyed[key]);
            }
        }
    }
}
