//! Bulk algebra over priority maps.
//!
//! Every merge is defined entrywise by a combining rule and executed by one
//! of two strategies: per-entry ordered updates against the existing order
//! index, or a full sorted rebuild once the burst is large enough that
//! resorting everything is cheaper than many ordered insertions. The
//! [`RebuildPolicy`] thresholds pick the strategy; results are identical
//! either way.

use core::hash::Hash;
use core::ops::Add;
use std::collections::hash_map;

use rustc_hash::FxHashMap;

use super::PriorityMap;

/// Cost model for bulk operations on a [`PriorityMap`].
///
/// A bulk operation touching `m` entries against a map of `n` entries either
/// performs `m` ordered updates (O(m log n)) or rebuilds the whole order
/// index from scratch (O(n log n)). The rebuild wins once `m` is a sizeable
/// fraction of `n`; these factors set where the crossover is assumed to be.
///
/// Merges rebuild when `m * merge_factor > n`; [`update`] rebuilds when
/// `m * replace_factor > n`. The larger `replace_factor` makes update rebuild
/// at smaller bursts: overwriting needs no per-entry combine, so its rebuild
/// pass is cheaper per unit and breaks even sooner.
///
/// The policy only selects a strategy. Any two policies produce identical
/// maps; they differ in how long getting there takes.
///
/// [`update`]: PriorityMap::update
///
/// # Examples
///
/// ```
/// use priority_map::{PriorityMap, RebuildPolicy};
///
/// // Force per-entry updates regardless of burst size.
/// let policy = RebuildPolicy { merge_factor: usize::MAX, replace_factor: usize::MAX };
/// let mut map: PriorityMap<&str, i64> = PriorityMap::with_policy(policy);
/// map.merge_sum(&PriorityMap::from([("a", 1)]));
/// assert_eq!(map.get(&"a"), Some(&1));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RebuildPolicy {
    /// A merge of `m` entries into a map of `n` rebuilds when
    /// `m * merge_factor > n`.
    pub merge_factor: usize,
    /// An update of `m` entries into a map of `n` rebuilds when
    /// `m * replace_factor > n`.
    pub replace_factor: usize,
}

impl Default for RebuildPolicy {
    fn default() -> Self {
        Self {
            merge_factor: 3,
            replace_factor: 10,
        }
    }
}

impl<K, V> PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    /// Adds each priority in `other` to the matching entry of self, treating
    /// absent keys as absent (not as zero): keys only in `other` are inserted
    /// with their priority as-is.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut a = PriorityMap::from([("x", 1), ("y", 2)]);
    /// let b = PriorityMap::from([("y", 10), ("z", 3)]);
    /// a.merge_sum(&b);
    /// assert_eq!(a.get(&"y"), Some(&12));
    /// assert_eq!(a.get(&"z"), Some(&3));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(m log n) or O((n + m) log(n + m)), whichever the
    /// [`RebuildPolicy`] predicts is cheaper.
    pub fn merge_sum(&mut self, other: &Self)
    where
        V: Add<Output = V>,
    {
        self.combine_from(&other.map, self.policy.merge_factor, |old, new| {
            Some(match old {
                Some(old) => old.clone() + new.clone(),
                None => new.clone(),
            })
        });
    }

    /// Subtracts each priority in `other` from the matching entry of self.
    ///
    /// Keys absent from self are ignored, so subtraction never manufactures
    /// entries. Priorities may go negative; see
    /// [`clean`](PriorityMap::clean) to drop them.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut a = PriorityMap::from([("x", 5)]);
    /// a.merge_difference(&PriorityMap::from([("x", 2), ("y", 9)]));
    /// assert_eq!(a.get(&"x"), Some(&3));
    /// assert_eq!(a.get(&"y"), None);
    /// ```
    pub fn merge_difference(&mut self, other: &Self)
    where
        V: core::ops::Sub<Output = V>,
    {
        self.combine_from(&other.map, self.policy.merge_factor, |old, new| {
            old.map(|old| old.clone() - new.clone())
        });
    }

    /// Keeps the larger priority for each key present in either map.
    pub fn merge_max(&mut self, other: &Self) {
        self.combine_from(&other.map, self.policy.merge_factor, |old, new| {
            Some(match old {
                Some(old) if old >= new => old.clone(),
                _ => new.clone(),
            })
        });
    }

    /// Keeps the smaller priority for each key present in both maps.
    ///
    /// Keys absent from self are skipped, intersection-style: an entry only
    /// in `other` is never adopted. Merging into an empty map therefore
    /// leaves it empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut a = PriorityMap::from([("x", 5), ("y", 1)]);
    /// a.merge_min(&PriorityMap::from([("x", 2), ("z", 9)]));
    /// assert_eq!(a.get(&"x"), Some(&2));
    /// assert_eq!(a.get(&"y"), Some(&1));
    /// assert_eq!(a.get(&"z"), None);
    /// ```
    pub fn merge_min(&mut self, other: &Self) {
        self.combine_from(&other.map, self.policy.merge_factor, |old, new| {
            old.map(|old| if old <= new { old.clone() } else { new.clone() })
        });
    }

    /// Returns a new map holding the entrywise sum of self and `other`,
    /// leaving both operands untouched.
    #[must_use]
    pub fn merged_sum(&self, other: &Self) -> Self
    where
        V: Add<Output = V>,
    {
        let mut result = self.clone();
        result.merge_sum(other);
        result
    }

    /// Returns a new map holding the entrywise difference of self and
    /// `other`.
    #[must_use]
    pub fn merged_difference(&self, other: &Self) -> Self
    where
        V: core::ops::Sub<Output = V>,
    {
        let mut result = self.clone();
        result.merge_difference(other);
        result
    }

    /// Returns a new map holding the entrywise maximum of self and `other`.
    #[must_use]
    pub fn merged_max(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.merge_max(other);
        result
    }

    /// Returns a new map keeping self's entries with shared keys lowered to
    /// the smaller of the two priorities; keys only in `other` do not appear.
    #[must_use]
    pub fn merged_min(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.merge_min(other);
        result
    }

    /// Inserts every pair, overwriting the priority of keys already present.
    ///
    /// Equivalent to calling [`insert`](PriorityMap::insert) per pair, but a
    /// large burst is absorbed by one sorted rebuild instead of many ordered
    /// insertions. Keys new to the map are inserted like any other pair.
    ///
    /// [`Extend`] routes here.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut map = PriorityMap::from([("a", 1)]);
    /// map.update([("a", 9), ("b", 2)]);
    /// assert_eq!(map.get(&"a"), Some(&9));
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn update(&mut self, pairs: impl IntoIterator<Item = (K, V)>) {
        let pairs: Vec<(K, V)> = pairs.into_iter().collect();
        if self.is_empty() {
            self.map = pairs.into_iter().collect();
            self.rebuild_list();
        } else if pairs.len().saturating_mul(self.policy.replace_factor) > self.len() {
            for (key, value) in pairs {
                self.map.insert(key, value);
            }
            self.rebuild_list();
        } else {
            for (key, value) in pairs {
                self.insert(key, value);
            }
        }
    }

    /// Shared engine behind the merges. `combine` maps (existing priority,
    /// incoming priority) to the resulting priority, or `None` to leave an
    /// absent key absent.
    fn combine_from<F>(&mut self, incoming: &FxHashMap<K, V>, factor: usize, combine: F)
    where
        F: Fn(Option<&V>, &V) -> Option<V>,
    {
        if self.is_empty() {
            // Nothing to combine against; adopt whatever the rule produces
            // from an empty left side.
            self.map = incoming
                .iter()
                .filter_map(|(key, new)| combine(None, new).map(|v| (key.clone(), v)))
                .collect();
            self.rebuild_list();
        } else if incoming.len().saturating_mul(factor) > self.len() {
            for (key, new) in incoming {
                let old = self.map.get(key);
                if let Some(value) = combine(old, new) {
                    self.map.insert(key.clone(), value);
                }
            }
            self.rebuild_list();
        } else {
            for (key, new) in incoming {
                let old = self.map.get(key).cloned();
                if let Some(value) = combine(old.as_ref(), new) {
                    self.insert(key.clone(), value);
                }
            }
        }
    }
}

impl<K, V> PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone + Add<Output = V> + From<u8>,
{
    /// Creates a `PriorityMap` counting the occurrences of each item.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let counts: PriorityMap<char, i64> =
    ///     PriorityMap::from_elements("mississippi".chars());
    /// assert_eq!(counts.get(&'s'), Some(&4));
    /// ```
    pub fn from_elements(items: impl IntoIterator<Item = K>) -> Self {
        let mut result = Self::new();
        result.tally(items);
        result
    }

    /// Counts each item, adding one to its priority per occurrence. Absent
    /// keys start from zero.
    ///
    /// The whole batch is counted in an auxiliary map first, then merged in
    /// one [`merge_sum`](PriorityMap::merge_sum)-style pass, so tallying a
    /// long stream costs one ordered update per distinct item rather than
    /// per occurrence.
    pub fn tally(&mut self, items: impl IntoIterator<Item = K>) {
        let counts = count_batch(items);
        self.combine_from(&counts, self.policy.merge_factor, |old, new| {
            Some(match old {
                Some(old) => old.clone() + new.clone(),
                None => new.clone(),
            })
        });
    }

    /// Subtracts one from the priority of each item per occurrence.
    ///
    /// Items absent from the map are ignored. Priorities may go negative;
    /// [`clean`](PriorityMap::clean) drops them.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut counts: PriorityMap<char, i64> =
    ///     PriorityMap::from_elements("aab".chars());
    /// counts.subtract("abc".chars());
    /// assert_eq!(counts.get(&'a'), Some(&1));
    /// assert_eq!(counts.get(&'b'), Some(&0));
    /// assert_eq!(counts.get(&'c'), None);
    /// ```
    pub fn subtract(&mut self, items: impl IntoIterator<Item = K>)
    where
        V: core::ops::Sub<Output = V>,
    {
        let counts = count_batch(items);
        self.combine_from(&counts, self.policy.merge_factor, |old, new| {
            old.map(|old| old.clone() - new.clone())
        });
    }
}

/// Counts a stream of items into a plain hash map, one unit per occurrence.
fn count_batch<K, V>(items: impl IntoIterator<Item = K>) -> FxHashMap<K, V>
where
    K: Hash + Eq,
    V: Clone + Add<Output = V> + From<u8>,
{
    let mut counts: FxHashMap<K, V> = FxHashMap::default();
    for item in items {
        let one = V::from(1u8);
        match counts.entry(item) {
            hash_map::Entry::Occupied(mut entry) => {
                let next = entry.get().clone() + one;
                entry.insert(next);
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(one);
            }
        }
    }
    counts
}
