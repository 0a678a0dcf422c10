use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::Hash;
use core::iter::FusedIterator;
use std::collections::hash_map;
use std::vec;

use rustc_hash::FxHashMap;

use crate::raw::{RawEntryList, RawIter, TieBreak};

mod by_rank;
mod merge;
mod order_statistic;

pub use by_rank::{ByRank, ByRankMut};
pub use merge::RebuildPolicy;

/// A map from keys to priorities that keeps its entries sorted by priority.
///
/// A `PriorityMap` behaves like a hash map for key-based access and like a
/// sorted sequence for everything else: iteration yields entries in ascending
/// priority order, and rank, bisection, and positional queries run in
/// O(log n). It doubles as a counter, with bulk algebraic merges
/// ([`merge_sum`], [`merge_max`], ...) that combine two maps entrywise.
///
/// [`merge_sum`]: PriorityMap::merge_sum
/// [`merge_max`]: PriorityMap::merge_max
///
/// Internally the map is a pair of structures kept in lockstep: a hash map
/// from key to priority, and an ordered list of `(priority, key)` entries.
/// Every mutating operation updates both before returning, so the two can
/// never be observed out of sync. A priority change is never an in-place
/// overwrite of the ordered side; the old entry is removed and the new one
/// inserted at its sorted position.
///
/// Keys break ties between equal priorities, so iteration order is fully
/// deterministic (see [`with_comparable_keys`](PriorityMap::with_comparable_keys)
/// for the alternative). Because entries live in both structures, `K` and `V`
/// must both be `Clone`.
///
/// There is deliberately no `get_mut` or `values_mut`: handing out a mutable
/// priority would let callers bypass reordering. Change a priority with
/// [`insert`](PriorityMap::insert) or one of the merge operations.
///
/// # Examples
///
/// ```
/// use priority_map::PriorityMap;
///
/// let mut tasks = PriorityMap::new();
/// tasks.insert("compact", 3);
/// tasks.insert("flush", 1);
/// tasks.insert("snapshot", 2);
///
/// // Key-based access is a plain hash lookup.
/// assert_eq!(tasks.get(&"flush"), Some(&1));
///
/// // Iteration is in ascending priority order.
/// let order: Vec<_> = tasks.keys().copied().collect();
/// assert_eq!(order, ["flush", "snapshot", "compact"]);
///
/// // Order statistics are logarithmic.
/// assert_eq!(tasks.rank_of(&"snapshot"), Ok(1));
/// assert_eq!(tasks.pop_highest(), Some(("compact", 3)));
/// ```
///
/// Counting use, in the style of a multiset:
///
/// ```
/// use priority_map::PriorityMap;
///
/// let mut counts: PriorityMap<char, i64> = PriorityMap::new();
/// counts.tally("abracadabra".chars());
/// assert_eq!(counts.get(&'a'), Some(&5));
/// assert_eq!(counts.most_common_n(1), vec![('a', 5)]);
/// ```
pub struct PriorityMap<K, V> {
    /// Authoritative key -> priority association.
    map: FxHashMap<K, V>,
    /// `(priority, key)` entries in sorted order.
    list: RawEntryList<K, V>,
    policy: RebuildPolicy,
}

impl<K, V> PriorityMap<K, V> {
    /// Makes a new, empty `PriorityMap` with key tie-breaking and the default
    /// [`RebuildPolicy`].
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut map = PriorityMap::new();
    /// map.insert("a", 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparable_keys(true)
    }

    /// Makes a new, empty `PriorityMap`, choosing how equal priorities are
    /// ordered.
    ///
    /// With `comparable` set (the default), entries are ordered by
    /// `(priority, key)`: ties are deterministic and every ordered-side
    /// operation is a pure binary search. When unset, entries are ordered by
    /// priority alone: new entries land after existing equal-priority ones,
    /// comparisons never touch the key, and removals scan the equal-priority
    /// run for the matching key. The second mode trades deterministic tie
    /// order for cheaper comparisons when priorities rarely collide.
    #[must_use]
    pub fn with_comparable_keys(comparable: bool) -> Self {
        let tie_break = if comparable {
            TieBreak::Key
        } else {
            TieBreak::Priority
        };
        Self {
            map: FxHashMap::default(),
            list: RawEntryList::new(tie_break),
            policy: RebuildPolicy::default(),
        }
    }

    /// Makes a new, empty `PriorityMap` with a custom bulk-merge cost model.
    #[must_use]
    pub fn with_policy(policy: RebuildPolicy) -> Self {
        Self {
            policy,
            ..Self::new()
        }
    }

    /// Returns the bulk-merge cost model in effect.
    #[must_use]
    pub const fn policy(&self) -> RebuildPolicy {
        self.policy
    }

    /// Replaces the bulk-merge cost model. Takes effect on the next bulk
    /// operation; never changes results, only which strategy computes them.
    pub fn set_policy(&mut self, policy: RebuildPolicy) {
        self.policy = policy;
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all entries from the map.
    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
    }

    /// Gets an iterator over the entries, in ascending priority order.
    ///
    /// Equal priorities iterate in ascending key order. Reversing the
    /// iterator yields descending priority order.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let map = PriorityMap::from([("c", 1), ("a", 3), ("b", 2)]);
    /// let entries: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    /// assert_eq!(entries, [("c", 1), ("b", 2), ("a", 3)]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) to create; O(1) per step.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.list.iter(),
            remaining: self.list.len(),
        }
    }

    /// Gets an iterator over the keys, in ascending priority order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the priorities, in ascending order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Asserts the two-structure invariants: both sides hold the same entry
    /// set and the ordered side is sorted. Test harness hook.
    #[doc(hidden)]
    pub fn check_invariants(&self)
    where
        K: Hash + Eq + Ord,
        V: Ord,
    {
        self.list.check();
        assert_eq!(self.map.len(), self.list.len());
        for (value, key) in self.list.iter() {
            assert!(
                self.map.get(key).is_some_and(|v| v == value),
                "order index entry missing from key map"
            );
        }
    }
}

impl<K, V> PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    /// Creates a `PriorityMap` from `(key, priority)` pairs. If a key occurs
    /// more than once, the last occurrence wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let map = PriorityMap::from_pairs([("a", 1), ("b", 2), ("a", 3)]);
    /// assert_eq!(map.get(&"a"), Some(&3));
    /// assert_eq!(map.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n) — one bulk sorted build.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut result = Self::new();
        result.map = pairs.into_iter().collect();
        result.rebuild_list();
        result
    }

    /// Creates a `PriorityMap` with every key from `keys` mapped to `value`.
    pub fn from_keys(keys: impl IntoIterator<Item = K>, value: V) -> Self {
        Self::from_pairs(keys.into_iter().map(|key| (key, value.clone())))
    }

    /// Returns a reference to the priority of `key`, if present.
    ///
    /// The key may be any borrowed form of the map's key type.
    ///
    /// # Complexity
    ///
    /// O(1) amortized.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Inserts a key with the given priority.
    ///
    /// If the key was already present its priority is replaced and the old
    /// priority returned; the entry moves to the sorted position of its new
    /// priority.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut map = PriorityMap::new();
    /// assert_eq!(map.insert("a", 1), None);
    /// assert_eq!(map.insert("a", 5), Some(1));
    /// assert_eq!(map.get(&"a"), Some(&5));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let old = self.map.insert(key.clone(), value.clone());
        if let Some(old) = &old {
            let removed = self.list.remove(old, &key);
            debug_assert!(removed, "order index out of sync with key map");
        }
        self.list.add((value, key));
        old
    }

    /// Removes a key, returning its priority if it was present.
    ///
    /// `None` distinguishes "absent" from "present with a zero priority".
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut map = PriorityMap::from([("a", 1)]);
    /// assert_eq!(map.remove(&"a"), Some(1));
    /// assert_eq!(map.remove(&"a"), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key, returning the stored key and priority if present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (key, value) = self.map.remove_entry(key)?;
        let removed = self.list.remove(&value, &key);
        debug_assert!(removed, "order index out of sync with key map");
        Some((key, value))
    }

    /// Returns the priority of `key`, inserting it with `default` first if
    /// absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut map = PriorityMap::from([("a", 3)]);
    /// assert_eq!(map.get_or_insert("a", 0), &3);
    /// assert_eq!(map.get_or_insert("b", 7), &7);
    /// assert_eq!(map.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) on first access, O(1) amortized afterwards.
    pub fn get_or_insert(&mut self, key: K, default: V) -> &V {
        match self.map.entry(key) {
            hash_map::Entry::Occupied(entry) => entry.into_mut(),
            hash_map::Entry::Vacant(entry) => {
                self.list.add((default.clone(), entry.key().clone()));
                entry.insert(default)
            }
        }
    }

    /// Removes and returns the entry with the lowest priority.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_lowest(&mut self) -> Option<(K, V)> {
        let (value, key) = self.list.pop_at(0)?;
        self.map.remove(&key);
        Some((key, value))
    }

    /// Removes and returns the entry with the highest priority.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut map = PriorityMap::from([("a", 1), ("b", 2)]);
    /// assert_eq!(map.pop_highest(), Some(("b", 2)));
    /// assert_eq!(map.pop_highest(), Some(("a", 1)));
    /// assert_eq!(map.pop_highest(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_highest(&mut self) -> Option<(K, V)> {
        let len = self.list.len();
        if len == 0 {
            return None;
        }
        let (value, key) = self.list.pop_at(len - 1)?;
        self.map.remove(&key);
        Some((key, value))
    }

    /// Removes every entry whose priority is `<= threshold`, returning how
    /// many were removed.
    ///
    /// The cut position is found by bisection and the entries removed in one
    /// bulk slice, so the cost is O(log n + removed) rather than one ordered
    /// deletion per entry. Calling `clean` twice with the same threshold is a
    /// no-op the second time.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut counts = PriorityMap::from([("a", 2), ("b", 0), ("c", -1)]);
    /// assert_eq!(counts.clean(&0), 2);
    /// assert_eq!(counts.len(), 1);
    /// assert_eq!(counts.clean(&0), 0);
    /// ```
    pub fn clean(&mut self, threshold: &V) -> usize {
        let cut = self.list.bisect_right(threshold);
        let removed = self.list.drain_range(0, cut);
        for (_, key) in &removed {
            self.map.remove(key);
        }
        removed.len()
    }

    /// Returns `true` if no key of `other` is also a key of self.
    ///
    /// Only keys matter; an entry with a zero or negative priority still
    /// counts as present. To drop such entries first, see
    /// [`clean`](PriorityMap::clean).
    pub fn is_disjoint(&self, other: &Self) -> bool {
        if self.len() > other.len() {
            return other.is_disjoint(self);
        }
        self.map.keys().all(|key| !other.map.contains_key(key))
    }

    /// True when every entry of self appears in `other` with a priority at
    /// least as large. The comparison operators build on this.
    fn dominated_by(&self, other: &Self) -> bool {
        self.map.len() <= other.map.len()
            && self
                .map
                .iter()
                .all(|(key, value)| other.map.get(key).is_some_and(|w| value <= w))
    }

    /// Rebuilds the ordered side from the key map in one bulk sorted build.
    fn rebuild_list(&mut self) {
        let entries: Vec<(V, K)> = self
            .map
            .iter()
            .map(|(key, value)| (value.clone(), key.clone()))
            .collect();
        self.list.rebuild(entries);
    }
}

impl<K, V> Default for PriorityMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for PriorityMap<K, V> {
    /// Cloning produces fully independent structures; mutating either map
    /// never affects the other.
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            list: self.list.clone(),
            policy: self.policy,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PriorityMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.list.iter().map(|(value, key)| (key, value)))
            .finish()
    }
}

/// Mapping equality: same keys, same priorities. The tie-break mode and the
/// cost model do not participate.
impl<K: Hash + Eq, V: PartialEq> PartialEq for PriorityMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<K: Hash + Eq, V: Eq> Eq for PriorityMap<K, V> {}

/// The domination partial order.
///
/// `self <= other` holds when every key of self appears in `other` with a
/// priority at least as large, and self has no more keys than `other`. Two
/// maps that each hold a key the other lacks are incomparable and
/// `partial_cmp` returns `None`.
///
/// # Examples
///
/// ```
/// use priority_map::PriorityMap;
///
/// let small = PriorityMap::from([("a", 1)]);
/// let big = PriorityMap::from([("a", 2), ("b", 1)]);
/// assert!(small < big);
///
/// let other = PriorityMap::from([("c", 9)]);
/// assert_eq!(small.partial_cmp(&other), None);
/// ```
impl<K, V> PartialOrd for PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.dominated_by(other), other.dominated_by(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let map = PriorityMap::from([("a", 1), ("b", 2)]);
    /// assert_eq!(map.len(), 2);
    /// ```
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_pairs(pairs)
    }
}

impl<K, V> Extend<(K, V)> for PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    /// Extends with dict semantics: existing keys are overwritten. Routes
    /// through the adaptive [`update`](PriorityMap::update) path.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.update(iter);
    }
}

impl<'a, K, V> IntoIterator for &'a PriorityMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        Iter {
            inner: self.list.iter(),
            remaining: self.list.len(),
        }
    }
}

impl<K, V> IntoIterator for PriorityMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Consumes the map, yielding `(key, priority)` pairs in ascending
    /// priority order.
    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.list.into_entries().into_iter(),
        }
    }
}

/// An iterator over the entries of a `PriorityMap` in ascending priority
/// order.
///
/// Created by [`iter`](PriorityMap::iter).
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    inner: RawIter<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (value, key) = self.inner.next()?;
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (value, key) = self.inner.next_back()?;
        self.remaining -= 1;
        Some((key, value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the keys of a `PriorityMap` in ascending priority order.
///
/// Created by [`keys`](PriorityMap::keys).
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An iterator over the priorities of a `PriorityMap` in ascending order.
///
/// Created by [`values`](PriorityMap::values).
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// An owning iterator over the entries of a `PriorityMap` in ascending
/// priority order.
///
/// Created by the [`IntoIterator`] impl.
pub struct IntoIter<K, V> {
    inner: vec::IntoIter<(V, K)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(value, key)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(value, key)| (key, value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice().iter().map(|(v, k)| (k, v))).finish()
    }
}
