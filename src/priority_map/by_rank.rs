//! Positional views over a [`PriorityMap`].
//!
//! [`ByRank`] and [`ByRankMut`] address entries by rank rather than by key.
//! Mutation through the view keeps key map and order index in lockstep: a
//! ranged removal resolves both endpoints against the map as it stood before
//! any deletion, drains that slice in one pass, then retires the drained keys
//! from the key map.

use core::hash::Hash;
use core::ops::{Bound, RangeBounds};

use crate::error::{Error, Result};
use crate::order_statistic::Rank;

use super::PriorityMap;

impl<K, V> PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    /// Returns a read-only positional view of the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::{PriorityMap, Rank};
    ///
    /// let map = PriorityMap::from([("a", 3), ("b", 1), ("c", 2)]);
    /// assert_eq!(map.by_rank().get(Rank(0)), Ok(&"b"));
    /// assert_eq!(map.by_rank().keys_in(1..), Ok(vec![&"c", &"a"]));
    /// ```
    #[must_use]
    pub fn by_rank(&self) -> ByRank<'_, K, V> {
        ByRank { map: self }
    }

    /// Returns a positional view that can also remove entries by rank.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::{PriorityMap, Rank};
    ///
    /// let mut map = PriorityMap::from([("a", 3), ("b", 1), ("c", 2)]);
    /// assert_eq!(map.by_rank_mut().remove(Rank(0)), Ok(("b", 1)));
    /// assert_eq!(map.len(), 2);
    /// ```
    #[must_use]
    pub fn by_rank_mut(&mut self) -> ByRankMut<'_, K, V> {
        ByRankMut { map: self }
    }
}

/// Resolves arbitrary range bounds against a length, slice-style: the end
/// clamps to `len`, but an inverted range is an error.
fn resolve_range(range: impl RangeBounds<usize>, len: usize) -> Result<(usize, usize)> {
    // Saturating: an excluded usize::MAX start or included usize::MAX end
    // clamps to len below rather than overflowing.
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    if start > end {
        return Err(Error::InvalidArgument("range start exceeds range end"));
    }
    Ok((start.min(len), end.min(len)))
}

/// A read-only view of a [`PriorityMap`] addressed by rank.
///
/// Created by [`by_rank`](PriorityMap::by_rank).
#[derive(Clone, Copy, Debug)]
pub struct ByRank<'a, K, V> {
    map: &'a PriorityMap<K, V>,
}

impl<K, V> ByRank<'_, K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    /// Returns the number of entries in the underlying map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the underlying map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the key at `rank`, or [`Error::IndexOutOfRange`].
    pub fn get(&self, rank: Rank) -> Result<&K> {
        self.map
            .get_by_rank(rank)
            .map(|(key, _)| key)
            .ok_or(Error::IndexOutOfRange {
                rank: rank.0,
                len: self.map.len(),
            })
    }

    /// Returns the keys in the given rank range, in ascending priority
    /// order. The end of the range clamps to `len()`; an inverted range is
    /// [`Error::InvalidArgument`].
    pub fn keys_in(&self, range: impl RangeBounds<usize>) -> Result<Vec<&K>> {
        let (start, end) = resolve_range(range, self.map.len())?;
        Ok(self
            .map
            .iter()
            .skip(start)
            .take(end - start)
            .map(|(key, _)| key)
            .collect())
    }
}

/// A positional view of a [`PriorityMap`] that can remove entries by rank.
///
/// Created by [`by_rank_mut`](PriorityMap::by_rank_mut). Read methods match
/// [`ByRank`].
#[derive(Debug)]
pub struct ByRankMut<'a, K, V> {
    map: &'a mut PriorityMap<K, V>,
}

impl<K, V> ByRankMut<'_, K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    /// Returns the number of entries in the underlying map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the underlying map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the key at `rank`, or [`Error::IndexOutOfRange`].
    pub fn get(&self, rank: Rank) -> Result<&K> {
        self.map
            .get_by_rank(rank)
            .map(|(key, _)| key)
            .ok_or(Error::IndexOutOfRange {
                rank: rank.0,
                len: self.map.len(),
            })
    }

    /// Returns the keys in the given rank range; see [`ByRank::keys_in`].
    pub fn keys_in(&self, range: impl RangeBounds<usize>) -> Result<Vec<&K>> {
        let (start, end) = resolve_range(range, self.map.len())?;
        Ok(self
            .map
            .iter()
            .skip(start)
            .take(end - start)
            .map(|(key, _)| key)
            .collect())
    }

    /// Removes and returns the entry at `rank`, or
    /// [`Error::IndexOutOfRange`].
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, rank: Rank) -> Result<(K, V)> {
        let (value, key) = self.map.list.pop_at(rank.0).ok_or(Error::IndexOutOfRange {
            rank: rank.0,
            len: self.map.len(),
        })?;
        self.map.map.remove(&key);
        Ok((key, value))
    }

    /// Removes every entry in the given rank range, returning the removed
    /// `(key, priority)` pairs in ascending priority order.
    ///
    /// Both endpoints are resolved against the map before anything is
    /// deleted, so the range always means ranks as the caller observed them.
    /// The end clamps to `len()`; an inverted range is
    /// [`Error::InvalidArgument`] and removes nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let mut map = PriorityMap::from([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
    /// let removed = map.by_rank_mut().remove_range(1..3).unwrap();
    /// assert_eq!(removed, vec![("b", 2), ("c", 3)]);
    /// assert_eq!(map.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + removed)
    pub fn remove_range(&mut self, range: impl RangeBounds<usize>) -> Result<Vec<(K, V)>> {
        let (start, end) = resolve_range(range, self.map.len())?;
        let drained = self.map.list.drain_range(start, end);
        let mut removed = Vec::with_capacity(drained.len());
        for (value, key) in drained {
            self.map.map.remove(&key);
            removed.push((key, value));
        }
        Ok(removed)
    }
}
