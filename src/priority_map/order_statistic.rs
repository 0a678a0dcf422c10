//! Rank and bisection queries over the sorted order index.

use core::borrow::Borrow;
use core::hash::Hash;
use core::ops::Index;

use crate::error::{Error, Result};
use crate::order_statistic::Rank;

use super::PriorityMap;

impl<K, V> PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    /// Returns the rank of `key`: how many entries sort strictly before it.
    ///
    /// The entry with the lowest priority has rank 0. Errors with
    /// [`Error::KeyNotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let map = PriorityMap::from([("a", 10), ("b", 5), ("c", 7)]);
    /// assert_eq!(map.rank_of(&"b"), Ok(0));
    /// assert_eq!(map.rank_of(&"a"), Ok(2));
    /// assert!(map.rank_of(&"z").is_err());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn rank_of<Q>(&self, key: &Q) -> Result<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (key, value) = self.map.get_key_value(key).ok_or(Error::KeyNotFound)?;
        self.list
            .position_of(value, key)
            .ok_or(Error::KeyNotFound)
    }

    /// Returns the entry at the given rank, or `None` if `rank` is past the
    /// end.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::{PriorityMap, Rank};
    ///
    /// let map = PriorityMap::from([("a", 2), ("b", 1)]);
    /// assert_eq!(map.get_by_rank(Rank(0)), Some((&"b", &1)));
    /// assert_eq!(map.get_by_rank(Rank(2)), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_by_rank(&self, rank: Rank) -> Option<(&K, &V)> {
        self.list.get(rank.0).map(|(value, key)| (key, value))
    }

    /// Returns the rank of the first entry whose priority is `>= value`, or
    /// `len()` if every priority is smaller.
    ///
    /// Together with [`bisect_right`](PriorityMap::bisect_right) this brackets
    /// the run of entries holding `value`: the half-open rank range
    /// `bisect_left(v)..bisect_right(v)` covers exactly the entries with
    /// priority `v`.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let map = PriorityMap::from([("a", 1), ("b", 3), ("c", 3), ("d", 7)]);
    /// assert_eq!(map.bisect_left(&3), 1);
    /// assert_eq!(map.bisect_right(&3), 3);
    /// assert_eq!(map.bisect_left(&99), 4);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn bisect_left(&self, value: &V) -> usize {
        self.list.bisect_left(value)
    }

    /// Returns the rank of the first entry whose priority is `>= value`.
    /// Synonym for [`bisect_left`](PriorityMap::bisect_left).
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn bisect(&self, value: &V) -> usize {
        self.list.bisect_left(value)
    }

    /// Returns the rank of the first entry whose priority is `> value`, or
    /// `len()` if none is.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn bisect_right(&self, value: &V) -> usize {
        self.list.bisect_right(value)
    }

    /// Returns the rank of the first entry holding exactly `value`.
    ///
    /// Errors with [`Error::ValueNotFound`] if no entry holds that priority.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let map = PriorityMap::from([("a", 1), ("b", 3)]);
    /// assert_eq!(map.rank_of_value(&3), Ok(1));
    /// assert!(map.rank_of_value(&2).is_err());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn rank_of_value(&self, value: &V) -> Result<usize> {
        let rank = self.list.bisect_left(value);
        match self.list.get(rank) {
            Some((found, _)) if found == value => Ok(rank),
            _ => Err(Error::ValueNotFound),
        }
    }

    /// Gets an iterator over the entries in descending priority order.
    ///
    /// For counters this walks from the most common element down.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let counts = PriorityMap::from([("a", 5), ("b", 2), ("c", 9)]);
    /// let top: Vec<_> = counts.most_common().map(|(k, v)| (*k, *v)).collect();
    /// assert_eq!(top, [("c", 9), ("a", 5), ("b", 2)]);
    /// ```
    pub fn most_common(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter().rev()
    }

    /// Returns the `n` entries with the highest priorities, descending.
    /// Fewer than `n` are returned when the map is smaller.
    #[must_use]
    pub fn most_common_n(&self, n: usize) -> Vec<(K, V)> {
        self.most_common()
            .take(n)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K, V> PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
    usize: TryFrom<V>,
{
    /// Gets an iterator repeating each key as many times as its priority,
    /// in ascending priority order.
    ///
    /// Priorities that do not convert to a count (negative, fractional types
    /// aside) contribute zero repetitions.
    ///
    /// # Examples
    ///
    /// ```
    /// use priority_map::PriorityMap;
    ///
    /// let counts = PriorityMap::from([("a", 2), ("b", -1), ("c", 1)]);
    /// let elements: Vec<_> = counts.elements().copied().collect();
    /// assert_eq!(elements, ["c", "a", "a"]);
    /// ```
    pub fn elements(&self) -> impl Iterator<Item = &K> {
        self.iter().flat_map(|(key, value)| {
            let count = usize::try_from(value.clone()).unwrap_or(0);
            core::iter::repeat_n(key, count)
        })
    }
}

/// Indexes the map by rank, yielding the key at that rank.
///
/// # Panics
///
/// Panics if `rank` is out of range. For a fallible version see
/// [`get_by_rank`](PriorityMap::get_by_rank).
///
/// # Examples
///
/// ```
/// use priority_map::{PriorityMap, Rank};
///
/// let map = PriorityMap::from([("a", 2), ("b", 1)]);
/// assert_eq!(map[Rank(0)], "b");
/// assert_eq!(map[Rank(1)], "a");
/// ```
impl<K, V> Index<Rank> for PriorityMap<K, V>
where
    K: Hash + Eq + Ord + Clone,
    V: Ord + Clone,
{
    type Output = K;

    fn index(&self, rank: Rank) -> &K {
        let (key, _) = self
            .get_by_rank(rank)
            .expect("rank out of range");
        key
    }
}
