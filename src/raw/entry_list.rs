use core::cmp::Ordering;
use core::iter::Flatten;
use core::slice;

/// Target sublist length. Sublists split when they exceed `2 * LOAD` and merge
/// into a neighbor when they shrink below `LOAD / 2`.
const LOAD: usize = 128;

/// How entries with equal priorities are ordered relative to each other.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TieBreak {
    /// Order equal-priority entries by key. Deterministic, and lets removals
    /// and rank queries use pure binary search.
    Key,
    /// Order by priority alone; new entries land at the right edge of an
    /// equal-priority run and removals scan that run for the matching key.
    Priority,
}

/// Fenwick tree over sublist lengths, kept current on every mutation so that
/// positional queries stay logarithmic without a staleness protocol.
///
/// `tree` is 1-based; `tree.len() - 1` is the number of sublists. Structural
/// changes (split, merge, sublist removal) rebuild it outright, which is fine
/// because those happen at most once per `LOAD / 2` element mutations.
#[derive(Clone, Debug, Default)]
struct PositionIndex {
    tree: Vec<usize>,
}

impl PositionIndex {
    fn build(lens: impl ExactSizeIterator<Item = usize>) -> Self {
        let n = lens.len();
        let mut tree = vec![0usize; n + 1];
        for (i, len) in lens.enumerate() {
            tree[i + 1] = len;
        }
        for i in 1..=n {
            let parent = i + (i & i.wrapping_neg());
            if parent <= n {
                tree[parent] += tree[i];
            }
        }
        Self { tree }
    }

    /// Adds one to the length of sublist `i` (0-based).
    fn inc(&mut self, i: usize) {
        let mut i = i + 1;
        while i < self.tree.len() {
            self.tree[i] += 1;
            i += i & i.wrapping_neg();
        }
    }

    /// Subtracts one from the length of sublist `i` (0-based).
    fn dec(&mut self, i: usize) {
        let mut i = i + 1;
        while i < self.tree.len() {
            self.tree[i] -= 1;
            i += i & i.wrapping_neg();
        }
    }

    /// Total length of the first `i` sublists.
    fn prefix(&self, mut i: usize) -> usize {
        let mut total = 0;
        while i > 0 {
            total += self.tree[i];
            i &= i - 1;
        }
        total
    }

    /// Maps a global position to `(sublist, offset)`.
    ///
    /// The caller guarantees `pos` is within total bounds; sublists are never
    /// empty, so the returned offset indexes into the returned sublist.
    fn locate(&self, mut pos: usize) -> (usize, usize) {
        let n = self.tree.len() - 1;
        let mut idx = 0;
        let mut bit = n.next_power_of_two();
        if bit > n {
            bit >>= 1;
        }
        while bit > 0 {
            let next = idx + bit;
            if next <= n && self.tree[next] <= pos {
                pos -= self.tree[next];
                idx = next;
            }
            bit >>= 1;
        }
        (idx, pos)
    }
}

/// The balanced sorted-sequence primitive backing `PriorityMap`.
///
/// Stores `(priority, key)` entries in sorted order as a two-level list of
/// lists, with a [`PositionIndex`] over sublist lengths for O(log n)
/// positional access.
#[derive(Clone, Debug)]
pub(crate) struct RawEntryList<K, V> {
    lists: Vec<Vec<(V, K)>>,
    pos_index: PositionIndex,
    len: usize,
    tie_break: TieBreak,
}

/// Iterator over entries in ascending `(priority, key)` order.
pub(crate) type RawIter<'a, K, V> = Flatten<slice::Iter<'a, Vec<(V, K)>>>;

impl<K, V> RawEntryList<K, V> {
    pub(crate) fn new(tie_break: TieBreak) -> Self {
        Self {
            lists: Vec::new(),
            pos_index: PositionIndex::default(),
            len: 0,
            tie_break,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.lists.clear();
        self.pos_index = PositionIndex::default();
        self.len = 0;
    }

    pub(crate) fn iter(&self) -> RawIter<'_, K, V> {
        self.lists.iter().flatten()
    }

    /// Consumes the list, returning its entries in sorted order.
    pub(crate) fn into_entries(self) -> Vec<(V, K)> {
        let mut entries = Vec::with_capacity(self.len);
        for sub in self.lists {
            entries.extend(sub);
        }
        entries
    }

    fn reindex(&mut self) {
        self.pos_index = PositionIndex::build(self.lists.iter().map(Vec::len));
    }

    pub(crate) fn get(&self, pos: usize) -> Option<&(V, K)> {
        if pos >= self.len {
            return None;
        }
        let (outer, inner) = self.pos_index.locate(pos);
        Some(&self.lists[outer][inner])
    }

    pub(crate) fn pop_at(&mut self, pos: usize) -> Option<(V, K)> {
        if pos >= self.len {
            return None;
        }
        let (outer, inner) = self.pos_index.locate(pos);
        Some(self.remove_at(outer, inner))
    }

    fn remove_at(&mut self, outer: usize, inner: usize) -> (V, K) {
        let entry = self.lists[outer].remove(inner);
        self.len -= 1;
        if self.lists[outer].is_empty() {
            self.lists.remove(outer);
            self.reindex();
        } else if self.lists[outer].len() < LOAD / 2 && self.lists.len() > 1 {
            self.balance(outer);
            self.reindex();
        } else {
            self.pos_index.dec(outer);
        }
        entry
    }

    /// Merges an undersized sublist into a neighbor, resplitting if the result
    /// is oversized. The caller guarantees at least two sublists exist.
    fn balance(&mut self, outer: usize) {
        let dst = if outer > 0 { outer - 1 } else { outer };
        let tail = self.lists.remove(dst + 1);
        self.lists[dst].extend(tail);
        if self.lists[dst].len() > 2 * LOAD {
            let half = self.lists[dst].len() / 2;
            let tail = self.lists[dst].split_off(half);
            self.lists.insert(dst + 1, tail);
        }
    }

    /// Removes and returns the entries at positions `start..end` in one pass.
    pub(crate) fn drain_range(&mut self, start: usize, end: usize) -> Vec<(V, K)> {
        debug_assert!(start <= end && end <= self.len);
        if start == end {
            return Vec::new();
        }
        let mut removed = Vec::with_capacity(end - start);
        let (mut outer, mut at) = self.pos_index.locate(start);
        let mut remaining = end - start;
        while remaining > 0 {
            let sub_len = self.lists[outer].len();
            if at == 0 && remaining >= sub_len {
                removed.extend(self.lists.remove(outer));
                remaining -= sub_len;
            } else {
                let take = remaining.min(sub_len - at);
                removed.extend(self.lists[outer].drain(at..at + take));
                remaining -= take;
                outer += 1;
                at = 0;
            }
        }
        self.len -= removed.len();
        self.normalize();
        removed
    }

    /// Drops empty sublists and merges undersized ones after a bulk edit.
    fn normalize(&mut self) {
        let mut i = 0;
        while i < self.lists.len() {
            if self.lists[i].is_empty() {
                self.lists.remove(i);
                continue;
            }
            if self.lists[i].len() < LOAD / 2 && self.lists.len() > 1 {
                let dst = if i + 1 < self.lists.len() { i } else { i - 1 };
                let tail = self.lists.remove(dst + 1);
                self.lists[dst].extend(tail);
                if self.lists[dst].len() > 2 * LOAD {
                    let half = self.lists[dst].len() / 2;
                    let tail = self.lists[dst].split_off(half);
                    self.lists.insert(dst + 1, tail);
                }
                i = dst;
                continue;
            }
            i += 1;
        }
        self.reindex();
    }
}

impl<K: Ord, V: Ord> RawEntryList<K, V> {
    fn cmp_entries(&self, a: &(V, K), b: &(V, K)) -> Ordering {
        match self.tie_break {
            TieBreak::Key => a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)),
            TieBreak::Priority => a.0.cmp(&b.0),
        }
    }

    /// Inserts an entry at its sorted position.
    pub(crate) fn add(&mut self, entry: (V, K)) {
        if self.lists.is_empty() {
            self.lists.push(vec![entry]);
            self.len = 1;
            self.reindex();
            return;
        }
        let mut outer = self.lists.partition_point(|sub| {
            let last = sub.last().expect("sublists are never empty");
            self.cmp_entries(last, &entry) != Ordering::Greater
        });
        if outer == self.lists.len() {
            outer -= 1;
        }
        let inner = self.lists[outer]
            .partition_point(|e| self.cmp_entries(e, &entry) != Ordering::Greater);
        self.lists[outer].insert(inner, entry);
        self.len += 1;
        if self.lists[outer].len() > 2 * LOAD {
            let tail = self.lists[outer].split_off(LOAD);
            self.lists.insert(outer + 1, tail);
            self.reindex();
        } else {
            self.pos_index.inc(outer);
        }
    }

    /// Locates an entry, returning `(sublist, offset, global position)`.
    fn find(&self, priority: &V, key: &K) -> Option<(usize, usize, usize)> {
        if self.lists.is_empty() {
            return None;
        }
        match self.tie_break {
            TieBreak::Key => {
                let outer = self.lists.partition_point(|sub| {
                    let last = sub.last().expect("sublists are never empty");
                    match last.0.cmp(priority) {
                        Ordering::Equal => last.1 < *key,
                        other => other == Ordering::Less,
                    }
                });
                if outer == self.lists.len() {
                    return None;
                }
                let inner = self.lists[outer].partition_point(|e| match e.0.cmp(priority) {
                    Ordering::Equal => e.1 < *key,
                    other => other == Ordering::Less,
                });
                let entry = self.lists[outer].get(inner)?;
                if entry.0 == *priority && entry.1 == *key {
                    Some((outer, inner, self.pos_index.prefix(outer) + inner))
                } else {
                    None
                }
            }
            TieBreak::Priority => {
                // No key order within a run; walk the equal-priority run.
                let start = self.bisect_left(priority);
                if start == self.len {
                    return None;
                }
                let (mut outer, mut inner) = self.pos_index.locate(start);
                let mut pos = start;
                while outer < self.lists.len() {
                    while inner < self.lists[outer].len() {
                        let entry = &self.lists[outer][inner];
                        if entry.0 != *priority {
                            return None;
                        }
                        if entry.1 == *key {
                            return Some((outer, inner, pos));
                        }
                        inner += 1;
                        pos += 1;
                    }
                    outer += 1;
                    inner = 0;
                }
                None
            }
        }
    }

    /// Removes the exact `(priority, key)` entry. Returns false if absent.
    pub(crate) fn remove(&mut self, priority: &V, key: &K) -> bool {
        match self.find(priority, key) {
            Some((outer, inner, _)) => {
                self.remove_at(outer, inner);
                true
            }
            None => false,
        }
    }

    /// Global position of the exact `(priority, key)` entry.
    pub(crate) fn position_of(&self, priority: &V, key: &K) -> Option<usize> {
        self.find(priority, key).map(|(_, _, pos)| pos)
    }

    /// First position whose priority is `>= priority`.
    pub(crate) fn bisect_left(&self, priority: &V) -> usize {
        let outer = self.lists.partition_point(|sub| {
            sub.last().expect("sublists are never empty").0 < *priority
        });
        if outer == self.lists.len() {
            return self.len;
        }
        let inner = self.lists[outer].partition_point(|e| e.0 < *priority);
        self.pos_index.prefix(outer) + inner
    }

    /// First position whose priority is `> priority`; all entries with the
    /// given priority land strictly to the left.
    pub(crate) fn bisect_right(&self, priority: &V) -> usize {
        let outer = self.lists.partition_point(|sub| {
            sub.last().expect("sublists are never empty").0 <= *priority
        });
        if outer == self.lists.len() {
            return self.len;
        }
        let inner = self.lists[outer].partition_point(|e| e.0 <= *priority);
        self.pos_index.prefix(outer) + inner
    }

    /// Replaces the contents with `entries` in one bulk sorted build.
    pub(crate) fn rebuild(&mut self, mut entries: Vec<(V, K)>) {
        match self.tie_break {
            TieBreak::Key => {
                entries.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            }
            TieBreak::Priority => entries.sort_by(|a, b| a.0.cmp(&b.0)),
        }
        self.len = entries.len();
        self.lists.clear();
        let mut it = entries.into_iter();
        loop {
            let chunk: Vec<(V, K)> = it.by_ref().take(LOAD).collect();
            if chunk.is_empty() {
                break;
            }
            self.lists.push(chunk);
        }
        self.reindex();
    }

    /// Asserts the structural invariants: sort order, load bounds, and the
    /// position index agreeing with the sublist lengths.
    pub(crate) fn check(&self) {
        assert_eq!(self.len, self.lists.iter().map(Vec::len).sum::<usize>());
        assert!(self.lists.iter().all(|sub| !sub.is_empty()));
        assert!(self.lists.iter().all(|sub| sub.len() <= 2 * LOAD));
        let mut prev: Option<&(V, K)> = None;
        for entry in self.iter() {
            if let Some(prev) = prev {
                assert!(self.cmp_entries(prev, entry) != Ordering::Greater);
            }
            prev = Some(entry);
        }
        for (i, sub) in self.lists.iter().enumerate() {
            assert_eq!(
                self.pos_index.prefix(i + 1) - self.pos_index.prefix(i),
                sub.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn model_insert(model: &mut Vec<(i64, i64)>, entry: (i64, i64)) {
        let at = model.partition_point(|e| *e <= entry);
        model.insert(at, entry);
    }

    #[test]
    fn add_get_remove_round_trip() {
        let mut list: RawEntryList<i64, i64> = RawEntryList::new(TieBreak::Key);
        for i in (0..500).rev() {
            list.add((i, -i));
        }
        list.check();
        assert_eq!(list.len(), 500);
        assert_eq!(list.get(0), Some(&(0, 0)));
        assert_eq!(list.get(499), Some(&(499, -499)));
        assert_eq!(list.position_of(&250, &-250), Some(250));
        assert!(list.remove(&250, &-250));
        assert!(!list.remove(&250, &-250));
        list.check();
        assert_eq!(list.get(250), Some(&(251, -251)));
    }

    #[test]
    fn drain_range_spans_sublists() {
        let mut list: RawEntryList<i64, i64> = RawEntryList::new(TieBreak::Key);
        for i in 0..1000 {
            list.add((i, i));
        }
        let removed = list.drain_range(100, 900);
        assert_eq!(removed.len(), 800);
        assert_eq!(removed.first(), Some(&(100, 100)));
        assert_eq!(removed.last(), Some(&(899, 899)));
        assert_eq!(list.len(), 200);
        assert_eq!(list.get(100), Some(&(900, 900)));
        list.check();
    }

    #[test]
    fn priority_tie_break_scans_runs() {
        let mut list: RawEntryList<&str, i64> = RawEntryList::new(TieBreak::Priority);
        list.add((1, "a"));
        list.add((1, "b"));
        list.add((1, "c"));
        list.add((2, "d"));
        assert_eq!(list.position_of(&1, &"c"), Some(2));
        assert!(list.remove(&1, &"b"));
        assert_eq!(list.position_of(&1, &"c"), Some(1));
        assert_eq!(list.bisect_right(&1), 2);
        list.check();
    }

    proptest! {
        #[test]
        fn matches_sorted_vec_model(ops in proptest::collection::vec((-50i64..50, -50i64..50, any::<bool>()), 0..400)) {
            let mut list: RawEntryList<i64, i64> = RawEntryList::new(TieBreak::Key);
            let mut model: Vec<(i64, i64)> = Vec::new();

            for (v, k, insert) in ops {
                if insert {
                    if !model.contains(&(v, k)) {
                        list.add((v, k));
                        model_insert(&mut model, (v, k));
                    }
                } else {
                    let in_model = model.iter().position(|e| *e == (v, k));
                    prop_assert_eq!(list.remove(&v, &k), in_model.is_some());
                    if let Some(at) = in_model {
                        model.remove(at);
                    }
                }
                list.check();
            }

            prop_assert_eq!(list.len(), model.len());
            let collected: Vec<(i64, i64)> = list.iter().copied().collect();
            prop_assert_eq!(&collected, &model);
            for (pos, entry) in model.iter().enumerate() {
                prop_assert_eq!(list.get(pos), Some(entry));
                prop_assert_eq!(list.position_of(&entry.0, &entry.1), Some(pos));
            }
        }

        #[test]
        fn bisect_agrees_with_partition_point(values in proptest::collection::vec(-20i64..20, 0..300), probe in -25i64..25) {
            let mut list: RawEntryList<i64, i64> = RawEntryList::new(TieBreak::Key);
            let mut model: Vec<(i64, i64)> = Vec::new();
            for (k, v) in values.into_iter().enumerate() {
                let entry = (v, k as i64);
                list.add(entry);
                model_insert(&mut model, entry);
            }
            prop_assert_eq!(list.bisect_left(&probe), model.partition_point(|e| e.0 < probe));
            prop_assert_eq!(list.bisect_right(&probe), model.partition_point(|e| e.0 <= probe));
        }
    }
}
