use std::collections::HashMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use priority_map::{Error, PriorityMap, Rank};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 500;

/// Generates keys from a range small enough to force collisions.
fn key_strategy() -> impl Strategy<Value = i64> {
    -50i64..50i64
}

/// Priorities from a narrow range so equal-priority runs actually occur.
fn value_strategy() -> impl Strategy<Value = i64> {
    -100i64..100i64
}

/// The model: a plain `HashMap` plus `(priority, key)` sorting on demand.
fn sorted_pairs(model: &HashMap<i64, i64>) -> Vec<(i64, i64)> {
    let mut pairs: Vec<(i64, i64)> = model.iter().map(|(&k, &v)| (v, k)).collect();
    pairs.sort_unstable();
    pairs
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    GetOrInsert(i64, i64),
    PopLowest,
    PopHighest,
    Clean(i64),
    RankOf(i64),
    GetByRank(usize),
    RemoveByRank(usize),
    BisectLeft(i64),
    BisectRight(i64),
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::GetOrInsert(k, v)),
        1 => Just(MapOp::PopLowest),
        1 => Just(MapOp::PopHighest),
        1 => value_strategy().prop_map(MapOp::Clean),
        2 => key_strategy().prop_map(MapOp::RankOf),
        2 => (0usize..200).prop_map(MapOp::GetByRank),
        1 => (0usize..200).prop_map(MapOp::RemoveByRank),
        1 => value_strategy().prop_map(MapOp::BisectLeft),
        1 => value_strategy().prop_map(MapOp::BisectRight),
    ]
}

// ─── Model replay ────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random operation sequence against a `HashMap` model and
    /// asserts identical results at every step, with a full structural
    /// invariant check after each operation.
    #[test]
    fn map_ops_match_model(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut map: PriorityMap<i64, i64> = PriorityMap::new();
        let mut model: HashMap<i64, i64> = HashMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(map.insert(*k, *v), model.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(map.remove(k), model.remove(k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(map.get(k), model.get(k), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(map.contains_key(k), model.contains_key(k), "contains_key({})", k);
                }
                MapOp::GetOrInsert(k, v) => {
                    let expected = *model.entry(*k).or_insert(*v);
                    prop_assert_eq!(*map.get_or_insert(*k, *v), expected, "get_or_insert({}, {})", k, v);
                }
                MapOp::PopLowest => {
                    let expected = sorted_pairs(&model).first().map(|&(v, k)| (k, v));
                    prop_assert_eq!(map.pop_lowest(), expected, "pop_lowest");
                    if let Some((k, _)) = expected {
                        model.remove(&k);
                    }
                }
                MapOp::PopHighest => {
                    let expected = sorted_pairs(&model).last().map(|&(v, k)| (k, v));
                    prop_assert_eq!(map.pop_highest(), expected, "pop_highest");
                    if let Some((k, _)) = expected {
                        model.remove(&k);
                    }
                }
                MapOp::Clean(threshold) => {
                    let before = model.len();
                    model.retain(|_, v| *v > *threshold);
                    prop_assert_eq!(map.clean(threshold), before - model.len(), "clean({})", threshold);
                }
                MapOp::RankOf(k) => {
                    let expected = match model.get(k) {
                        Some(&v) => Ok(sorted_pairs(&model).binary_search(&(v, *k)).unwrap_or(usize::MAX)),
                        None => Err(Error::KeyNotFound),
                    };
                    prop_assert_eq!(map.rank_of(k), expected, "rank_of({})", k);
                }
                MapOp::GetByRank(r) => {
                    let expected = sorted_pairs(&model).get(*r).map(|&(v, k)| (k, v));
                    prop_assert_eq!(map.get_by_rank(Rank(*r)).map(|(&k, &v)| (k, v)), expected, "get_by_rank({})", r);
                }
                MapOp::RemoveByRank(r) => {
                    let expected = sorted_pairs(&model).get(*r).map(|&(v, k)| (k, v));
                    match (map.by_rank_mut().remove(Rank(*r)), expected) {
                        (Ok(got), Some(want)) => {
                            prop_assert_eq!(got, want, "by_rank remove({})", r);
                            model.remove(&want.0);
                        }
                        (Err(Error::IndexOutOfRange { .. }), None) => {}
                        (got, want) => prop_assert!(false, "by_rank remove({}): {:?} vs {:?}", r, got, want),
                    }
                }
                MapOp::BisectLeft(v) => {
                    let expected = sorted_pairs(&model).partition_point(|&(w, _)| w < *v);
                    prop_assert_eq!(map.bisect_left(v), expected, "bisect_left({})", v);
                }
                MapOp::BisectRight(v) => {
                    let expected = sorted_pairs(&model).partition_point(|&(w, _)| w <= *v);
                    prop_assert_eq!(map.bisect_right(v), expected, "bisect_right({})", v);
                }
            }
            map.check_invariants();
            prop_assert_eq!(map.len(), model.len(), "len mismatch after {:?}", op);
        }
    }

    /// Iteration yields the model's entries sorted by `(priority, key)`,
    /// forward and reversed, with matching keys/values/into_iter views.
    #[test]
    fn iteration_is_value_sorted(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut map: PriorityMap<i64, i64> = PriorityMap::new();
        let mut model: HashMap<i64, i64> = HashMap::new();
        for (k, v) in &entries {
            map.insert(*k, *v);
            model.insert(*k, *v);
        }

        let expected: Vec<(i64, i64)> = sorted_pairs(&model).into_iter().map(|(v, k)| (k, v)).collect();

        let items: Vec<_> = map.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(&items, &expected, "iter() mismatch");

        let rev: Vec<_> = map.iter().rev().map(|(&k, &v)| (k, v)).collect();
        let mut expected_rev = expected.clone();
        expected_rev.reverse();
        prop_assert_eq!(&rev, &expected_rev, "iter().rev() mismatch");

        let keys: Vec<_> = map.keys().copied().collect();
        let expected_keys: Vec<_> = expected.iter().map(|&(k, _)| k).collect();
        prop_assert_eq!(&keys, &expected_keys, "keys() mismatch");

        let values: Vec<_> = map.values().copied().collect();
        let expected_values: Vec<_> = expected.iter().map(|&(_, v)| v).collect();
        prop_assert_eq!(&values, &expected_values, "values() mismatch");

        let owned: Vec<_> = map.clone().into_iter().collect();
        prop_assert_eq!(&owned, &expected, "into_iter() mismatch");

        prop_assert_eq!(map.iter().len(), map.len(), "ExactSizeIterator len mismatch");
    }

    /// `rank_of` and rank indexing invert each other for every entry.
    #[test]
    fn rank_round_trips(entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)) {
        let map: PriorityMap<i64, i64> = entries.into_iter().collect();

        for (rank, (&key, _)) in map.iter().enumerate() {
            prop_assert_eq!(map.rank_of(&key), Ok(rank), "rank_of({})", key);
            prop_assert_eq!(map[Rank(rank)], key, "index by rank {}", rank);
        }
        prop_assert_eq!(map.get_by_rank(Rank(map.len())), None);
    }

    /// `clean` removes exactly the prefix at or below the threshold, and a
    /// second call with the same threshold removes nothing.
    #[test]
    fn clean_is_idempotent(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        threshold in value_strategy(),
    ) {
        let mut map: PriorityMap<i64, i64> = entries.into_iter().collect();

        map.clean(&threshold);
        map.check_invariants();
        prop_assert!(map.values().all(|&v| v > threshold));
        prop_assert_eq!(map.clean(&threshold), 0);
    }
}

// ─── Unit scenarios ──────────────────────────────────────────────────────────

/// Inserting a key that already exists relocates its entry instead of
/// leaving a stale one behind.
#[test]
fn reinsert_moves_entry() {
    let mut map = PriorityMap::new();
    map.insert("a", 10);
    map.insert("b", 20);
    assert_eq!(map.rank_of(&"a"), Ok(0));

    map.insert("a", 30);
    map.check_invariants();
    assert_eq!(map.len(), 2);
    assert_eq!(map.rank_of(&"a"), Ok(1));
    assert_eq!(map.get(&"a"), Some(&30));
}

/// After interleaved inserts and removes, removed keys fail lookups in both
/// the key map and the order index.
#[test]
fn removal_purges_both_structures() {
    let mut map = PriorityMap::new();
    for (k, v) in [("a", 3), ("b", 1), ("c", 2), ("d", 4)] {
        map.insert(k, v);
    }
    assert_eq!(map.remove(&"c"), Some(2));
    assert_eq!(map.remove(&"c"), None);
    map.check_invariants();

    assert_eq!(map.get(&"c"), None);
    assert_eq!(map.rank_of(&"c"), Err(Error::KeyNotFound));
    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, ["b", "a", "d"]);
}

/// Duplicate priorities coexist and are keyed apart by the tie-break.
#[test]
fn equal_priorities_tie_break_on_key() {
    let mut map = PriorityMap::new();
    map.insert("z", 1);
    map.insert("a", 1);
    map.insert("m", 1);
    map.check_invariants();

    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, ["a", "m", "z"]);
    assert_eq!(map.bisect_left(&1), 0);
    assert_eq!(map.bisect(&1), map.bisect_left(&1));
    assert_eq!(map.bisect_right(&1), 3);
    assert_eq!(map.remove(&"m"), Some(1));
    assert_eq!(map.len(), 2);
}

/// With comparable keys disabled, equal-priority entries still all resolve
/// correctly by key even though the order index never compares keys.
#[test]
fn priority_only_tie_break_resolves_by_scan() {
    let mut map = PriorityMap::with_comparable_keys(false);
    for key in ["z", "a", "m", "q", "b"] {
        map.insert(key, 7);
    }
    map.insert("low", 1);
    map.check_invariants();

    for key in ["z", "a", "m", "q", "b"] {
        let rank = map.rank_of(&key).unwrap();
        assert!(rank >= 1, "equal-priority run starts after the low entry");
        assert_eq!(map[Rank(rank)], key);
    }
    assert_eq!(map.remove(&"q"), Some(7));
    map.check_invariants();
    assert_eq!(map.len(), 5);
}

/// Positional removal via the facade empties the map entirely.
#[test]
fn remove_by_rank_to_empty() {
    let mut map: PriorityMap<i64, i64> = (0..100).map(|i| (i, i * 3 % 17)).collect();
    while !map.is_empty() {
        let (key, _) = map.by_rank_mut().remove(Rank(0)).unwrap();
        assert_eq!(map.get(&key), None);
        map.check_invariants();
    }
    assert!(map.by_rank_mut().remove(Rank(0)).is_err());
}

#[test]
fn remove_range_resolves_against_snapshot() {
    let mut map: PriorityMap<&str, i64> =
        PriorityMap::from([("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)]);

    let removed = map.by_rank_mut().remove_range(1..4).unwrap();
    assert_eq!(removed, vec![("b", 2), ("c", 3), ("d", 4)]);
    map.check_invariants();
    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, ["a", "e"]);
}

#[test]
fn remove_range_clamps_end_and_rejects_inversion() {
    let mut map: PriorityMap<&str, i64> = PriorityMap::from([("a", 1), ("b", 2)]);

    assert!(matches!(
        map.by_rank_mut().remove_range(2..1),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(map.len(), 2);

    let removed = map.by_rank_mut().remove_range(1..99).unwrap();
    assert_eq!(removed, vec![("b", 2)]);
    assert_eq!(map.len(), 1);
}

#[test]
fn by_rank_reads() {
    let map = PriorityMap::from([("a", 3), ("b", 1), ("c", 2)]);
    let view = map.by_rank();

    assert_eq!(view.len(), 3);
    assert_eq!(view.get(Rank(0)), Ok(&"b"));
    assert_eq!(
        view.get(Rank(3)),
        Err(Error::IndexOutOfRange { rank: 3, len: 3 })
    );
    assert_eq!(view.keys_in(..), Ok(vec![&"b", &"c", &"a"]));
    assert_eq!(view.keys_in(1..=1), Ok(vec![&"c"]));
    assert!(view.keys_in(2..0).is_err());
}

/// A maximal inclusive end bound clamps to the map length instead of
/// overflowing.
#[test]
fn rank_ranges_with_extreme_bounds_clamp() {
    let mut map: PriorityMap<&str, i64> = PriorityMap::from([("a", 1), ("b", 2)]);

    assert_eq!(
        map.by_rank().keys_in(0..=usize::MAX),
        Ok(vec![&"a", &"b"])
    );
    let removed = map.by_rank_mut().remove_range(1..=usize::MAX).unwrap();
    assert_eq!(removed, vec![("b", 2)]);
    map.check_invariants();
    assert_eq!(map.len(), 1);
}

#[test]
fn rank_of_value_finds_first_of_run() {
    let map = PriorityMap::from([("a", 1), ("b", 5), ("c", 5), ("d", 9)]);
    assert_eq!(map.rank_of_value(&5), Ok(1));
    assert_eq!(map.rank_of_value(&1), Ok(0));
    assert_eq!(map.rank_of_value(&4), Err(Error::ValueNotFound));
}

#[test]
fn most_common_orders_descending() {
    let map = PriorityMap::from([("a", 2), ("b", 9), ("c", 5)]);
    let all: Vec<_> = map.most_common().map(|(&k, &v)| (k, v)).collect();
    assert_eq!(all, [("b", 9), ("c", 5), ("a", 2)]);
    assert_eq!(map.most_common_n(2), vec![("b", 9), ("c", 5)]);
    assert_eq!(map.most_common_n(10).len(), 3);
}

#[test]
fn elements_repeats_by_count() {
    let map: PriorityMap<&str, i64> = PriorityMap::from([("a", 2), ("b", -3), ("c", 1)]);
    let elements: Vec<_> = map.elements().copied().collect();
    assert_eq!(elements, ["c", "a", "a"]);
}

#[test]
fn remove_one_of_many_shrinks_by_one() {
    let mut map: PriorityMap<i64, char> = (0..26).zip('a'..='z').collect();
    assert_eq!(map.len(), 26);
    assert_eq!(map.remove(&13), Some('n'));
    assert_eq!(map.len(), 25);
    map.check_invariants();
}

#[test]
fn elements_over_small_counter() {
    let counts: PriorityMap<&str, i64> = PriorityMap::from([("a", 3), ("b", 2), ("c", 1)]);
    let elements: Vec<_> = counts.elements().copied().collect();
    assert_eq!(elements, ["c", "b", "b", "a", "a", "a"]);
}

#[test]
fn most_common_two_of_four() {
    let counts = PriorityMap::from([("a", 1), ("b", 2), ("c", 3), ("d", 4)]);
    assert_eq!(counts.most_common_n(2), vec![("d", 4), ("c", 3)]);
}

/// Domination order tracks per-key values and key coverage, not size alone.
#[test]
fn domination_tracks_keys_and_values() {
    let that: PriorityMap<i64, i64> = (0..100).map(|i| (i, i)).collect();
    let mut temp = that.clone();

    temp.insert(50, -50);
    assert!(temp < that);

    temp.remove(&0);
    assert!(temp < that);

    let mut that = that;
    that.remove(&1);
    assert!(!(temp < that));
    assert_eq!(temp.partial_cmp(&that), None);
}

#[test]
fn pop_on_empty_returns_none() {
    let mut map: PriorityMap<i64, i64> = PriorityMap::new();
    assert_eq!(map.pop_lowest(), None);
    assert_eq!(map.pop_highest(), None);
    assert_eq!(map.clean(&0), 0);
}

#[test]
fn debug_prints_in_priority_order() {
    let map = PriorityMap::from([("b", 2), ("a", 1)]);
    assert_eq!(format!("{map:?}"), r#"{"a": 1, "b": 2}"#);
}

#[test]
fn equality_ignores_policy_and_tie_break() {
    let a = PriorityMap::from([("x", 1)]);
    let mut b = PriorityMap::with_comparable_keys(false);
    b.insert("x", 1);
    assert_eq!(a, b);
}
