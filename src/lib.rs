//! A value-sorted map for Rust.
//!
//! This crate provides [`PriorityMap`], a mapping from keys to priorities
//! that combines three structures in one:
//!
//! - a **hash map**: [`get`](PriorityMap::get) and
//!   [`insert`](PriorityMap::insert) by key in O(1) / O(log n)
//! - a **sorted sequence**: iteration in ascending priority order, plus
//!   O(log n) [`rank_of`](PriorityMap::rank_of),
//!   [`get_by_rank`](PriorityMap::get_by_rank), bisection, and indexing by
//!   [`Rank`] — e.g., `map[Rank(0)]` for the lowest-priority key
//! - a **counter**: [`tally`](PriorityMap::tally),
//!   [`most_common`](PriorityMap::most_common), and bulk algebraic merges
//!   ([`merge_sum`](PriorityMap::merge_sum) and friends) that adaptively
//!   choose between ordered updates and a full sorted rebuild
//!
//! # Example
//!
//! ```
//! use priority_map::{PriorityMap, Rank};
//!
//! let mut scores = PriorityMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! // Key access works like a hash map
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//!
//! // Iteration is ordered by priority, lowest first
//! let order: Vec<_> = scores.keys().copied().collect();
//! assert_eq!(order, ["Bob", "Carol", "Alice"]);
//!
//! // Order-statistic operations (O(log n))
//! assert_eq!(scores.rank_of(&"Carol"), Ok(1));
//! assert_eq!(scores[Rank(2)], "Alice");
//!
//! // Pop in priority order
//! assert_eq!(scores.pop_highest(), Some(("Alice", 100)));
//! ```
//!
//! # Implementation
//!
//! Every map holds two structures kept strictly in sync: a hash map from key
//! to priority, and an order index of `(priority, key)` entries stored as a
//! balanced list of sorted chunks with a positional index over chunk
//! lengths. Point mutations update both in O(log n); bulk operations compare
//! the burst size against the map size and rebuild the order index wholesale
//! when that is cheaper (see [`RebuildPolicy`]).

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]

mod error;
mod order_statistic;
mod raw;

pub mod priority_map;

pub use error::{Error, Result};
pub use order_statistic::Rank;
pub use priority_map::{
    ByRank, ByRankMut, IntoIter, Iter, Keys, PriorityMap, RebuildPolicy, Values,
};
