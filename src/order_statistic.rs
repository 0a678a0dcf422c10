/// A zero-based rank into the value-sorted order of a map.
///
/// Rank 0 is the entry with the lowest priority; rank `len - 1` is the entry
/// with the highest.
///
/// # Examples
///
/// ```
/// use priority_map::{PriorityMap, Rank};
///
/// let mut map = PriorityMap::new();
/// map.insert("a", 10);
/// map.insert("b", 20);
///
/// assert_eq!(map[Rank(0)], "a");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
