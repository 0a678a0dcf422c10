use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`PriorityMap`](crate::PriorityMap) operations.
///
/// Every error is returned synchronously by the offending call; nothing is
/// deferred or swallowed. Operations with a natural "absent" outcome (such as
/// [`get`](crate::PriorityMap::get) or [`remove`](crate::PriorityMap::remove))
/// return `Option` instead, which keeps "key absent" distinguishable from
/// "key present with a zero priority".
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The requested key is not in the map.
    #[error("key not found")]
    KeyNotFound,

    /// A rank-based access fell outside the current size of the map.
    #[error("rank {rank} out of range for map of length {len}")]
    IndexOutOfRange {
        /// The offending rank.
        rank: usize,
        /// The map length at the time of the call.
        len: usize,
    },

    /// A priority-based lookup found no entry holding exactly that priority.
    #[error("no entry holds the requested priority")]
    ValueNotFound,

    /// A malformed argument, such as an inverted rank range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}
