use thiserror::Error;

/// Errors reported by the `try_` variants of buffer and pool operations.
///
/// None of these are fatal. The primary operations report the same
/// conditions as `None`, so callers can branch without error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The ring buffer holds no live elements.
    #[error("ring buffer is empty")]
    EmptyQueue,

    /// Every instance the pool may hand out is already checked out.
    #[error("pool exhausted: all {max_size} instances are checked out")]
    PoolExhausted {
        /// Configured ceiling of the pool.
        max_size: usize,
    },

    /// A logical index was outside the live range.
    #[error("index {index} out of range for {len} live elements")]
    InvalidIndex {
        /// Requested index, counted from the oldest element.
        index: usize,
        /// Number of live elements at the time of the call.
        len: usize,
    },

    /// A buffer or pool was requested with room for nothing.
    #[error("capacity must be non-zero")]
    ZeroCapacity,

    /// A field could not be deep-cloned.
    #[error("value of type `{type_name}` could not be deep-cloned")]
    CloneFieldUnsupported {
        /// Type name of the field that refused the copy.
        type_name: &'static str,
    },
}
