//! Allocator error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during allocator operations.
///
/// A failed operation never leaves a partial mutation behind: the arena is
/// exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// No block large enough exists, or the arena is too small to hold even
    /// a single element.
    OutOfMemory {
        /// Number of bytes requested (payload for `allocate`, footprint for
        /// construction).
        requested: usize,
        /// Total arena capacity in bytes.
        capacity: usize,
    },
    /// An argument the allocator cannot act on, such as a null pointer
    /// passed to `deallocate`.
    InvalidArgument {
        /// What was wrong with the argument.
        reason: &'static str,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes, arena capacity {capacity} bytes"
                )
            }
            Self::InvalidArgument { reason } => {
                write!(f, "invalid argument: {reason}")
            }
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_message_names_both_sizes() {
        let err = ArenaError::OutOfMemory {
            requested: 40,
            capacity: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("40 bytes"));
        assert!(msg.contains("100 bytes"));
    }

    #[test]
    fn invalid_argument_carries_reason() {
        let err = ArenaError::InvalidArgument {
            reason: "null pointer",
        };
        assert_eq!(err.to_string(), "invalid argument: null pointer");
    }
}
