//! Allocator configuration parameters.

/// When the allocator runs its consistency checker as a post-condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsistencyCheck {
    /// `debug_assert!` after every mutation; free in release builds.
    #[default]
    DebugOnly,
    /// `assert!` after every mutation, in every build profile.
    Always,
    /// Never run the checker implicitly. `is_consistent` is still callable.
    Never,
}

/// Configuration for a [`TagAllocator`](crate::TagAllocator).
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the arena in bytes, sentinels included.
    ///
    /// Must hold at least one element plus its two sentinels, and the
    /// payload of the initial block must fit in an `i32` sentinel.
    pub capacity: usize,

    /// Post-condition checking policy.
    pub consistency: ConsistencyCheck,
}

impl ArenaConfig {
    /// Default arena capacity in bytes.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Create a config for an arena of `capacity` bytes.
    ///
    /// Uses default values for all other parameters.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            consistency: ConsistencyCheck::default(),
        }
    }

    /// Replace the consistency checking policy.
    pub fn with_consistency(mut self, consistency: ConsistencyCheck) -> Self {
        self.consistency = consistency;
        self
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
