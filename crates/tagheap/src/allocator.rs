//! The boundary-tag allocator.
//!
//! [`TagAllocator`] owns one fixed-size byte arena and carves it into blocks
//! bounded by matching sentinels. Allocation is first-fit with splitting;
//! deallocation coalesces eagerly with free neighbours on both sides, so two
//! free blocks are never adjacent.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

use crate::block::{ArenaStats, Blocks};
use crate::config::{ArenaConfig, ConsistencyCheck};
use crate::error::ArenaError;
use crate::ptr::{element_size, ArenaPtr};
use crate::raw;
use crate::tag::{self, Tag, MAX_BLOCK_SIZE, TAG_SIZE};

/// How a free block was turned into an allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placement {
    /// Block payload matched the request exactly.
    Exact,
    /// Leftover too small for a block of its own; caller gets the slack.
    Whole,
    /// Leftover carved off into a new free block.
    Split,
}

/// Fixed-capacity allocator for values of type `T`.
///
/// The arena is fully laid out at construction as one free block. Every
/// mutating operation either fails without touching the arena or leaves it
/// in a state where [`is_consistent`](Self::is_consistent) holds.
///
/// Values placed with [`construct`](Self::construct) are owned by the arena
/// bytes. Dropping the allocator does not drop them; call
/// [`destroy`](Self::destroy) first for types that need it.
pub struct TagAllocator<T> {
    arena: Box<[u8]>,
    config: ArenaConfig,
    _marker: PhantomData<T>,
}

impl<T> TagAllocator<T> {
    /// Create an allocator over an arena of `capacity` bytes.
    ///
    /// # Errors
    ///
    /// See [`with_config`](Self::with_config).
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Create an allocator from a full configuration.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::OutOfMemory`] if the arena cannot hold one element
    ///   plus its two sentinels.
    /// - [`ArenaError::InvalidArgument`] if the initial free block is too
    ///   large for a sentinel to describe.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        let capacity = config.capacity;
        let min_block = Self::min_block_size();
        if capacity < min_block {
            tracing::debug!(capacity, min_block, "arena too small for a single element");
            return Err(ArenaError::OutOfMemory {
                requested: min_block,
                capacity,
            });
        }
        let payload = capacity - 2 * TAG_SIZE;
        if payload > MAX_BLOCK_SIZE {
            return Err(ArenaError::InvalidArgument {
                reason: "capacity exceeds the largest block a sentinel can describe",
            });
        }

        let mut arena = vec![0u8; capacity].into_boxed_slice();
        tag::write_block(&mut arena, 0, Tag::free(payload));

        let allocator = Self {
            arena,
            config,
            _marker: PhantomData,
        };
        allocator.check_consistency();
        tracing::debug!(capacity, payload, "initialised tag arena");
        Ok(allocator)
    }

    /// Arena size in bytes, sentinels included.
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// The configuration this allocator was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Smallest footprint a block can have: two sentinels and one element.
    ///
    /// Leftovers smaller than this are never split off on their own.
    pub const fn min_block_size() -> usize {
        2 * TAG_SIZE + element_size::<T>()
    }

    /// Allocate room for `n` contiguous elements.
    ///
    /// Walks the blocks left to right and takes the first free one that is
    /// large enough. A request for zero elements reserves one.
    ///
    /// # Errors
    ///
    /// [`ArenaError::OutOfMemory`] if no free block can hold the request.
    /// The arena is left untouched.
    pub fn allocate(&mut self, n: usize) -> Result<ArenaPtr<T>, ArenaError> {
        let unit = element_size::<T>();
        let requested = match n.max(1).checked_mul(unit) {
            Some(bytes) if bytes <= MAX_BLOCK_SIZE => bytes,
            _ => {
                tracing::debug!(count = n, "allocation size overflows a sentinel");
                return Err(ArenaError::OutOfMemory {
                    requested: n.saturating_mul(unit),
                    capacity: self.capacity(),
                });
            }
        };
        let min_block = Self::min_block_size();

        let mut offset = 0;
        while offset < self.arena.len() {
            let found = tag::read(&self.arena, offset);
            let size = found.size();
            tracing::trace!(offset, size, free = found.is_free(), "first-fit visit");

            if found.is_free() && size >= requested {
                let placement = if size == requested {
                    Placement::Exact
                } else if size - requested < min_block {
                    Placement::Whole
                } else {
                    Placement::Split
                };
                let granted = match placement {
                    Placement::Exact | Placement::Whole => {
                        tag::write_block(&mut self.arena, offset, Tag::used(size));
                        size
                    }
                    Placement::Split => {
                        tag::write_block(&mut self.arena, offset, Tag::used(requested));
                        let rest = offset + tag::footprint(requested);
                        let rest_size = size - tag::footprint(requested);
                        tag::write_block(&mut self.arena, rest, Tag::free(rest_size));
                        requested
                    }
                };
                self.check_consistency();
                tracing::debug!(offset, requested, granted, ?placement, "allocated block");
                return Ok(ArenaPtr::from_offset(offset + TAG_SIZE));
            }

            offset += tag::footprint(size);
        }

        tracing::debug!(
            requested,
            capacity = self.capacity(),
            "no free block large enough"
        );
        Err(ArenaError::OutOfMemory {
            requested,
            capacity: self.capacity(),
        })
    }

    /// Release the block that `p` was allocated from.
    ///
    /// The block's own sentinel determines its size; `count` is accepted for
    /// symmetry with [`allocate`](Self::allocate) and otherwise ignored.
    /// Free neighbours on either side are merged into the released block.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidArgument`] if `p` is null. The arena is left
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if `p` was advanced with [`ArenaPtr::add`] rather than being
    /// the pointer `allocate` returned, or if the sentinels around `p` are
    /// not a matching in-use pair. The latter catches most double frees and
    /// foreign pointers; other misuse is not detected.
    pub fn deallocate(&mut self, p: ArenaPtr<T>, count: usize) -> Result<(), ArenaError> {
        if p.is_null() {
            tracing::debug!(count, "rejected null deallocation");
            return Err(ArenaError::InvalidArgument {
                reason: "cannot deallocate a null pointer",
            });
        }

        assert_eq!(
            p.offset(),
            p.base(),
            "pointer at offset {} is not the start of its allocation",
            p.offset()
        );
        let lead = match p.offset().checked_sub(TAG_SIZE) {
            Some(lead) => lead,
            None => panic!("offset {} is not a block payload", p.offset()),
        };
        let released = tag::read(&self.arena, lead);
        assert!(
            !released.is_free(),
            "block at offset {lead} is not in use"
        );
        let trail = lead + TAG_SIZE + released.size();
        assert_eq!(
            tag::read(&self.arena, trail),
            released,
            "sentinels of block at offset {lead} disagree"
        );

        let mut start = lead;
        let mut size = released.size();
        let mut left = false;
        let mut right = false;

        if lead > 0 {
            let prev = tag::read(&self.arena, lead - TAG_SIZE);
            if prev.is_free() {
                size += tag::footprint(prev.size());
                start = lead - tag::footprint(prev.size());
                debug_assert_eq!(tag::read(&self.arena, start), prev);
                left = true;
            }
        }

        let after = trail + TAG_SIZE;
        if after < self.arena.len() {
            let next = tag::read(&self.arena, after);
            if next.is_free() {
                size += tag::footprint(next.size());
                debug_assert_eq!(
                    tag::read(&self.arena, after + TAG_SIZE + next.size()),
                    next
                );
                right = true;
            }
        }

        tag::write_block(&mut self.arena, start, Tag::free(size));
        self.check_consistency();
        tracing::debug!(offset = lead, merged_size = size, left, right, "released block");
        Ok(())
    }

    /// Move `value` into the element slot at `p`.
    ///
    /// Whatever the slot held before is overwritten without being dropped.
    ///
    /// # Panics
    ///
    /// Panics unless `p` addresses an element slot of the in-use allocation
    /// it was derived from. Null pointers, pointers into free blocks or
    /// sentinels, and pointers advanced past their own allocation are all
    /// rejected before anything is written.
    pub fn construct(&mut self, p: ArenaPtr<T>, value: T) {
        let range = self.element_range(p);
        raw::write_value(&mut self.arena[range], value);
        self.check_consistency();
    }

    /// Drop the value in the element slot at `p`.
    ///
    /// # Safety
    ///
    /// The slot must hold a value placed by [`construct`](Self::construct)
    /// that has not been destroyed since.
    ///
    /// # Panics
    ///
    /// Same as [`construct`](Self::construct).
    #[allow(unsafe_code)]
    pub unsafe fn destroy(&mut self, p: ArenaPtr<T>) {
        let range = self.element_range(p);
        // SAFETY: forwarded from this function's contract.
        unsafe { raw::drop_value::<T>(&self.arena[range]) };
        self.check_consistency();
    }

    /// Clone the value in the element slot at `p`.
    ///
    /// # Safety
    ///
    /// Same as [`destroy`](Self::destroy).
    ///
    /// # Panics
    ///
    /// Same as [`construct`](Self::construct).
    #[allow(unsafe_code)]
    pub unsafe fn read(&self, p: ArenaPtr<T>) -> T
    where
        T: Clone,
    {
        let range = self.element_range(p);
        // SAFETY: forwarded from this function's contract.
        unsafe { raw::read_value(&self.arena[range]) }
    }

    /// Check every arena invariant.
    ///
    /// Blocks must tile the arena exactly, each block's sentinels must
    /// match, no block may be empty, and no two free blocks may touch.
    /// Never panics, even on a corrupted arena.
    pub fn is_consistent(&self) -> bool {
        let mut offset = 0;
        let mut prev_free = false;
        while offset < self.arena.len() {
            let Some(lead) = tag::try_read(&self.arena, offset) else {
                return false;
            };
            if lead.size() == 0 {
                return false;
            }
            let Some(trail) = (offset + TAG_SIZE)
                .checked_add(lead.size())
                .and_then(|at| tag::try_read(&self.arena, at))
            else {
                return false;
            };
            if trail != lead {
                return false;
            }
            if lead.is_free() && prev_free {
                return false;
            }
            prev_free = lead.is_free();
            offset += tag::footprint(lead.size());
        }
        true
    }

    /// Walk the blocks left to right.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks::new(&self.arena)
    }

    /// Summarise the current block population.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats::collect(self.capacity(), self.blocks())
    }

    /// Largest element count a single `allocate` call could satisfy now.
    pub fn max_allocation(&self) -> usize {
        self.stats().largest_free / element_size::<T>()
    }

    /// Raw sentinel value at byte `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the sentinel would extend past the arena.
    #[cfg(any(test, feature = "diagnostics"))]
    pub fn tag_at(&self, offset: usize) -> i32 {
        tag::read(&self.arena, offset).raw()
    }

    /// Byte range of the element at `p`, checked against the block map.
    ///
    /// The element must sit on the element grid of the in-use block that
    /// `p` was allocated from and fit inside its payload, so no access can
    /// reach a sentinel, a free block or another allocation.
    fn element_range(&self, p: ArenaPtr<T>) -> Range<usize> {
        assert!(!p.is_null(), "null element pointer");
        let start = p.offset();
        let Some(block) = self
            .blocks()
            .find(|b| b.payload_offset() <= start && start < b.payload_offset() + b.size)
        else {
            panic!("element at offset {start} is not inside a block payload");
        };
        assert!(
            !block.is_free(),
            "element at offset {start} is in a free block at offset {}",
            block.offset
        );
        let payload = block.payload_offset();
        assert_eq!(
            payload,
            p.base(),
            "element at offset {start} strays outside its allocation"
        );
        assert_eq!(
            (start - payload) % element_size::<T>(),
            0,
            "element at offset {start} is off the element grid"
        );
        let end = start + std::mem::size_of::<T>();
        assert!(
            end <= payload + block.size,
            "element at offset {start} runs past the end of its block"
        );
        start..end
    }

    fn check_consistency(&self) {
        match self.config.consistency {
            ConsistencyCheck::DebugOnly => {
                debug_assert!(self.is_consistent(), "arena invariants violated")
            }
            ConsistencyCheck::Always => assert!(self.is_consistent(), "arena invariants violated"),
            ConsistencyCheck::Never => {}
        }
    }
}

/// Allocators compare by identity: each owns a distinct arena, so two
/// instances are never interchangeable even with identical contents.
impl<T> PartialEq for TagAllocator<T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl<T> fmt::Debug for TagAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagAllocator")
            .field("capacity", &self.capacity())
            .field("consistency", &self.config.consistency)
            .field("stats", &self.stats())
            .finish()
    }
}

/// One line per block: leading sentinel offset, state, payload size.
impl<T> fmt::Display for TagAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in self.blocks() {
            writeln!(
                f,
                "{:>8}: {} {} bytes",
                block.offset, block.state, block.size
            )?;
        }
        Ok(())
    }
}
