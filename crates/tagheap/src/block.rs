//! Read-only views of the block sequence.
//!
//! The free list is implicit: blocks are discovered by walking the arena
//! left to right, stepping over each block's trailing sentinel. [`Blocks`]
//! performs that walk for diagnostics and statistics.

use std::fmt;

use crate::tag::{self, TAG_SIZE};

/// Allocation state of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockState {
    /// Available to `allocate`.
    Free,
    /// Handed out and not yet deallocated.
    Used,
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => f.write_str("free"),
            Self::Used => f.write_str("used"),
        }
    }
}

/// One block as seen by the arena walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Byte offset of the block's leading sentinel.
    pub offset: usize,
    /// Payload size in bytes, sentinels excluded.
    pub size: usize,
    /// Whether the block is free or in use.
    pub state: BlockState,
}

impl BlockInfo {
    /// Offset of the first payload byte.
    pub fn payload_offset(&self) -> usize {
        self.offset + TAG_SIZE
    }

    /// Bytes the block occupies, sentinels included.
    pub fn footprint(&self) -> usize {
        tag::footprint(self.size)
    }

    /// Whether the block is free.
    pub fn is_free(&self) -> bool {
        self.state == BlockState::Free
    }
}

/// Iterator over the blocks of an arena, left to right.
///
/// Leading sentinels only are read. On a corrupted arena the walk is
/// truncated rather than panicking: it ends at a zero sentinel or when the
/// next sentinel would not fit inside the arena. A block whose sentinel
/// claims more bytes than remain is still reported, as the last one. Dumps
/// and statistics of a broken arena therefore stay usable;
/// [`TagAllocator::is_consistent`](crate::TagAllocator::is_consistent) is
/// what tells whether the walk covered the arena.
pub struct Blocks<'a> {
    arena: &'a [u8],
    offset: usize,
}

impl<'a> Blocks<'a> {
    pub(crate) fn new(arena: &'a [u8]) -> Self {
        Self { arena, offset: 0 }
    }
}

impl Iterator for Blocks<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        if self.offset >= self.arena.len() {
            return None;
        }
        let tag = match tag::try_read(self.arena, self.offset) {
            // A zero sentinel would never advance the walk.
            Some(tag) if tag.size() > 0 => tag,
            _ => {
                self.offset = self.arena.len();
                return None;
            }
        };
        let info = BlockInfo {
            offset: self.offset,
            size: tag.size(),
            state: if tag.is_free() {
                BlockState::Free
            } else {
                BlockState::Used
            },
        };
        self.offset = self.offset.saturating_add(info.footprint());
        Some(info)
    }
}

/// Summary of an arena's block population.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Total arena size in bytes.
    pub capacity: usize,
    /// Number of blocks, free and used.
    pub blocks: usize,
    /// Number of free blocks.
    pub free_blocks: usize,
    /// Number of blocks in use.
    pub used_blocks: usize,
    /// Payload bytes available across all free blocks.
    pub free_bytes: usize,
    /// Payload bytes handed out, including any slack given with whole-block
    /// placements.
    pub used_bytes: usize,
    /// Payload size of the largest free block, or 0 if none is free.
    pub largest_free: usize,
}

impl ArenaStats {
    pub(crate) fn collect(capacity: usize, blocks: Blocks<'_>) -> Self {
        blocks.fold(
            Self {
                capacity,
                ..Self::default()
            },
            |mut stats, block| {
                stats.blocks += 1;
                match block.state {
                    BlockState::Free => {
                        stats.free_blocks += 1;
                        stats.free_bytes += block.size;
                        stats.largest_free = stats.largest_free.max(block.size);
                    }
                    BlockState::Used => {
                        stats.used_blocks += 1;
                        stats.used_bytes += block.size;
                    }
                }
                stats
            },
        )
    }

    /// Bytes spent on sentinels.
    pub fn overhead_bytes(&self) -> usize {
        self.blocks * 2 * TAG_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;

    fn arena_of(blocks: &[Tag]) -> Vec<u8> {
        let total: usize = blocks.iter().map(|t| tag::footprint(t.size())).sum();
        let mut arena = vec![0u8; total];
        let mut offset = 0;
        for &t in blocks {
            tag::write_block(&mut arena, offset, t);
            offset += tag::footprint(t.size());
        }
        arena
    }

    #[test]
    fn walk_visits_blocks_in_order() {
        let arena = arena_of(&[Tag::used(8), Tag::free(4), Tag::used(12)]);
        let blocks: Vec<_> = Blocks::new(&arena).collect();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].offset, 0);
        assert_eq!(blocks[1].offset, 16);
        assert_eq!(blocks[2].offset, 28);
        assert_eq!(blocks[1].state, BlockState::Free);
        assert_eq!(blocks[2].payload_offset(), 32);
    }

    #[test]
    fn zero_sentinel_ends_walk() {
        let arena = vec![0u8; 16];
        assert_eq!(Blocks::new(&arena).count(), 0);
    }

    #[test]
    fn walk_stops_at_sentinel_cut_off_by_arena_end() {
        let mut arena = vec![0u8; 100];
        // Claims 89 bytes, so the next sentinel would start at offset 97.
        tag::write(&mut arena, 0, Tag::free(89));
        let blocks: Vec<_> = Blocks::new(&arena).collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].size, 89);
    }

    #[test]
    fn walk_stops_at_oversized_sentinel() {
        let mut arena = vec![0u8; 16];
        tag::write(&mut arena, 0, Tag::used(4));
        tag::write(&mut arena, 12, Tag::free(i32::MAX as usize));
        assert_eq!(Blocks::new(&arena).count(), 2);
    }

    #[test]
    fn stats_split_free_and_used() {
        let arena = arena_of(&[Tag::used(8), Tag::free(4), Tag::used(12), Tag::free(20)]);
        let stats = ArenaStats::collect(arena.len(), Blocks::new(&arena));
        assert_eq!(stats.blocks, 4);
        assert_eq!(stats.free_blocks, 2);
        assert_eq!(stats.used_blocks, 2);
        assert_eq!(stats.free_bytes, 24);
        assert_eq!(stats.used_bytes, 20);
        assert_eq!(stats.largest_free, 20);
        assert_eq!(
            stats.free_bytes + stats.used_bytes + stats.overhead_bytes(),
            stats.capacity
        );
    }
}
