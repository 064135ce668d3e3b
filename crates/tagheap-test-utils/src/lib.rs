//! Test utilities and fixtures for tagheap development.
//!
//! Provides arena shape assertions, a helper for carving an arena into a
//! known block pattern, and a seeded [`Workload`] generator shared by the
//! integration tests and benchmarks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod workload;

pub use workload::{Op, Workload};

use tagheap::{ArenaPtr, BlockState, TagAllocator};

/// Allocate one block per entry of `counts`, in order.
///
/// # Panics
///
/// Panics if any allocation fails; fixtures are expected to fit.
pub fn carve<T>(allocator: &mut TagAllocator<T>, counts: &[usize]) -> Vec<ArenaPtr<T>> {
    counts
        .iter()
        .map(|&n| {
            allocator
                .allocate(n)
                .unwrap_or_else(|e| panic!("fixture allocation of {n} failed: {e}"))
        })
        .collect()
}

/// Block shape as `(payload bytes, state)` pairs, left to right.
pub fn shape<T>(allocator: &TagAllocator<T>) -> Vec<(usize, BlockState)> {
    allocator.blocks().map(|b| (b.size, b.state)).collect()
}

/// Assert every arena invariant, with a dump of the arena on failure.
pub fn assert_tiled<T>(allocator: &TagAllocator<T>) {
    assert!(
        allocator.is_consistent(),
        "arena inconsistent:\n{allocator}"
    );
    let blocks: Vec<_> = allocator.blocks().collect();
    let covered: usize = blocks.iter().map(|b| b.footprint()).sum();
    assert_eq!(covered, allocator.capacity(), "blocks do not tile:\n{allocator}");
    for pair in blocks.windows(2) {
        assert!(
            !(pair[0].is_free() && pair[1].is_free()),
            "adjacent free blocks at {} and {}:\n{allocator}",
            pair[0].offset,
            pair[1].offset
        );
    }
    for block in &blocks {
        let lead = allocator.tag_at(block.offset);
        let trail = allocator.tag_at(block.offset + tagheap::tag::TAG_SIZE + block.size);
        assert_eq!(lead, trail, "sentinels disagree at {}", block.offset);
    }
}

/// Assert the arena is back to one free block spanning all of it.
pub fn assert_pristine<T>(allocator: &TagAllocator<T>) {
    let expected = allocator.capacity() - 2 * tagheap::tag::TAG_SIZE;
    assert_eq!(
        shape(allocator),
        vec![(expected, BlockState::Free)],
        "arena not pristine:\n{allocator}"
    );
}
