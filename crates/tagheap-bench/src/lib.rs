//! Benchmark profiles for the tagheap allocator.
//!
//! Provides pre-built arena states for benchmarking:
//!
//! - [`fragmented_arena`]: alternating used/free blocks so first-fit has to
//!   walk past many small holes before finding room
//! - [`churn_workload`]: a seeded mixed allocate/free sequence

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tagheap::TagAllocator;
use tagheap_test_utils::{carve, Workload};

/// Arena size used by every profile, in bytes.
pub const PROFILE_CAPACITY: usize = 64 * 1024;

/// Build an arena of `holes` one-element free blocks, each pinned between
/// two one-element used blocks, followed by the remaining free space.
///
/// Any request for two or more elements has to skip every hole.
pub fn fragmented_arena(holes: usize) -> TagAllocator<u64> {
    let mut allocator = TagAllocator::new(PROFILE_CAPACITY).expect("profile capacity is valid");
    let ptrs = carve(&mut allocator, &vec![1; 2 * holes + 1]);
    for p in ptrs.iter().skip(1).step_by(2) {
        allocator
            .deallocate(*p, 1)
            .expect("profile pointers are live");
    }
    allocator
}

/// Seeded mixed workload sized for [`PROFILE_CAPACITY`].
pub fn churn_workload(seed: u64) -> Workload {
    Workload::generate(seed, 4096, 32, 0.45)
}
