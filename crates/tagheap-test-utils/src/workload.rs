//! Seeded allocation workloads.
//!
//! A [`Workload`] is a deterministic sequence of allocate/free operations
//! generated from a seed with a ChaCha8 RNG, so a failing run can be
//! reproduced from its seed alone.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tagheap::{ArenaPtr, TagAllocator};

/// One step of a workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate this many elements.
    Alloc(usize),
    /// Free a live allocation, chosen by this value modulo the live count.
    Free(usize),
}

/// A reproducible operation sequence.
#[derive(Clone, Debug)]
pub struct Workload {
    pub seed: u64,
    pub ops: Vec<Op>,
}

impl Workload {
    /// Generate `len` operations, allocating between 1 and `max_count`
    /// elements at a time and freeing with probability `free_ratio`.
    pub fn generate(seed: u64, len: usize, max_count: usize, free_ratio: f64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ops = (0..len)
            .map(|_| {
                if rng.random_bool(free_ratio) {
                    Op::Free(rng.random_range(0..usize::MAX))
                } else {
                    Op::Alloc(rng.random_range(1..=max_count.max(1)))
                }
            })
            .collect();
        Self { seed, ops }
    }

    /// Run every operation against `allocator`, calling `after_each` after
    /// each step. Out-of-memory allocations are skipped; frees with nothing
    /// live are skipped.
    ///
    /// Returns the allocations still live at the end together with their
    /// element counts.
    pub fn replay<T>(
        &self,
        allocator: &mut TagAllocator<T>,
        mut after_each: impl FnMut(&TagAllocator<T>),
    ) -> Vec<(ArenaPtr<T>, usize)> {
        let mut live: Vec<(ArenaPtr<T>, usize)> = Vec::new();
        for op in &self.ops {
            match *op {
                Op::Alloc(n) => {
                    if let Ok(p) = allocator.allocate(n) {
                        live.push((p, n));
                    }
                }
                Op::Free(pick) => {
                    if !live.is_empty() {
                        let (p, n) = live.swap_remove(pick % live.len());
                        if let Err(e) = allocator.deallocate(p, n) {
                            panic!("seed {}: deallocate of live {p:?} failed: {e}", self.seed);
                        }
                    }
                }
            }
            after_each(allocator);
        }
        live
    }
}
