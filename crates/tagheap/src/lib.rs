//! Fixed-capacity boundary-tag allocator.
//!
//! A [`TagAllocator`] owns a single byte arena whose size is fixed at
//! construction and hands out variably-sized blocks from it. Blocks carry a
//! signed sentinel at each end; free space is found by walking the blocks
//! left to right (first fit) and reclaimed by merging with free neighbours
//! on release.
//!
//! # Arena layout
//!
//! ```text
//! offset 0                                                         N
//! ├─────┬──────────────┬─────┼─────┬─────────────────────┬─────┤
//! │ -40 │ 40 B payload │ -40 │ +44 │      44 B free      │ +44 │
//! ├─────┴──────────────┴─────┼─────┴─────────────────────┴─────┤
//! │      block (in use)      │           block (free)          │
//! ```
//!
//! Each sentinel is an `i32`: magnitude is the payload size in bytes, a
//! negative sign marks the block in use. Both sentinels of a block always
//! agree, blocks tile the arena exactly, and no two free blocks touch.
//!
//! # Pointers
//!
//! Allocations are addressed by [`ArenaPtr`], a typed byte offset into the
//! arena. Offset 0 is always a sentinel, so it serves as the null pointer.
//! Values are moved in and out of the arena through the allocator
//! ([`construct`](TagAllocator::construct), [`read`](TagAllocator::read),
//! [`destroy`](TagAllocator::destroy)), never through raw references. Each
//! access is checked against the block map: the element must lie inside the
//! in-use allocation its pointer was derived from.
//!
//! # Safety
//!
//! Only `raw.rs` contains `unsafe` blocks. `read` and `destroy` are
//! `unsafe fn` because the allocator cannot know which slots hold live
//! values.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod block;
pub mod config;
pub mod error;
pub mod ptr;
mod raw;
pub mod tag;

// Public re-exports for the primary API surface.
pub use allocator::TagAllocator;
pub use block::{ArenaStats, BlockInfo, BlockState, Blocks};
pub use config::{ArenaConfig, ConsistencyCheck};
pub use error::ArenaError;
pub use ptr::ArenaPtr;
