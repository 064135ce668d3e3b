//! Typed offsets into an allocator's arena.
//!
//! An [`ArenaPtr`] plays the role of a raw pointer without being one: it is
//! a byte offset into the arena of the allocator that produced it. Every
//! access through it goes back through that allocator, which bounds-checks
//! the offset and checks that the pointer stays inside the allocation it
//! was derived from.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Location of an element inside a [`TagAllocator`](crate::TagAllocator)'s arena.
///
/// Offset 0 always holds the first block's leading sentinel and is never a
/// payload address, so it doubles as the null pointer.
///
/// Besides its own offset a pointer remembers the payload start of the
/// allocation it came from. Pointers derived with [`add`](Self::add) keep
/// that origin, so the allocator can reject one that has strayed into a
/// neighbouring block.
#[must_use]
pub struct ArenaPtr<T> {
    offset: usize,
    base: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArenaPtr<T> {
    /// The null pointer.
    pub const fn null() -> Self {
        Self::from_offset(0)
    }

    pub(crate) const fn from_offset(offset: usize) -> Self {
        Self {
            offset,
            base: offset,
            _marker: PhantomData,
        }
    }

    /// Whether this is the null pointer.
    pub fn is_null(&self) -> bool {
        self.offset == 0
    }

    /// Byte offset of the element within the arena.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Payload offset of the allocation this pointer was derived from.
    pub(crate) fn base(&self) -> usize {
        self.base
    }

    /// Pointer to the element `count` elements after this one.
    ///
    /// Zero-sized element types advance one byte per element, matching the
    /// space the allocator reserves for them.
    ///
    /// # Panics
    ///
    /// Panics if the resulting offset overflows `usize`.
    pub fn add(self, count: usize) -> Self {
        let offset = count
            .checked_mul(element_size::<T>())
            .and_then(|delta| self.offset.checked_add(delta));
        match offset {
            Some(offset) => Self {
                offset,
                base: self.base,
                _marker: PhantomData,
            },
            None => panic!("element offset overflow: {} + {count} elements", self.offset),
        }
    }
}

/// Bytes the allocator reserves per element of `T`.
pub(crate) const fn element_size<T>() -> usize {
    let size = std::mem::size_of::<T>();
    if size == 0 {
        1
    } else {
        size
    }
}

impl<T> Clone for ArenaPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaPtr<T> {}

impl<T> PartialEq for ArenaPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.base == other.base
    }
}

impl<T> Eq for ArenaPtr<T> {}

impl<T> Hash for ArenaPtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
        self.base.hash(state);
    }
}

impl<T> fmt::Debug for ArenaPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("ArenaPtr(null)")
        } else {
            write!(f, "ArenaPtr({})", self.offset)
        }
    }
}
