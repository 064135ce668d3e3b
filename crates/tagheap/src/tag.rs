//! Boundary tag encoding and bounds-checked arena access.
//!
//! A [`Tag`] is the signed 32-bit sentinel written at both ends of every
//! block. Its magnitude is the block's payload size in bytes; a positive
//! value marks the block free, a negative value marks it in use. Tags are
//! stored little-endian regardless of the host byte order.

/// Width of one sentinel in bytes.
pub const TAG_SIZE: usize = std::mem::size_of::<i32>();

/// Largest payload a single sentinel can describe.
pub const MAX_BLOCK_SIZE: usize = i32::MAX as usize;

/// A decoded sentinel value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Tag(i32);

impl Tag {
    /// A free block of `size` payload bytes.
    pub(crate) fn free(size: usize) -> Self {
        debug_assert!(size > 0 && size <= MAX_BLOCK_SIZE, "bad block size {size}");
        Self(size as i32)
    }

    /// An in-use block of `size` payload bytes.
    pub(crate) fn used(size: usize) -> Self {
        debug_assert!(size > 0 && size <= MAX_BLOCK_SIZE, "bad block size {size}");
        Self(-(size as i32))
    }

    /// Payload size in bytes.
    pub(crate) fn size(self) -> usize {
        self.0.unsigned_abs() as usize
    }

    pub(crate) fn is_free(self) -> bool {
        self.0 > 0
    }

    #[cfg(any(test, feature = "diagnostics"))]
    pub(crate) fn raw(self) -> i32 {
        self.0
    }

    fn decode(bytes: [u8; TAG_SIZE]) -> Self {
        Self(i32::from_le_bytes(bytes))
    }

    fn encode(self) -> [u8; TAG_SIZE] {
        self.0.to_le_bytes()
    }
}

/// Bytes a block of `size` payload bytes occupies, sentinels included.
pub(crate) fn footprint(size: usize) -> usize {
    size + 2 * TAG_SIZE
}

/// Read the tag at `offset`.
///
/// # Panics
///
/// Panics if the tag would extend past the end of `arena`.
pub(crate) fn read(arena: &[u8], offset: usize) -> Tag {
    match try_read(arena, offset) {
        Some(tag) => tag,
        None => panic!(
            "sentinel offset {offset} out of range for arena of {} bytes",
            arena.len()
        ),
    }
}

/// Read the tag at `offset`, or `None` if it lies outside `arena`.
pub(crate) fn try_read(arena: &[u8], offset: usize) -> Option<Tag> {
    let end = offset.checked_add(TAG_SIZE)?;
    let bytes: [u8; TAG_SIZE] = arena.get(offset..end)?.try_into().ok()?;
    Some(Tag::decode(bytes))
}

/// Write `tag` at `offset`.
///
/// # Panics
///
/// Panics if the tag would extend past the end of `arena`.
pub(crate) fn write(arena: &mut [u8], offset: usize, tag: Tag) {
    let len = arena.len();
    match offset
        .checked_add(TAG_SIZE)
        .and_then(|end| arena.get_mut(offset..end))
    {
        Some(slot) => slot.copy_from_slice(&tag.encode()),
        None => panic!("sentinel offset {offset} out of range for arena of {len} bytes"),
    }
}

/// Write `tag` as both the leading sentinel at `offset` and the matching
/// trailing sentinel after its payload.
pub(crate) fn write_block(arena: &mut [u8], offset: usize, tag: Tag) {
    write(arena, offset, tag);
    write(arena, offset + TAG_SIZE + tag.size(), tag);
}
