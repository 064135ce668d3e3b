//! Low-level primitives for moving values in and out of arena bytes.
//!
//! The arena is a plain byte buffer with no alignment guarantee beyond the
//! sentinel layout, so every access is unaligned. This is the only module
//! in the crate allowed to contain `unsafe` code.

#![allow(unsafe_code)]

use std::mem::{self, ManuallyDrop};
use std::ptr;

/// Move `value` into the first `size_of::<T>()` bytes of `slot`.
///
/// The bytes take ownership of `value`; it is not dropped here.
///
/// # Panics
///
/// Panics if `slot` is shorter than `size_of::<T>()`.
pub(crate) fn write_value<T>(slot: &mut [u8], value: T) {
    assert!(slot.len() >= mem::size_of::<T>(), "slot too small for value");
    // SAFETY: `slot` is valid for writes of `size_of::<T>()` bytes (checked
    // above) and `write_unaligned` imposes no alignment requirement.
    unsafe { ptr::write_unaligned(slot.as_mut_ptr().cast::<T>(), value) }
}

/// Clone the value stored at the start of `slot`, leaving it in place.
///
/// # Safety
///
/// `slot` must begin with the bytes of a live `T` placed by [`write_value`]
/// and not yet consumed by [`drop_value`].
pub(crate) unsafe fn read_value<T: Clone>(slot: &[u8]) -> T {
    assert!(slot.len() >= mem::size_of::<T>(), "slot too small for value");
    // SAFETY: the caller guarantees the bytes hold a live `T`. The bitwise
    // copy is wrapped in `ManuallyDrop` so the stored value keeps sole
    // ownership of any resources it holds.
    let stored = ManuallyDrop::new(unsafe { ptr::read_unaligned(slot.as_ptr().cast::<T>()) });
    T::clone(&stored)
}

/// Drop the value stored at the start of `slot`.
///
/// # Safety
///
/// Same as [`read_value`]. After the call the bytes no longer hold a live
/// value and must not be read or dropped again.
pub(crate) unsafe fn drop_value<T>(slot: &[u8]) {
    assert!(slot.len() >= mem::size_of::<T>(), "slot too small for value");
    // SAFETY: the caller guarantees the bytes hold a live `T`; reading it
    // out transfers ownership to this frame, which drops it.
    drop(unsafe { ptr::read_unaligned(slot.as_ptr().cast::<T>()) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn write_then_read_at_odd_offset() {
        let mut bytes = [0u8; 16];
        write_value(&mut bytes[3..], 0x1122_3344_5566_7788u64);
        let v: u64 = unsafe { read_value(&bytes[3..]) };
        assert_eq!(v, 0x1122_3344_5566_7788);
    }

    #[test]
    fn drop_value_releases_ownership() {
        let shared = Rc::new(7);
        let mut bytes = [0u8; 32];
        write_value(&mut bytes[1..], Rc::clone(&shared));
        assert_eq!(Rc::strong_count(&shared), 2);

        let copy: Rc<i32> = unsafe { read_value(&bytes[1..]) };
        assert_eq!(Rc::strong_count(&shared), 3);
        drop(copy);

        unsafe { drop_value::<Rc<i32>>(&bytes[1..]) };
        assert_eq!(Rc::strong_count(&shared), 1);
    }

    #[test]
    #[should_panic(expected = "slot too small")]
    fn short_slot_panics() {
        let mut bytes = [0u8; 2];
        write_value(&mut bytes, 1u32);
    }
}
