//! Aligned heap storage backing every [`Image`](crate::image::Image).
//!
//! `Vec<T>` only guarantees `align_of::<T>()`. Pixel rows are processed with
//! 128-bit (and wider) vector loads, so the storage is allocated directly with
//! a 64-byte aligned [`Layout`], which covers AVX-512 cache-line loads.
//!
//! # Safety
//!
//! This module owns the only raw allocation in the crate. The invariants are:
//! - `ptr` is either dangling (when the layout size is zero) or was returned by
//!   `alloc::alloc` with `Self::layout(len)`;
//! - all `len` elements are initialized before the buffer is observable.
#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::error::{Error, Result};

/// Alignment of every buffer allocation in bytes.
pub const BUFFER_ALIGNMENT: usize = 64;

/// Fixed-alignment, fixed-length heap array.
///
/// Indexing goes through `Deref<Target = [T]>`, so all slice methods
/// (`iter`, `chunks_exact_mut`, `copy_from_slice`, ...) are available.
pub struct Buffer<T: Copy> {
    ptr: NonNull<T>,
    len: usize,
}

// SAFETY: `Buffer` uniquely owns its allocation, like `Box<[T]>`.
unsafe impl<T: Copy + Send> Send for Buffer<T> {}
// SAFETY: shared access only hands out `&[T]`.
unsafe impl<T: Copy + Sync> Sync for Buffer<T> {}

impl<T: Copy> Buffer<T> {
    /// Create an empty buffer without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
        }
    }

    /// Allocate `len` elements, each set to `value`.
    ///
    /// Allocation failure is fatal and reported through
    /// [`std::alloc::handle_alloc_error`].
    #[must_use]
    pub fn filled(len: usize, value: T) -> Self {
        match Self::try_filled(len, value) {
            Ok(buffer) => buffer,
            Err(_) => Self::allocation_failure(len),
        }
    }

    /// Allocate `len` elements, each set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the size overflows or the
    /// allocator refuses the request.
    pub fn try_filled(len: usize, value: T) -> Result<Self> {
        let ptr = Self::allocate(len)?;
        for i in 0..len {
            // SAFETY: `ptr` is valid for `len` writes of `T`.
            unsafe { ptr.as_ptr().add(i).write(value) };
        }
        Ok(Self { ptr, len })
    }

    /// Allocate a buffer holding a copy of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the allocator refuses the request.
    pub fn try_from_slice(data: &[T]) -> Result<Self> {
        let ptr = Self::allocate(data.len())?;
        // SAFETY: both regions are valid for `data.len()` elements and the
        // fresh allocation cannot overlap `data`.
        unsafe { ptr::copy_nonoverlapping(data.as_ptr(), ptr.as_ptr(), data.len()) };
        Ok(Self {
            ptr,
            len: data.len(),
        })
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when the buffer holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.deref_mut().fill(value);
    }

    /// Reallocate to `len` elements set to `value`.
    ///
    /// Does nothing when `len` equals the current length; otherwise the old
    /// contents are discarded.
    pub fn resize(&mut self, len: usize, value: T) {
        if len == self.len {
            return;
        }
        log::debug!("reallocating buffer: {} -> {} elements", self.len, len);
        *self = Self::filled(len, value);
    }

    /// Check that the storage honours [`BUFFER_ALIGNMENT`].
    ///
    /// Always true for non-empty buffers of non-zero-sized elements.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.ptr.as_ptr() as usize % BUFFER_ALIGNMENT == 0
    }

    fn layout(len: usize) -> Result<Layout> {
        let bytes = len
            .checked_mul(mem::size_of::<T>())
            .ok_or(Error::AllocationFailed { bytes: usize::MAX })?;
        Layout::from_size_align(bytes, BUFFER_ALIGNMENT.max(mem::align_of::<T>()))
            .map_err(|_| Error::AllocationFailed { bytes })
    }

    fn allocate(len: usize) -> Result<NonNull<T>> {
        let layout = Self::layout(len)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) }.cast::<T>();
        NonNull::new(raw).ok_or(Error::AllocationFailed {
            bytes: layout.size(),
        })
    }

    fn allocation_failure(len: usize) -> ! {
        match Self::layout(len) {
            Ok(layout) => alloc::handle_alloc_error(layout),
            Err(_) => panic!("buffer capacity overflow: {len} elements"),
        }
    }
}

impl<T: Copy> Drop for Buffer<T> {
    fn drop(&mut self) {
        if let Ok(layout) = Self::layout(self.len) {
            if layout.size() != 0 {
                // SAFETY: the pointer came from `alloc::alloc` with this layout.
                unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
            }
        }
    }
}

impl<T: Copy> Deref for Buffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `ptr` is valid (or dangling with len 0) and fully initialized.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy> DerefMut for Buffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: as in `deref`, and `&mut self` guarantees uniqueness.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        match Self::try_from_slice(self) {
            Ok(buffer) => buffer,
            Err(_) => Self::allocation_failure(self.len),
        }
    }
}

impl<T: Copy> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq> PartialEq for Buffer<T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Copy + Eq> Eq for Buffer<T> {}

impl<T: Copy> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len)
            .field("alignment", &BUFFER_ALIGNMENT)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let buf: Buffer<u32> = Buffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert!(buf.iter().next().is_none());
    }

    #[test]
    fn test_filled_and_aligned() {
        let buf = Buffer::filled(1000, 7u8);
        assert_eq!(buf.len(), 1000);
        assert!(buf.iter().all(|&v| v == 7));
        assert!(buf.is_aligned());
    }

    #[test]
    fn test_fill() {
        let mut buf = Buffer::filled(33, 0u32);
        buf.fill(0xdead_beef);
        assert!(buf.iter().all(|&v| v == 0xdead_beef));
    }

    #[test]
    fn test_indexing() {
        let mut buf = Buffer::filled(4, 0i32);
        buf[2] = 42;
        assert_eq!(buf[2], 42);
        assert_eq!(&buf[..], &[0, 0, 42, 0]);
    }

    #[test]
    fn test_resize_same_size_keeps_contents() {
        let mut buf = Buffer::filled(8, 1u16);
        buf[0] = 9;
        buf.resize(8, 0);
        assert_eq!(buf[0], 9);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut buf = Buffer::filled(8, 1u16);
        buf.resize(16, 3);
        assert_eq!(buf.len(), 16);
        assert!(buf.iter().all(|&v| v == 3));
        assert!(buf.is_aligned());

        buf.resize(0, 3);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = Buffer::filled(5, 1u8);
        let b = a.clone();
        a[0] = 2;
        assert_eq!(b[0], 1);
        assert_ne!(a, b);
    }

    #[test]
    fn test_try_filled_overflow() {
        let result = Buffer::try_filled(usize::MAX, 0u64);
        assert!(matches!(result, Err(Error::AllocationFailed { .. })));
    }

    #[test]
    fn test_try_from_slice() {
        let buf = Buffer::try_from_slice(&[1u8, 2, 3]).unwrap();
        assert_eq!(&buf[..], &[1, 2, 3]);
    }
}
