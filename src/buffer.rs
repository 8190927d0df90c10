//! Cursor-carrying byte buffers in two memory kinds.
//!
//! A [`Buffer`] models the source/destination descriptor consumed by the
//! dispatch layer: a byte region plus a read/write `position` and a
//! `limit`, with `position <= limit <= capacity` at all times.  Two
//! backing kinds exist and determine which native call variant is used:
//!
//! * [`MemoryKind::Heap`] — a `Vec<u8>` backing; the native layer is
//!   handed the backing slice together with an absolute offset.
//! * [`MemoryKind::Direct`] — memory obtained from `libc::malloc`,
//!   outside the Rust allocator; the native layer is handed the base
//!   pointer plus an offset, with no intermediate slice.
//!
//! Cursor discipline follows the usual flip/clear/rewind convention:
//! write into the buffer, `flip()` to switch to reading, `clear()` to
//! start over.  Out-of-range cursor arguments are caller bugs and panic.

use std::ptr::NonNull;

use crate::error::{Error, Result};

/// Which kind of memory backs a [`Buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryKind {
    /// Backed by a `Vec<u8>` inside the Rust heap.
    Heap,
    /// Backed by externally-pinned memory (`libc::malloc`).
    Direct,
}

enum Storage {
    Heap(Vec<u8>),
    Direct { base: NonNull<u8>, capacity: usize },
}

/// A byte buffer with `position`/`limit` cursors.
pub struct Buffer {
    storage: Storage,
    position: usize,
    limit: usize,
}

// A Buffer owns its memory exclusively; moving it across threads is safe.
unsafe impl Send for Buffer {}

impl Buffer {
    /// Creates a zero-filled heap-backed buffer with `position == 0` and
    /// `limit == capacity`.
    pub fn with_capacity(capacity: usize) -> Buffer {
        Buffer {
            storage: Storage::Heap(vec![0u8; capacity]),
            position: 0,
            limit: capacity,
        }
    }

    /// Creates a zero-filled direct buffer backed by `libc::malloc`-style
    /// memory, freed when the buffer is dropped.
    pub fn direct_with_capacity(capacity: usize) -> Result<Buffer> {
        let base = if capacity == 0 {
            NonNull::dangling()
        } else {
            // calloc keeps the region zeroed like the heap path.
            let raw = unsafe { libc::calloc(capacity, 1) }.cast::<u8>();
            NonNull::new(raw).ok_or(Error::OutOfMemory)?
        };
        Ok(Buffer {
            storage: Storage::Direct { base, capacity },
            position: 0,
            limit: capacity,
        })
    }

    /// Wraps an existing vector; `position == 0`, `limit == len`.
    pub fn from_vec(bytes: Vec<u8>) -> Buffer {
        let limit = bytes.len();
        Buffer {
            storage: Storage::Heap(bytes),
            position: 0,
            limit,
        }
    }

    /// Allocates a fresh buffer of the same memory kind as `self`.
    pub fn allocate_like(&self, capacity: usize) -> Result<Buffer> {
        match self.kind() {
            MemoryKind::Heap => Ok(Buffer::with_capacity(capacity)),
            MemoryKind::Direct => Buffer::direct_with_capacity(capacity),
        }
    }

    /// The memory kind backing this buffer.
    pub fn kind(&self) -> MemoryKind {
        match self.storage {
            Storage::Heap(_) => MemoryKind::Heap,
            Storage::Direct { .. } => MemoryKind::Direct,
        }
    }

    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Heap(bytes) => bytes.len(),
            Storage::Direct { capacity, .. } => *capacity,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor.  Panics if `position > limit`.
    pub fn set_position(&mut self, position: usize) {
        assert!(
            position <= self.limit,
            "position {position} exceeds limit {}",
            self.limit
        );
        self.position = position;
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Moves the limit.  Panics if `limit > capacity`.  The position is
    /// clamped down if it would end up past the new limit.
    pub fn set_limit(&mut self, limit: usize) {
        assert!(
            limit <= self.capacity(),
            "limit {limit} exceeds capacity {}",
            self.capacity()
        );
        self.limit = limit;
        if self.position > limit {
            self.position = limit;
        }
    }

    /// Bytes left between position and limit.
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    /// Switches from writing to reading: `limit = position`, `position = 0`.
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// Resets for writing: `position = 0`, `limit = capacity`.
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity();
    }

    /// Rewinds the cursor to re-read: `position = 0`, limit untouched.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Copies `src` into the buffer at the current position, advancing it.
    /// Panics if fewer than `src.len()` bytes remain.
    pub fn put_slice(&mut self, src: &[u8]) {
        assert!(
            src.len() <= self.remaining(),
            "put of {} bytes overflows remaining {}",
            src.len(),
            self.remaining()
        );
        let position = self.position;
        match &mut self.storage {
            Storage::Heap(bytes) => {
                bytes[position..position + src.len()].copy_from_slice(src);
            }
            Storage::Direct { base, .. } => unsafe {
                std::ptr::copy_nonoverlapping(src.as_ptr(), base.as_ptr().add(position), src.len());
            },
        }
        self.position += src.len();
    }

    /// Drains `other`'s remaining bytes into this buffer, advancing both
    /// cursors.  Panics if this buffer cannot hold them.
    pub fn put_buffer(&mut self, other: &mut Buffer) {
        let transferred = other.read_remaining();
        self.put_slice(&transferred);
        other.position = other.limit;
    }

    /// Copies out the readable window `[position, limit)` without moving
    /// the cursor.
    pub fn read_remaining(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.remaining()];
        match &self.storage {
            Storage::Heap(bytes) => {
                out.copy_from_slice(&bytes[self.position..self.limit]);
            }
            Storage::Direct { base, .. } => unsafe {
                std::ptr::copy_nonoverlapping(
                    base.as_ptr().add(self.position),
                    out.as_mut_ptr(),
                    out.len(),
                );
            },
        }
        out
    }

    // ── Raw windows for the dispatch layer ───────────────────────────────
    //
    // The accessors below are only reached behind a `kind()` match; using
    // the wrong one is an internal logic error.

    pub(crate) fn backing(&self) -> &[u8] {
        match &self.storage {
            Storage::Heap(bytes) => bytes,
            Storage::Direct { .. } => unreachable!("heap accessor on direct buffer"),
        }
    }

    pub(crate) fn backing_mut(&mut self) -> &mut [u8] {
        match &mut self.storage {
            Storage::Heap(bytes) => bytes,
            Storage::Direct { .. } => unreachable!("heap accessor on direct buffer"),
        }
    }

    pub(crate) fn base_ptr(&self) -> *const u8 {
        match &self.storage {
            Storage::Direct { base, .. } => base.as_ptr(),
            Storage::Heap(_) => unreachable!("direct accessor on heap buffer"),
        }
    }

    pub(crate) fn base_ptr_mut(&mut self) -> *mut u8 {
        match &mut self.storage {
            Storage::Direct { base, .. } => base.as_ptr(),
            Storage::Heap(_) => unreachable!("direct accessor on heap buffer"),
        }
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        if let Storage::Direct { base, capacity } = self {
            if *capacity > 0 {
                unsafe { libc::free(base.as_ptr().cast()) };
            }
        }
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("kind", &self.kind())
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_flip_read() {
        let mut buf = Buffer::with_capacity(16);
        assert_eq!(buf.remaining(), 16);
        buf.put_slice(b"hello");
        assert_eq!(buf.position(), 5);
        buf.flip();
        assert_eq!(buf.limit(), 5);
        assert_eq!(buf.read_remaining(), b"hello");
        buf.clear();
        assert_eq!(buf.remaining(), 16);
    }

    #[test]
    fn direct_buffer_cursors() {
        let mut buf = Buffer::direct_with_capacity(8).unwrap();
        assert_eq!(buf.kind(), MemoryKind::Direct);
        buf.put_slice(&[1, 2, 3]);
        buf.flip();
        assert_eq!(buf.read_remaining(), vec![1, 2, 3]);
    }

    #[test]
    fn put_buffer_drains_source() {
        let mut src = Buffer::from_vec(b"abcd".to_vec());
        let mut dst = Buffer::direct_with_capacity(8).unwrap();
        dst.put_buffer(&mut src);
        assert!(!src.has_remaining());
        assert_eq!(dst.position(), 4);
        dst.flip();
        assert_eq!(dst.read_remaining(), b"abcd");
    }

    #[test]
    fn zero_capacity_direct() {
        let buf = Buffer::direct_with_capacity(0).unwrap();
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds limit")]
    fn position_past_limit_panics() {
        let mut buf = Buffer::with_capacity(4);
        buf.set_limit(2);
        buf.set_position(3);
    }

    #[test]
    #[should_panic(expected = "overflows remaining")]
    fn overfull_put_panics() {
        let mut buf = Buffer::with_capacity(2);
        buf.put_slice(b"xyz");
    }
}
