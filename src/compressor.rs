//! Owned compressor contexts and the compress dispatch path.

use std::ptr::NonNull;

use libdeflate_sys::libdeflate_compressor;

use crate::buffer::{Buffer, MemoryKind};
use crate::error::Result;
use crate::ffi;
use crate::format::{Format, MAX_LEVEL, MIN_LEVEL};

/// An owned libdeflate compressor context.
///
/// Allocation is expensive, so long-lived callers should recycle
/// compressors through a [`PoolRegistry`](crate::PoolRegistry) instead of
/// constructing one per operation.  A context is not reentrant: it is
/// `Send` (it may move between threads) but deliberately not `Sync`, and
/// every operation takes `&mut self`, so two calls can never overlap on
/// the same context.  Dropping the handle frees the native context,
/// exactly once.
pub struct Compressor {
    ctx: NonNull<libdeflate_compressor>,
    level: i32,
    format: Format,
}

// The native context is plain heap state with no thread affinity.
unsafe impl Send for Compressor {}

impl Compressor {
    /// Allocates a new compressor context for `level`.
    ///
    /// Returns [`Error::OutOfMemory`](crate::Error::OutOfMemory) when the
    /// native allocator fails.
    ///
    /// # Panics
    /// If `level` is outside `0..=12`.
    pub fn new(level: i32, format: Format) -> Result<Compressor> {
        assert!(
            (MIN_LEVEL..=MAX_LEVEL).contains(&level),
            "compression level {level} outside {MIN_LEVEL}..={MAX_LEVEL}"
        );
        let ctx = ffi::allocate_compressor(level)?;
        Ok(Compressor { ctx, level, format })
    }

    /// The compression level this context was allocated with.  Fixed for
    /// the lifetime of the context.
    pub fn level(&self) -> i32 {
        self.level
    }

    /// The container format applied to subsequent compress calls.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Changes the container format.  Pool acquisition resets this on
    /// every checkout; the format is not part of the context's identity.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Stable numeric identity of the underlying native context, for
    /// diagnostics and pool accounting.
    pub fn handle_id(&self) -> usize {
        self.ctx.as_ptr() as usize
    }

    /// Compresses all of `src` into `dst`, returning the produced length.
    ///
    /// Fails with [`Error::InsufficientSpace`](crate::Error::InsufficientSpace)
    /// if `dst` is too small; size it with
    /// [`compress_bound`](crate::compress_bound) to rule that out.
    pub fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        ffi::compress_both_heap(self.ctx, src, 0, src.len(), dst, 0, dst.len(), self.format)
    }

    /// Compresses `src`'s remaining bytes into `dst`'s remaining space.
    ///
    /// Dispatches to the native call variant matching each buffer's
    /// memory kind.  On success, `dst.position` advances by the produced
    /// length and `src.position` advances to `src.limit` — compression
    /// always consumes its entire input in one call.  On error neither
    /// cursor moves.
    pub fn compress_buffer(&mut self, src: &mut Buffer, dst: &mut Buffer) -> Result<usize> {
        let src_pos = src.position();
        let dst_pos = dst.position();
        let src_len = src.remaining();
        let dst_len = dst.remaining();
        let format = self.format;
        let produced = match (src.kind(), dst.kind()) {
            (MemoryKind::Heap, MemoryKind::Heap) => ffi::compress_both_heap(
                self.ctx,
                src.backing(),
                src_pos,
                src_len,
                dst.backing_mut(),
                dst_pos,
                dst_len,
                format,
            )?,
            (MemoryKind::Heap, MemoryKind::Direct) => unsafe {
                ffi::compress_destination_direct(
                    self.ctx,
                    src.backing(),
                    src_pos,
                    src_len,
                    dst.base_ptr_mut(),
                    dst_pos,
                    dst_len,
                    format,
                )?
            },
            (MemoryKind::Direct, MemoryKind::Heap) => unsafe {
                ffi::compress_source_direct(
                    self.ctx,
                    src.base_ptr(),
                    src_pos,
                    src_len,
                    dst.backing_mut(),
                    dst_pos,
                    dst_len,
                    format,
                )?
            },
            (MemoryKind::Direct, MemoryKind::Direct) => unsafe {
                ffi::compress_both_direct(
                    self.ctx,
                    src.base_ptr(),
                    src_pos,
                    src_len,
                    dst.base_ptr_mut(),
                    dst_pos,
                    dst_len,
                    format,
                )?
            },
        };
        dst.set_position(dst_pos + produced);
        src.set_position(src_pos + src_len);
        Ok(produced)
    }
}

impl Drop for Compressor {
    fn drop(&mut self) {
        ffi::free_compressor(self.ctx);
    }
}

impl std::fmt::Debug for Compressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compressor")
            .field("level", &self.level)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
