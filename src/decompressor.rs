//! Owned decompressor contexts, the decompress dispatch path, and the
//! restart-based growth loop for unknown output sizes.

use std::ptr::NonNull;

use libdeflate_sys::libdeflate_decompressor;

use crate::buffer::{Buffer, MemoryKind};
use crate::error::{Error, Result};
use crate::ffi;
use crate::format::Format;

/// Outcome of one decompress call: how much input was consumed and how
/// much output was produced.
///
/// The native layer reports these as a single packed word; the FFI
/// boundary unpacks them immediately and everything above works with the
/// two explicit fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressStatus {
    /// Compressed bytes read from the source.
    pub consumed: usize,
    /// Uncompressed bytes written to the destination.
    pub produced: usize,
}

/// An owned libdeflate decompressor context.
///
/// Level-less (one decompressor handles every compression level), with
/// the same ownership rules as [`Compressor`](crate::Compressor): `Send`
/// but not `Sync`, every operation takes `&mut self`, dropped exactly
/// once.
pub struct Decompressor {
    ctx: NonNull<libdeflate_decompressor>,
    format: Format,
}

unsafe impl Send for Decompressor {}

impl Decompressor {
    /// Allocates a new decompressor context.
    pub fn new(format: Format) -> Result<Decompressor> {
        let ctx = ffi::allocate_decompressor()?;
        Ok(Decompressor { ctx, format })
    }

    /// The container format expected by subsequent decompress calls.
    pub fn format(&self) -> Format {
        self.format
    }

    pub fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// Stable numeric identity of the underlying native context.
    pub fn handle_id(&self) -> usize {
        self.ctx.as_ptr() as usize
    }

    /// Decompresses `src` into `dst`.
    ///
    /// `Err(BadData)` for corrupt or truncated input,
    /// `Err(InsufficientSpace)` when `dst` cannot hold the whole output —
    /// there is no native resume primitive, so the only recovery is to
    /// retry the entire call with a larger destination (see
    /// [`decompress_growing`](Self::decompress_growing)).
    pub fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<DecompressStatus> {
        ffi::decompress_both_heap(self.ctx, src, 0, src.len(), dst, 0, dst.len(), self.format)
    }

    /// Decompresses `src`'s remaining bytes into `dst`'s remaining space,
    /// dispatching on each buffer's memory kind.
    ///
    /// On success, `src.position` advances by `consumed` and
    /// `dst.position` by `produced`.  Error sentinels are checked before
    /// any cursor update, so on `Err` both buffers are untouched.
    pub fn decompress_buffer(
        &mut self,
        src: &mut Buffer,
        dst: &mut Buffer,
    ) -> Result<DecompressStatus> {
        let src_pos = src.position();
        let dst_pos = dst.position();
        let src_len = src.remaining();
        let dst_len = dst.remaining();
        let format = self.format;
        let status = match (src.kind(), dst.kind()) {
            (MemoryKind::Heap, MemoryKind::Heap) => ffi::decompress_both_heap(
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
                ffi::decompress_destination_direct(
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
                ffi::decompress_source_direct(
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
                ffi::decompress_both_direct(
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
        dst.set_position(dst_pos + status.produced);
        src.set_position(src_pos + status.consumed);
        Ok(status)
    }

    /// Decompresses data of unknown uncompressed size, growing the
    /// destination geometrically.
    ///
    /// Each `InsufficientSpace` failure discards the attempt: a new
    /// buffer of the same memory kind and double the capacity is
    /// allocated, any bytes the failed attempt committed are carried
    /// forward (none, in the too-small case), and the *entire* call is
    /// retried against the full source.  `BadData` propagates out
    /// instead of triggering further growth, so corrupt input terminates
    /// the loop.
    ///
    /// # Panics
    /// If `dst` has zero capacity (doubling could never make progress).
    pub fn decompress_growing(&mut self, src: &mut Buffer, mut dst: Buffer) -> Result<Buffer> {
        assert!(dst.capacity() > 0, "growth loop needs a non-zero initial capacity");
        loop {
            match self.decompress_buffer(src, &mut dst) {
                Ok(_) => return Ok(dst),
                Err(Error::InsufficientSpace) => {
                    let mut grown = dst.allocate_like(dst.capacity() << 1)?;
                    dst.flip();
                    grown.put_buffer(&mut dst);
                    dst = grown;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Slice convenience over the growth loop: decompresses `src` into a
    /// vector sized by doubling from `initial_capacity`.
    pub fn decompress_to_vec(&mut self, src: &[u8], initial_capacity: usize) -> Result<Vec<u8>> {
        let mut capacity = initial_capacity.max(1);
        loop {
            let mut dst = vec![0u8; capacity];
            match self.decompress(src, &mut dst) {
                Ok(status) => {
                    dst.truncate(status.produced);
                    return Ok(dst);
                }
                Err(Error::InsufficientSpace) => capacity <<= 1,
                Err(err) => return Err(err),
            }
        }
    }
}

impl Drop for Decompressor {
    fn drop(&mut self) {
        ffi::free_decompressor(self.ctx);
    }
}

impl std::fmt::Debug for Decompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decompressor")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
