//! Unsafe boundary over `libdeflate-sys`.
//!
//! Everything `unsafe` about talking to the native library lives here.
//! Each operation is exposed as one function per (source, destination)
//! memory-kind combination — four for compress, four for decompress, two
//! per checksum family — all funnelling into a single `perform_*` core
//! that selects the deflate/zlib/gzip entry point by [`Format`].
//!
//! Native sentinels are converted to [`Error`] values here, before any
//! caller-visible cursor state is touched:
//!
//! * a null context from an allocator ⇒ [`Error::OutOfMemory`]
//! * produced length 0 from compress ⇒ [`Error::InsufficientSpace`]
//! * `LIBDEFLATE_BAD_DATA` ⇒ [`Error::BadData`]
//! * `LIBDEFLATE_INSUFFICIENT_SPACE` ⇒ [`Error::InsufficientSpace`]
//!
//! Decompress results cross this boundary as an explicit two-field
//! [`DecompressStatus`] record rather than a packed word.

use std::os::raw::c_void;
use std::ptr::NonNull;

use libdeflate_sys::{
    libdeflate_adler32, libdeflate_alloc_compressor, libdeflate_alloc_decompressor,
    libdeflate_compressor, libdeflate_crc32, libdeflate_decompressor, libdeflate_deflate_compress,
    libdeflate_deflate_decompress_ex, libdeflate_free_compressor, libdeflate_free_decompressor,
    libdeflate_gzip_compress, libdeflate_gzip_decompress_ex,
    libdeflate_result_LIBDEFLATE_BAD_DATA, libdeflate_result_LIBDEFLATE_INSUFFICIENT_SPACE,
    libdeflate_zlib_compress, libdeflate_zlib_decompress_ex,
};

use crate::decompressor::DecompressStatus;
use crate::error::{Error, Result};
use crate::format::Format;

// ── Context lifecycle ─────────────────────────────────────────────────────

pub(crate) fn allocate_compressor(level: i32) -> Result<NonNull<libdeflate_compressor>> {
    NonNull::new(unsafe { libdeflate_alloc_compressor(level) }).ok_or(Error::OutOfMemory)
}

pub(crate) fn allocate_decompressor() -> Result<NonNull<libdeflate_decompressor>> {
    NonNull::new(unsafe { libdeflate_alloc_decompressor() }).ok_or(Error::OutOfMemory)
}

/// Releases a compressor context.  Must be called exactly once per
/// allocated context; the owning handle's `Drop` is the only caller.
pub(crate) fn free_compressor(ctx: NonNull<libdeflate_compressor>) {
    unsafe { libdeflate_free_compressor(ctx.as_ptr()) }
}

pub(crate) fn free_decompressor(ctx: NonNull<libdeflate_decompressor>) {
    unsafe { libdeflate_free_decompressor(ctx.as_ptr()) }
}

// ── Compression ───────────────────────────────────────────────────────────

/// Core compress call.
///
/// # Safety
/// `in_ptr`/`out_ptr` must be valid for `in_len` reads / `out_len` writes
/// and `ctx` must not be used concurrently from another thread.
unsafe fn perform_compression(
    ctx: NonNull<libdeflate_compressor>,
    in_ptr: *const u8,
    in_len: usize,
    out_ptr: *mut u8,
    out_len: usize,
    format: Format,
) -> Result<usize> {
    let in_ptr = in_ptr as *const c_void;
    let out_ptr = out_ptr as *mut c_void;
    let produced = match format {
        Format::Deflate => libdeflate_deflate_compress(ctx.as_ptr(), in_ptr, in_len, out_ptr, out_len),
        Format::Zlib => libdeflate_zlib_compress(ctx.as_ptr(), in_ptr, in_len, out_ptr, out_len),
        Format::Gzip => libdeflate_gzip_compress(ctx.as_ptr(), in_ptr, in_len, out_ptr, out_len),
    };
    if produced == 0 {
        Err(Error::InsufficientSpace)
    } else {
        Ok(produced)
    }
}

pub(crate) fn compress_both_heap(
    ctx: NonNull<libdeflate_compressor>,
    src: &[u8],
    src_off: usize,
    src_len: usize,
    dst: &mut [u8],
    dst_off: usize,
    dst_len: usize,
    format: Format,
) -> Result<usize> {
    debug_assert!(src_off + src_len <= src.len());
    debug_assert!(dst_off + dst_len <= dst.len());
    unsafe {
        perform_compression(
            ctx,
            src.as_ptr().add(src_off),
            src_len,
            dst.as_mut_ptr().add(dst_off),
            dst_len,
            format,
        )
    }
}

/// # Safety
/// `src_base + src_off` must be valid for `src_len` reads.
pub(crate) unsafe fn compress_source_direct(
    ctx: NonNull<libdeflate_compressor>,
    src_base: *const u8,
    src_off: usize,
    src_len: usize,
    dst: &mut [u8],
    dst_off: usize,
    dst_len: usize,
    format: Format,
) -> Result<usize> {
    debug_assert!(dst_off + dst_len <= dst.len());
    perform_compression(
        ctx,
        src_base.add(src_off),
        src_len,
        dst.as_mut_ptr().add(dst_off),
        dst_len,
        format,
    )
}

/// # Safety
/// `dst_base + dst_off` must be valid for `dst_len` writes.
pub(crate) unsafe fn compress_destination_direct(
    ctx: NonNull<libdeflate_compressor>,
    src: &[u8],
    src_off: usize,
    src_len: usize,
    dst_base: *mut u8,
    dst_off: usize,
    dst_len: usize,
    format: Format,
) -> Result<usize> {
    debug_assert!(src_off + src_len <= src.len());
    perform_compression(
        ctx,
        src.as_ptr().add(src_off),
        src_len,
        dst_base.add(dst_off),
        dst_len,
        format,
    )
}

/// # Safety
/// Both raw windows must be valid for their stated lengths.
pub(crate) unsafe fn compress_both_direct(
    ctx: NonNull<libdeflate_compressor>,
    src_base: *const u8,
    src_off: usize,
    src_len: usize,
    dst_base: *mut u8,
    dst_off: usize,
    dst_len: usize,
    format: Format,
) -> Result<usize> {
    perform_compression(
        ctx,
        src_base.add(src_off),
        src_len,
        dst_base.add(dst_off),
        dst_len,
        format,
    )
}

// ── Decompression ─────────────────────────────────────────────────────────

/// Core decompress call via the `_ex` entry points, which report both
/// bytes consumed and bytes produced.
///
/// # Safety
/// Same contract as [`perform_compression`].
unsafe fn perform_decompression(
    ctx: NonNull<libdeflate_decompressor>,
    in_ptr: *const u8,
    in_len: usize,
    out_ptr: *mut u8,
    out_len: usize,
    format: Format,
) -> Result<DecompressStatus> {
    let in_ptr = in_ptr as *const c_void;
    let out_ptr = out_ptr as *mut c_void;
    let mut consumed: usize = 0;
    let mut produced: usize = 0;
    let result = match format {
        Format::Deflate => libdeflate_deflate_decompress_ex(
            ctx.as_ptr(),
            in_ptr,
            in_len,
            out_ptr,
            out_len,
            &mut consumed,
            &mut produced,
        ),
        Format::Zlib => libdeflate_zlib_decompress_ex(
            ctx.as_ptr(),
            in_ptr,
            in_len,
            out_ptr,
            out_len,
            &mut consumed,
            &mut produced,
        ),
        Format::Gzip => libdeflate_gzip_decompress_ex(
            ctx.as_ptr(),
            in_ptr,
            in_len,
            out_ptr,
            out_len,
            &mut consumed,
            &mut produced,
        ),
    };
    if result == libdeflate_result_LIBDEFLATE_BAD_DATA {
        Err(Error::BadData)
    } else if result == libdeflate_result_LIBDEFLATE_INSUFFICIENT_SPACE {
        Err(Error::InsufficientSpace)
    } else {
        Ok(DecompressStatus { consumed, produced })
    }
}

pub(crate) fn decompress_both_heap(
    ctx: NonNull<libdeflate_decompressor>,
    src: &[u8],
    src_off: usize,
    src_len: usize,
    dst: &mut [u8],
    dst_off: usize,
    dst_len: usize,
    format: Format,
) -> Result<DecompressStatus> {
    debug_assert!(src_off + src_len <= src.len());
    debug_assert!(dst_off + dst_len <= dst.len());
    unsafe {
        perform_decompression(
            ctx,
            src.as_ptr().add(src_off),
            src_len,
            dst.as_mut_ptr().add(dst_off),
            dst_len,
            format,
        )
    }
}

/// # Safety
/// `src_base + src_off` must be valid for `src_len` reads.
pub(crate) unsafe fn decompress_source_direct(
    ctx: NonNull<libdeflate_decompressor>,
    src_base: *const u8,
    src_off: usize,
    src_len: usize,
    dst: &mut [u8],
    dst_off: usize,
    dst_len: usize,
    format: Format,
) -> Result<DecompressStatus> {
    debug_assert!(dst_off + dst_len <= dst.len());
    perform_decompression(
        ctx,
        src_base.add(src_off),
        src_len,
        dst.as_mut_ptr().add(dst_off),
        dst_len,
        format,
    )
}

/// # Safety
/// `dst_base + dst_off` must be valid for `dst_len` writes.
pub(crate) unsafe fn decompress_destination_direct(
    ctx: NonNull<libdeflate_decompressor>,
    src: &[u8],
    src_off: usize,
    src_len: usize,
    dst_base: *mut u8,
    dst_off: usize,
    dst_len: usize,
    format: Format,
) -> Result<DecompressStatus> {
    debug_assert!(src_off + src_len <= src.len());
    perform_decompression(
        ctx,
        src.as_ptr().add(src_off),
        src_len,
        dst_base.add(dst_off),
        dst_len,
        format,
    )
}

/// # Safety
/// Both raw windows must be valid for their stated lengths.
pub(crate) unsafe fn decompress_both_direct(
    ctx: NonNull<libdeflate_decompressor>,
    src_base: *const u8,
    src_off: usize,
    src_len: usize,
    dst_base: *mut u8,
    dst_off: usize,
    dst_len: usize,
    format: Format,
) -> Result<DecompressStatus> {
    perform_decompression(
        ctx,
        src_base.add(src_off),
        src_len,
        dst_base.add(dst_off),
        dst_len,
        format,
    )
}

// ── Checksums ─────────────────────────────────────────────────────────────

pub(crate) fn crc32_heap(seed: u32, buf: &[u8], off: usize, len: usize) -> u32 {
    debug_assert!(off + len <= buf.len());
    unsafe { libdeflate_crc32(seed, buf.as_ptr().add(off) as *const c_void, len) }
}

/// # Safety
/// `base + off` must be valid for `len` reads.
pub(crate) unsafe fn crc32_direct(seed: u32, base: *const u8, off: usize, len: usize) -> u32 {
    libdeflate_crc32(seed, base.add(off) as *const c_void, len)
}

pub(crate) fn adler32_heap(seed: u32, buf: &[u8], off: usize, len: usize) -> u32 {
    debug_assert!(off + len <= buf.len());
    unsafe { libdeflate_adler32(seed, buf.as_ptr().add(off) as *const c_void, len) }
}

/// # Safety
/// `base + off` must be valid for `len` reads.
pub(crate) unsafe fn adler32_direct(seed: u32, base: *const u8, off: usize, len: usize) -> u32 {
    libdeflate_adler32(seed, base.add(off) as *const c_void, len)
}
