//! Pooled, buffer-aware safe bindings for the [libdeflate] compression
//! library.
//!
//! libdeflate's contexts are expensive to allocate and not thread-safe.
//! This crate keeps all of that behind safe Rust:
//!
//! * [`Compressor`] / [`Decompressor`] — owned, move-only context
//!   handles; `Send` but not `Sync`, freed exactly once on drop.
//! * [`PoolRegistry`] — lock-free free-lists of idle contexts (one per
//!   compression level for compressors) with reference-counted,
//!   best-effort idle collection per pool class.
//! * [`Buffer`] — cursor-carrying byte buffers, heap-backed or direct
//!   (`malloc`-backed); compress/decompress dispatch to the native call
//!   variant matching each buffer's memory kind and advance the cursors
//!   from the result.
//! * [`Decompressor::decompress_growing`] — restart-based geometric
//!   growth when the uncompressed size is unknown.
//! * [`compress_bound`] — the exact worst-case output-size formula.
//! * [`Crc32`] / [`Adler32`] — running checksum accumulators over
//!   libdeflate's checksum routines.
//!
//! The native library itself comes from `libdeflate-sys`; this crate
//! never exposes a raw pointer.
//!
//! [libdeflate]: https://github.com/ebiggers/libdeflate

pub mod buffer;
pub mod checksum;
pub mod compressor;
pub mod decompressor;
pub mod error;
mod ffi;
pub mod format;
pub mod pool;

pub use buffer::{Buffer, MemoryKind};
pub use checksum::{Adler32, Checksum, Crc32};
pub use compressor::Compressor;
pub use decompressor::{DecompressStatus, Decompressor};
pub use error::{Error, Result};
pub use format::{compress_bound, Format, MAX_LEVEL, MIN_LEVEL};
pub use pool::{PoolClass, PoolRegistry, UsageScope, POOLED_LEVELS};
