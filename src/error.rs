//! Error taxonomy for the binding layer.
//!
//! Native sentinel codes are converted into these variants at the FFI
//! boundary (`ffi.rs`); nothing downstream ever sees a raw return code.
//! Use-after-release is not an error variant because it is not
//! representable: handles are owned values and releasing one consumes it.

use thiserror::Error;

/// Alias for the result type of libdeflate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by compression, decompression, and pool operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The native allocator returned a null context, or the native layer
    /// failed an internal allocation mid-operation.
    #[error("libdeflate context allocation failed")]
    OutOfMemory,

    /// The compressed input is corrupt, truncated, or not in the expected
    /// container format.
    #[error("compressed data is corrupt or truncated")]
    BadData,

    /// The destination buffer is too small to hold the produced output.
    /// For unknown-size decompression this drives the growth loop in
    /// [`Decompressor::decompress_growing`](crate::Decompressor::decompress_growing).
    #[error("destination buffer too small for the produced output")]
    InsufficientSpace,
}
