//! Container formats and the worst-case compressed-size bound.

/// Lowest supported compression level (stored blocks, no compression).
pub const MIN_LEVEL: i32 = 0;

/// Highest supported compression level.
pub const MAX_LEVEL: i32 = 12;

/// Compressed-container framing understood by libdeflate.
///
/// The numeric codes (0/1/2) match the native layer's convention and are
/// only materialised at the FFI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Raw DEFLATE stream, no framing.
    Deflate,
    /// zlib wrapper (2-byte header + Adler-32 trailer).
    Zlib,
    /// gzip wrapper (10-byte header + CRC-32/size trailer).
    Gzip,
}

impl Format {
    /// All supported formats, in native-code order.
    pub const ALL: [Format; 3] = [Format::Deflate, Format::Zlib, Format::Gzip];

    /// The native integer code for this format.
    #[inline]
    pub const fn code(self) -> i32 {
        match self {
            Format::Deflate => 0,
            Format::Zlib => 1,
            Format::Gzip => 2,
        }
    }

    /// Parses a native format code.
    pub fn from_code(code: i32) -> Option<Format> {
        match code {
            0 => Some(Format::Deflate),
            1 => Some(Format::Zlib),
            2 => Some(Format::Gzip),
            _ => None,
        }
    }

    /// Fixed per-stream framing overhead in bytes (header + trailer).
    #[inline]
    pub const fn framing_overhead(self) -> usize {
        match self {
            Format::Deflate => 0,
            Format::Zlib => 6,
            Format::Gzip => 18,
        }
    }
}

/// Worst-case compressed size for an input of `input_len` bytes in the
/// given container format, valid for every compression level.
///
/// A destination buffer of this size is guaranteed large enough for
/// [`Compressor::compress`](crate::Compressor::compress) to succeed.
/// The formula is part of the wire-compatibility contract and must not
/// be "improved": 5 bytes of overhead per started 5000-byte block (at
/// least 5), plus the container framing.
#[inline]
pub fn compress_bound(input_len: usize, format: Format) -> usize {
    let block_overhead = ((input_len + 4999) / 5000) * 5;
    input_len + block_overhead.max(5) + format.framing_overhead()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_minimum_overhead() {
        // Zero-length input still pays the 5-byte minimum plus framing.
        assert_eq!(compress_bound(0, Format::Deflate), 5);
        assert_eq!(compress_bound(0, Format::Zlib), 11);
        assert_eq!(compress_bound(0, Format::Gzip), 23);
    }

    #[test]
    fn bound_block_boundaries() {
        // One block up to 5000 bytes, 5 bytes of overhead.
        assert_eq!(compress_bound(1, Format::Deflate), 6);
        assert_eq!(compress_bound(5000, Format::Deflate), 5005);
        // 5001 starts a second block.
        assert_eq!(compress_bound(5001, Format::Deflate), 5011);
        assert_eq!(compress_bound(10_000, Format::Deflate), 10_010);
        assert_eq!(compress_bound(10_001, Format::Zlib), 10_016 + 6);
    }

    #[test]
    fn format_codes_round_trip() {
        for format in Format::ALL {
            assert_eq!(Format::from_code(format.code()), Some(format));
        }
        assert_eq!(Format::from_code(3), None);
        assert_eq!(Format::from_code(-1), None);
    }
}
