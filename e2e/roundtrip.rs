//! E2E: compress → decompress round trips.
//!
//! Covers the representative corpora (empty, 1 byte, 64 KiB zeros,
//! 64 KiB random, 1 MiB repetitive text) across every compression level
//! and container format, plus the four (source, destination) memory-kind
//! combinations of the buffer dispatch path.

use libdeflate_pool::{
    compress_bound, Buffer, Compressor, Decompressor, Format, MAX_LEVEL, MIN_LEVEL,
};
use rand::RngCore;

fn corpora() -> Vec<(&'static str, Vec<u8>)> {
    let mut random = vec![0u8; 64 * 1024];
    rand::rng().fill_bytes(&mut random);
    vec![
        ("empty", Vec::new()),
        ("one_byte", vec![0x42]),
        ("zeros_64k", vec![0u8; 64 * 1024]),
        ("random_64k", random),
        (
            "repetitive_1m",
            b"The five boxing wizards jump quickly; pack my box. "
                .repeat(1024 * 1024 / 51 + 1),
        ),
    ]
}

fn roundtrip_slices(original: &[u8], level: i32, format: Format) {
    let mut compressor = Compressor::new(level, format).expect("compressor allocation");
    let mut compressed = vec![0u8; compress_bound(original.len(), format)];
    let produced = compressor
        .compress(original, &mut compressed)
        .expect("compression into a bound-sized buffer must succeed");
    compressed.truncate(produced);

    let mut decompressor = Decompressor::new(format).expect("decompressor allocation");
    let mut decompressed = vec![0u8; original.len()];
    let status = decompressor
        .decompress(&compressed, &mut decompressed)
        .expect("decompression of valid data must succeed");

    assert_eq!(status.produced, original.len());
    assert_eq!(status.consumed, compressed.len());
    assert_eq!(&decompressed[..status.produced], original);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: every corpus × every level × every format
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_all_levels_and_formats() {
    for (name, original) in corpora() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            for format in Format::ALL {
                // Large corpus at every level is slow; keep the full level
                // sweep for the small inputs and sample levels for 1 MiB.
                if name == "repetitive_1m" && ![0, 1, 6, MAX_LEVEL].contains(&level) {
                    continue;
                }
                roundtrip_slices(&original, level, format);
            }
        }
    }
}

#[test]
fn test_roundtrip_1m_full_level_sweep_zlib() {
    let (_, original) = corpora().pop().expect("corpus list is non-empty");
    for level in MIN_LEVEL..=MAX_LEVEL {
        roundtrip_slices(&original, level, Format::Zlib);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: buffer dispatch — all four memory-kind combinations
// ─────────────────────────────────────────────────────────────────────────────

fn buffer_of(kind_direct: bool, capacity: usize) -> Buffer {
    if kind_direct {
        Buffer::direct_with_capacity(capacity).expect("direct allocation")
    } else {
        Buffer::with_capacity(capacity)
    }
}

#[test]
fn test_buffer_roundtrip_all_kind_combinations() {
    let original = b"A man, a plan, a canal: Panama. ".repeat(512);
    let format = Format::Gzip;
    let mut compressor = Compressor::new(9, format).expect("compressor allocation");
    let mut decompressor = Decompressor::new(format).expect("decompressor allocation");

    for (src_direct, dst_direct) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut src = buffer_of(src_direct, original.len());
        src.put_slice(&original);
        src.flip();

        let mut dst = buffer_of(dst_direct, compress_bound(original.len(), format));
        let produced = compressor
            .compress_buffer(&mut src, &mut dst)
            .expect("compression must succeed");

        // Compress consumes its whole input and advances the write cursor
        // by exactly the produced length.
        assert_eq!(src.position(), src.limit());
        assert_eq!(dst.position(), produced);

        dst.flip();
        let mut out = buffer_of(src_direct, original.len());
        let status = decompressor
            .decompress_buffer(&mut dst, &mut out)
            .expect("decompression must succeed");

        assert_eq!(status.consumed, produced);
        assert_eq!(status.produced, original.len());
        assert_eq!(dst.position(), dst.limit());
        assert_eq!(out.position(), original.len());

        out.flip();
        assert_eq!(out.read_remaining(), original);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: compressing at an offset honours the cursor window
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_buffer_roundtrip_with_nonzero_positions() {
    let original = b"offset payload ".repeat(100);
    let format = Format::Zlib;
    let mut compressor = Compressor::new(6, format).expect("compressor allocation");

    // Source sits behind a 64-byte prefix that must not be compressed.
    let mut src = Buffer::with_capacity(64 + original.len());
    src.put_slice(&[0xEE; 64]);
    src.put_slice(&original);
    src.flip();
    src.set_position(64);

    let mut dst = Buffer::with_capacity(compress_bound(original.len(), format) + 16);
    dst.set_position(16);
    let produced = compressor
        .compress_buffer(&mut src, &mut dst)
        .expect("compression must succeed");
    assert_eq!(dst.position(), 16 + produced);

    dst.flip();
    dst.set_position(16);
    let mut decompressor = Decompressor::new(format).expect("decompressor allocation");
    let mut out = Buffer::with_capacity(original.len());
    decompressor
        .decompress_buffer(&mut dst, &mut out)
        .expect("decompression must succeed");
    out.flip();
    assert_eq!(out.read_remaining(), original);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: compress into a too-small destination fails cleanly
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compress_into_undersized_destination() {
    let mut random = vec![0u8; 4096];
    rand::rng().fill_bytes(&mut random);
    let mut compressor = Compressor::new(6, Format::Deflate).expect("compressor allocation");
    let mut tiny = vec![0u8; 16];
    assert_eq!(
        compressor.compress(&random, &mut tiny),
        Err(libdeflate_pool::Error::InsufficientSpace)
    );
}
