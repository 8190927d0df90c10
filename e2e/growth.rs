//! E2E: the unknown-size decompression growth loop.
//!
//! The loop restarts with doubled capacity until the output fits, so it
//! must finish with a capacity within one doubling past the true size,
//! and corrupt input must raise `BadData` instead of growing forever.

use libdeflate_pool::{
    compress_bound, Buffer, Compressor, Decompressor, Error, Format,
};

fn compress_all(data: &[u8], level: i32, format: Format) -> Vec<u8> {
    let mut compressor = Compressor::new(level, format).expect("compressor allocation");
    let mut dst = vec![0u8; compress_bound(data.len(), format)];
    let produced = compressor.compress(data, &mut dst).expect("compress");
    dst.truncate(produced);
    dst
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: growth terminates within the geometric bound
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_growth_terminates_within_geometric_bound() {
    let original = b"growth loop corpus line. ".repeat(40_000); // ~1 MiB
    let compressed = compress_all(&original, 6, Format::Zlib);

    for initial_capacity in [64usize, 1024, 65_536] {
        let mut src = Buffer::from_vec(compressed.clone());
        let dst = Buffer::with_capacity(initial_capacity);
        let mut decompressor = Decompressor::new(Format::Zlib).expect("decompressor allocation");
        let out = decompressor
            .decompress_growing(&mut src, dst)
            .expect("growth loop must terminate on valid input");

        assert_eq!(out.position(), original.len());
        // Doubling from the initial capacity never overshoots the true
        // size by more than one factor of two.
        let mut expected_capacity = initial_capacity;
        while expected_capacity < original.len() {
            expected_capacity <<= 1;
        }
        assert_eq!(out.capacity(), expected_capacity);

        let mut out = out;
        out.flip();
        assert_eq!(out.read_remaining(), original);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: an already-large destination succeeds on the first attempt
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_no_growth_when_destination_fits() {
    let original = b"fits on the first try".to_vec();
    let compressed = compress_all(&original, 12, Format::Gzip);

    let mut src = Buffer::from_vec(compressed);
    let dst = Buffer::with_capacity(4096);
    let mut decompressor = Decompressor::new(Format::Gzip).expect("decompressor allocation");
    let out = decompressor.decompress_growing(&mut src, dst).expect("decompress");
    assert_eq!(out.capacity(), 4096);
    assert_eq!(out.position(), original.len());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: direct destination buffers grow as direct buffers
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_growth_preserves_memory_kind() {
    let original = vec![7u8; 256 * 1024];
    let compressed = compress_all(&original, 1, Format::Deflate);

    let mut src = Buffer::from_vec(compressed);
    let dst = Buffer::direct_with_capacity(512).expect("direct allocation");
    let mut decompressor = Decompressor::new(Format::Deflate).expect("decompressor allocation");
    let out = decompressor.decompress_growing(&mut src, dst).expect("decompress");
    assert_eq!(out.kind(), libdeflate_pool::MemoryKind::Direct);
    assert_eq!(out.position(), original.len());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: corruption raises BadData instead of growing forever
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_corrupt_input_propagates_bad_data() {
    let original = b"corruption test corpus, long enough to matter. ".repeat(100);
    // gzip carries a CRC-32 trailer, so any bit flip is detected.
    let mut compressed = compress_all(&original, 9, Format::Gzip);
    assert!(compressed.len() >= 16);
    let middle = compressed.len() / 2;
    compressed[middle] ^= 0x10;

    let mut src = Buffer::from_vec(compressed);
    let dst = Buffer::with_capacity(64);
    let mut decompressor = Decompressor::new(Format::Gzip).expect("decompressor allocation");
    assert_eq!(
        decompressor.decompress_growing(&mut src, dst).err(),
        Some(Error::BadData)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: slice convenience wrapper
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_decompress_to_vec_grows_from_small_capacity() {
    let original = b"vector growth path ".repeat(3000);
    let compressed = compress_all(&original, 6, Format::Zlib);

    let mut decompressor = Decompressor::new(Format::Zlib).expect("decompressor allocation");
    let out = decompressor
        .decompress_to_vec(&compressed, 32)
        .expect("decompress");
    assert_eq!(out, original);
}
