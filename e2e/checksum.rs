//! E2E: checksum accumulators.
//!
//! Determinism across the single-byte, whole-slice, sliced, and buffer
//! update paths, plus the published reference vectors.

use libdeflate_pool::{Adler32, Buffer, Checksum, Crc32};
use rand::RngCore;

fn sample() -> Vec<u8> {
    let mut data = vec![0u8; 8192];
    rand::rng().fill_bytes(&mut data);
    data
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: reference vectors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_crc32_reference_vector() {
    let mut crc = Crc32::new();
    crc.update(b"123456789");
    assert_eq!(crc.value(), 0xCBF4_3926);
}

#[test]
fn test_adler32_reference_vector() {
    let mut adler = Adler32::new();
    adler.update(b"123456789");
    assert_eq!(adler.value(), 0x091E_01DE);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: all update paths agree
// ─────────────────────────────────────────────────────────────────────────────

fn all_paths_agree<C: Checksum>(mut checksum: C, data: &[u8]) {
    checksum.reset();
    checksum.update(data);
    let whole = checksum.value();

    checksum.reset();
    for &byte in data {
        checksum.update_byte(byte);
    }
    assert_eq!(checksum.value(), whole, "single-byte path diverged");

    checksum.reset();
    for chunk in data.chunks(7) {
        checksum.update(chunk);
    }
    assert_eq!(checksum.value(), whole, "sliced path diverged");

    // Heap buffer path.
    checksum.reset();
    let mut heap = Buffer::with_capacity(data.len());
    heap.put_slice(data);
    heap.flip();
    checksum.update_buffer(&mut heap);
    assert_eq!(checksum.value(), whole, "heap buffer path diverged");
    assert_eq!(heap.position(), heap.limit());

    // Direct buffer path.
    checksum.reset();
    let mut direct = Buffer::direct_with_capacity(data.len()).expect("direct allocation");
    direct.put_slice(data);
    direct.flip();
    checksum.update_buffer(&mut direct);
    assert_eq!(checksum.value(), whole, "direct buffer path diverged");
    assert_eq!(direct.position(), direct.limit());
}

#[test]
fn test_crc32_update_paths_are_deterministic() {
    all_paths_agree(Crc32::new(), &sample());
}

#[test]
fn test_adler32_update_paths_are_deterministic() {
    all_paths_agree(Adler32::new(), &sample());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: buffer updates respect a partial window
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_buffer_update_uses_cursor_window() {
    let data = b"....window....";
    let mut buffer = Buffer::with_capacity(data.len());
    buffer.put_slice(data);
    buffer.flip();
    buffer.set_position(4);
    buffer.set_limit(10);

    let mut windowed = Crc32::new();
    windowed.update_buffer(&mut buffer);

    let mut direct = Crc32::new();
    direct.update(b"window");
    assert_eq!(windowed.value(), direct.value());
    assert_eq!(buffer.position(), 10);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: accumulation continues across updates until reset
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_running_state_accumulates_until_reset() {
    let mut split = Crc32::new();
    split.update(b"hello ");
    split.update(b"world");

    let mut whole = Crc32::new();
    whole.update(b"hello world");
    assert_eq!(split.value(), whole.value());

    split.reset();
    split.update(b"world");
    assert_ne!(split.value(), whole.value());
}
