//! Running CRC-32 and Adler-32 accumulators over libdeflate's routines.
//!
//! No pooling and no context handle: the native checksum calls are
//! stateless, taking the running value and returning the updated one.

use crate::buffer::{Buffer, MemoryKind};
use crate::ffi;

const CRC32_SEED: u32 = 0;
const ADLER32_SEED: u32 = 1;

/// A running checksum over a byte stream.
///
/// Feeding the same bytes through any mix of the update paths yields the
/// same final value.
pub trait Checksum {
    /// Feeds a single byte.
    fn update_byte(&mut self, byte: u8);

    /// Feeds a slice (use subslices for ranged updates).
    fn update(&mut self, data: &[u8]);

    /// Feeds a buffer's remaining bytes, dispatching on its memory kind,
    /// and advances its position to the limit.
    fn update_buffer(&mut self, buffer: &mut Buffer);

    /// The current accumulator, widened to an unsigned 64-bit value.
    fn value(&self) -> u64;

    /// Restores the algorithm's seed value.
    fn reset(&mut self);
}

/// CRC-32 (the gzip/zip polynomial), seeded with 0.
#[derive(Debug, Clone)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    pub fn new() -> Crc32 {
        Crc32 { state: CRC32_SEED }
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Crc32::new()
    }
}

impl Checksum for Crc32 {
    fn update_byte(&mut self, byte: u8) {
        self.state = ffi::crc32_heap(self.state, &[byte], 0, 1);
    }

    fn update(&mut self, data: &[u8]) {
        self.state = ffi::crc32_heap(self.state, data, 0, data.len());
    }

    fn update_buffer(&mut self, buffer: &mut Buffer) {
        let position = buffer.position();
        let len = buffer.remaining();
        self.state = match buffer.kind() {
            MemoryKind::Heap => ffi::crc32_heap(self.state, buffer.backing(), position, len),
            MemoryKind::Direct => unsafe {
                ffi::crc32_direct(self.state, buffer.base_ptr(), position, len)
            },
        };
        buffer.set_position(buffer.limit());
    }

    fn value(&self) -> u64 {
        u64::from(self.state)
    }

    fn reset(&mut self) {
        self.state = CRC32_SEED;
    }
}

/// Adler-32 (the zlib checksum), seeded with 1.
#[derive(Debug, Clone)]
pub struct Adler32 {
    state: u32,
}

impl Adler32 {
    pub fn new() -> Adler32 {
        Adler32 {
            state: ADLER32_SEED,
        }
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Adler32::new()
    }
}

impl Checksum for Adler32 {
    fn update_byte(&mut self, byte: u8) {
        self.state = ffi::adler32_heap(self.state, &[byte], 0, 1);
    }

    fn update(&mut self, data: &[u8]) {
        self.state = ffi::adler32_heap(self.state, data, 0, data.len());
    }

    fn update_buffer(&mut self, buffer: &mut Buffer) {
        let position = buffer.position();
        let len = buffer.remaining();
        self.state = match buffer.kind() {
            MemoryKind::Heap => ffi::adler32_heap(self.state, buffer.backing(), position, len),
            MemoryKind::Direct => unsafe {
                ffi::adler32_direct(self.state, buffer.base_ptr(), position, len)
            },
        };
        buffer.set_position(buffer.limit());
    }

    fn value(&self) -> u64 {
        u64::from(self.state)
    }

    fn reset(&mut self) {
        self.state = ADLER32_SEED;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_and_reset() {
        let mut crc = Crc32::new();
        let mut adler = Adler32::new();
        assert_eq!(crc.value(), 0);
        assert_eq!(adler.value(), 1);
        crc.update(b"data");
        adler.update(b"data");
        crc.reset();
        adler.reset();
        assert_eq!(crc.value(), 0);
        assert_eq!(adler.value(), 1);
    }

    #[test]
    fn empty_update_is_identity() {
        let mut crc = Crc32::new();
        crc.update(b"abc");
        let before = crc.value();
        crc.update(&[]);
        assert_eq!(crc.value(), before);
    }
}
