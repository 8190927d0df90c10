//! E2E: the worst-case compressed-size bound.
//!
//! The formula is a compatibility contract (5 bytes per started
//! 5000-byte block, at least 5, plus container framing), and compressing
//! any input into a bound-sized buffer must succeed at every level.

use libdeflate_pool::{compress_bound, Compressor, Format, MAX_LEVEL, MIN_LEVEL};
use rand::RngCore;

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: formula fixed points
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bound_formula_fixed_points() {
    // (input, deflate, zlib, gzip)
    let cases: &[(usize, usize, usize, usize)] = &[
        (0, 5, 11, 23),
        (1, 6, 12, 24),
        (4999, 5004, 5010, 5022),
        (5000, 5005, 5011, 5023),
        (5001, 5011, 5017, 5029),
        (100_000, 100_100, 100_106, 100_118),
    ];
    for &(input, deflate, zlib, gzip) in cases {
        assert_eq!(compress_bound(input, Format::Deflate), deflate, "s={input}");
        assert_eq!(compress_bound(input, Format::Zlib), zlib, "s={input}");
        assert_eq!(compress_bound(input, Format::Gzip), gzip, "s={input}");
    }
}

#[test]
fn test_bound_is_monotone() {
    for format in Format::ALL {
        let mut previous = 0;
        for input in (0..20_000).step_by(77) {
            let bound = compress_bound(input, format);
            assert!(bound > input);
            assert!(bound >= previous);
            previous = bound;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: output never exceeds the bound
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compressed_output_fits_in_bound() {
    let mut rng = rand::rng();
    for &size in &[0usize, 1, 17, 4999, 5000, 5001, 65_536] {
        // Incompressible input is the worst case for expansion.
        let mut input = vec![0u8; size];
        rng.fill_bytes(&mut input);
        for format in Format::ALL {
            for level in MIN_LEVEL..=MAX_LEVEL {
                let bound = compress_bound(size, format);
                let mut dst = vec![0u8; bound];
                let mut compressor =
                    Compressor::new(level, format).expect("compressor allocation");
                let produced = compressor
                    .compress(&input, &mut dst)
                    .expect("bound-sized destination must be large enough");
                assert!(
                    produced <= bound,
                    "size {size} level {level} {format:?}: produced {produced} > bound {bound}"
                );
            }
        }
    }
}
