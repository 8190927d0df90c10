//! E2E: pool correctness under contention.
//!
//! The pool's core property is mutual exclusion: a context is never
//! issued to two concurrent acquirers.  Also checks single-threaded
//! reuse and that pooled handles still do useful work after recycling.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;

use libdeflate_pool::{compress_bound, Format, PoolRegistry};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: mutual exclusion across threads
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_no_handle_is_checked_out_twice() {
    const THREADS: usize = 8;
    const CYCLES: usize = 250;

    let registry = Arc::new(PoolRegistry::new());
    let checked_out: Arc<Mutex<HashSet<usize>>> = Arc::new(Mutex::new(HashSet::new()));
    let payload = b"mutual exclusion payload ".repeat(64);

    let mut handles = Vec::new();
    for _ in 0..THREADS {
        let registry = Arc::clone(&registry);
        let checked_out = Arc::clone(&checked_out);
        let payload = payload.clone();
        handles.push(thread::spawn(move || {
            let mut dst = vec![0u8; compress_bound(payload.len(), Format::Zlib)];
            for _ in 0..CYCLES {
                let mut compressor = registry
                    .acquire_compressor(6, Format::Zlib)
                    .expect("acquire");
                let id = compressor.handle_id();
                {
                    let mut set = checked_out.lock().expect("lock");
                    assert!(
                        set.insert(id),
                        "context {id:#x} issued to two concurrent acquirers"
                    );
                }
                // Exercise the context while it is checked out.
                compressor.compress(&payload, &mut dst).expect("compress");
                {
                    let mut set = checked_out.lock().expect("lock");
                    assert!(set.remove(&id));
                }
                registry.release_compressor(compressor);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    // Everything was returned; at most THREADS contexts ever existed.
    assert!(registry.idle_compressors(6) <= THREADS);
    assert!(registry.idle_compressors(6) >= 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: immediate reuse, single-threaded
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_release_then_acquire_returns_same_handle() {
    let registry = PoolRegistry::new();
    for level in 1..=12 {
        let compressor = registry
            .acquire_compressor(level, Format::Deflate)
            .expect("acquire");
        let id = compressor.handle_id();
        registry.release_compressor(compressor);

        let reused = registry
            .acquire_compressor(level, Format::Gzip)
            .expect("acquire");
        assert_eq!(reused.handle_id(), id, "level {level}");
        assert_eq!(reused.format(), Format::Gzip);
        registry.release_compressor(reused);
    }

    let decompressor = registry
        .acquire_decompressor(Format::Zlib)
        .expect("acquire");
    let id = decompressor.handle_id();
    registry.release_decompressor(decompressor);
    let reused = registry
        .acquire_decompressor(Format::Deflate)
        .expect("acquire");
    assert_eq!(reused.handle_id(), id);
    registry.release_decompressor(reused);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: levels pool independently
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_levels_have_independent_free_lists() {
    let registry = PoolRegistry::new();
    let low = registry.acquire_compressor(1, Format::Deflate).expect("acquire");
    let high = registry.acquire_compressor(12, Format::Deflate).expect("acquire");
    assert_eq!(low.level(), 1);
    assert_eq!(high.level(), 12);
    registry.release_compressor(low);
    registry.release_compressor(high);

    assert_eq!(registry.idle_compressors(1), 1);
    assert_eq!(registry.idle_compressors(12), 1);
    assert_eq!(registry.idle_compressors(6), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: a recycled context still round-trips correctly
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_recycled_context_round_trips() {
    let registry = PoolRegistry::new();
    let original = b"recycled context payload ".repeat(200);

    for format in Format::ALL {
        let mut compressor = registry.acquire_compressor(4, format).expect("acquire");
        let mut compressed = vec![0u8; compress_bound(original.len(), format)];
        let produced = compressor.compress(&original, &mut compressed).expect("compress");
        compressed.truncate(produced);
        registry.release_compressor(compressor);

        let mut decompressor = registry.acquire_decompressor(format).expect("acquire");
        let mut out = vec![0u8; original.len()];
        let status = decompressor.decompress(&compressed, &mut out).expect("decompress");
        assert_eq!(status.produced, original.len());
        assert_eq!(out, original);
        registry.release_decompressor(decompressor);
    }
}
