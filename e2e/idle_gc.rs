//! E2E: idle-collection convergence.
//!
//! After any interleaving of begin/end pairs that nets to zero
//! outstanding uses, every free-list of the class must be empty.

use std::sync::Arc;
use std::thread;

use libdeflate_pool::{Format, PoolClass, PoolRegistry};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: last end_use drains every level's free-list
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_last_end_use_drains_all_levels() {
    let registry = PoolRegistry::new();
    registry.begin_use(PoolClass::Compressors);

    for level in 1..=12 {
        let compressor = registry
            .acquire_compressor(level, Format::Deflate)
            .expect("acquire");
        registry.release_compressor(compressor);
        assert_eq!(registry.idle_compressors(level), 1);
    }

    registry.end_use(PoolClass::Compressors);
    for level in 1..=12 {
        assert_eq!(registry.idle_compressors(level), 0, "level {level}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: classes collect independently
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_classes_are_collected_independently() {
    let registry = PoolRegistry::new();
    registry.begin_use(PoolClass::Compressors);
    registry.begin_use(PoolClass::Decompressors);

    let compressor = registry.acquire_compressor(5, Format::Zlib).expect("acquire");
    registry.release_compressor(compressor);
    let decompressor = registry.acquire_decompressor(Format::Zlib).expect("acquire");
    registry.release_decompressor(decompressor);

    // Ending the compressor unit must not touch the decompressor list.
    registry.end_use(PoolClass::Compressors);
    assert_eq!(registry.idle_compressors(5), 0);
    assert_eq!(registry.idle_decompressors(), 1);

    registry.end_use(PoolClass::Decompressors);
    assert_eq!(registry.idle_decompressors(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: nested and interleaved pairs netting to zero converge
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_interleaved_pairs_converge() {
    let registry = PoolRegistry::new();

    // begin begin end begin end end — only the final end may drain.
    registry.begin_use(PoolClass::Decompressors);
    registry.begin_use(PoolClass::Decompressors);
    let first = registry.acquire_decompressor(Format::Gzip).expect("acquire");
    registry.end_use(PoolClass::Decompressors);
    registry.begin_use(PoolClass::Decompressors);
    registry.release_decompressor(first);
    registry.end_use(PoolClass::Decompressors);
    assert_eq!(registry.idle_decompressors(), 1);

    registry.end_use(PoolClass::Decompressors);
    assert_eq!(registry.idle_decompressors(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: RAII scopes from several threads, net zero at join
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_usage_scopes_across_threads() {
    let registry = Arc::new(PoolRegistry::new());

    let mut workers = Vec::new();
    for _ in 0..4 {
        let registry = Arc::clone(&registry);
        workers.push(thread::spawn(move || {
            for _ in 0..50 {
                let _scope = registry.usage_scope(PoolClass::Compressors);
                let compressor = registry
                    .acquire_compressor(2, Format::Deflate)
                    .expect("acquire");
                registry.release_compressor(compressor);
            }
        }));
    }
    for worker in workers {
        worker.join().expect("worker thread panicked");
    }

    // No scope outlives the join, so the class has converged to empty.
    assert_eq!(registry.idle_compressors(2), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: collection does not break later acquisition
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_acquire_after_collection_allocates_fresh() {
    let registry = PoolRegistry::new();
    {
        let _scope = registry.usage_scope(PoolClass::Compressors);
        let compressor = registry.acquire_compressor(7, Format::Gzip).expect("acquire");
        registry.release_compressor(compressor);
    }
    assert_eq!(registry.idle_compressors(7), 0);

    let fresh = registry.acquire_compressor(7, Format::Gzip).expect("acquire");
    assert_eq!(fresh.level(), 7);
    registry.release_compressor(fresh);
    assert_eq!(registry.idle_compressors(7), 1);
}
