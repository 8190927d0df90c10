//! Criterion benchmarks for the pooled compress/decompress paths.
//!
//! Run with:
//!   cargo bench --bench roundtrip

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use libdeflate_pool::{compress_bound, Decompressor, Format, PoolRegistry};

fn synthetic_chunk(size: usize) -> Vec<u8> {
    // Mildly compressible text, repeated to size.
    b"Sphinx of black quartz, judge my vow. 0123456789 "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn bench_compress_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("pooled_roundtrip");
    let registry = PoolRegistry::new();

    for &chunk_size in &[65_536usize, 262_144] {
        let chunk = synthetic_chunk(chunk_size);
        let bound = compress_bound(chunk_size, Format::Zlib);

        // ── pooled compress at a few representative levels ──────────────────
        for &level in &[1i32, 6, 12] {
            let mut dst = vec![0u8; bound];
            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("compress_level_{level}"), chunk_size),
                &chunk,
                |b, chunk| {
                    b.iter(|| {
                        let mut compressor = registry
                            .acquire_compressor(level, Format::Zlib)
                            .expect("acquire");
                        let n = compressor.compress(chunk, &mut dst).expect("compress");
                        registry.release_compressor(compressor);
                        n
                    })
                },
            );
        }

        // ── decompress — pre-compress the chunk once, then benchmark ────────
        {
            let mut tmp = vec![0u8; bound];
            let mut compressor = registry
                .acquire_compressor(6, Format::Zlib)
                .expect("acquire");
            let n = compressor.compress(&chunk, &mut tmp).expect("compress");
            registry.release_compressor(compressor);
            let compressed = tmp[..n].to_vec();
            let mut out = vec![0u8; chunk_size];

            // Throughput measured in decompressed bytes.
            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new("decompress", chunk_size),
                &compressed,
                |b, compressed| {
                    let mut decompressor =
                        Decompressor::new(Format::Zlib).expect("decompressor allocation");
                    b.iter(|| {
                        decompressor
                            .decompress(compressed, &mut out)
                            .expect("decompress")
                            .produced
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_compress_decompress);
criterion_main!(benches);
