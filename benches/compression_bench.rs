#![allow(clippy::unwrap_used, clippy::uninlined_format_args)]

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use mesh_mapper::utils::compression::{compress, decompress, CompressionKind};
use mesh_mapper::utils::EncoderPool;

fn json_like(size: usize) -> Vec<u8> {
    let record = br#"{"ID":42,"Name":"laptop.alice.example.com","Addresses":["100.64.0.42/32"]},"#;
    record.iter().copied().cycle().take(size).collect()
}

fn bench_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression");
    let sizes = [64usize, 512, 4096, 65536, 1024 * 1024];
    let pool = EncoderPool::default();

    for &size in &sizes {
        let data = json_like(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("zstd_pooled_compress_{}b", size), |b| {
            b.iter_batched(
                || data.clone(),
                |d| {
                    let _ = compress(&d, CompressionKind::Zstd, &pool).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("zstd_fresh_compress_{}b", size), |b| {
            b.iter_batched(
                || data.clone(),
                |d| {
                    let fresh = EncoderPool::new(0, 1);
                    let _ = compress(&d, CompressionKind::Zstd, &fresh).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("zstd_decompress_{}b", size), |b| {
            let compressed = compress(&data, CompressionKind::Zstd, &pool).unwrap();
            b.iter(|| {
                let out = decompress(&compressed, CompressionKind::Zstd).unwrap();
                assert_eq!(out.len(), data.len());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compression);
criterion_main!(benches);
