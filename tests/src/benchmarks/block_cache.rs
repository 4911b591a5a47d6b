//! # Block Cache Benchmarks
//!
//! Steady-state cache work per block: one `add` with eviction, lookups by
//! height, and the snapshot taken for backlog submission.

use std::sync::Arc;

use btc_spv_relayer::{BlockCache, IndexedBlock};
use criterion::{black_box, BenchmarkId, Criterion};

use crate::fixtures::chain;

/// Sliding-window `add` at a full cache.
pub fn bench_cache_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("block-cache");

    for window in [6usize, 100, 1_000] {
        let blocks: Vec<Arc<IndexedBlock>> = chain(0, window + 10_000, [0u8; 32], 1)
            .into_iter()
            .map(Arc::new)
            .collect();

        group.bench_with_input(BenchmarkId::new("add_evicting", window), &blocks, |b, blocks| {
            b.iter_batched(
                || {
                    let cache = BlockCache::new(window).expect("positive window");
                    for block in &blocks[..window] {
                        let _ = cache.add(block.clone());
                    }
                    cache
                },
                |cache| {
                    for block in &blocks[window..window + 100] {
                        black_box(cache.add(block.clone()).is_ok());
                    }
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

/// Binary-search lookup and full snapshot of a backlog-sized cache.
pub fn bench_cache_reads(c: &mut Criterion) {
    let cache = BlockCache::new(1_000).expect("positive capacity");
    cache
        .init(chain(700_000, 1_000, [0u8; 32], 1))
        .expect("contiguous chain");

    c.bench_function("block-cache/find_block", |b| {
        let mut height = 700_000u64;
        b.iter(|| {
            height = if height >= 700_999 { 700_000 } else { height + 7 };
            black_box(cache.find_block(height))
        })
    });
    c.bench_function("block-cache/snapshot_1000", |b| {
        b.iter(|| black_box(cache.blocks().len()))
    });
}

/// Register every benchmark of this module.
pub fn register_benchmarks(c: &mut Criterion) {
    bench_cache_add(c);
    bench_cache_reads(c);
}
