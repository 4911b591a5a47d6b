//! # Bitcoin SPV Relayer Benchmarks
//!
//! | Area | Operation | Target |
//! |------|-----------|--------|
//! | Merkle proofs | proof for a 4000-tx block | < 1ms |
//! | Merkle proofs | verify | < 10μs |
//! | Block cache | add with eviction | < 1μs |
//! | Block cache | find by height | < 1μs |

use criterion::{criterion_group, criterion_main, Criterion};
use relayer_tests::benchmarks::{block_cache, merkle_proofs};

fn bench_merkle_proofs(c: &mut Criterion) {
    merkle_proofs::register_benchmarks(c);
}

fn bench_block_cache(c: &mut Criterion) {
    block_cache::register_benchmarks(c);
}

criterion_group!(benches, bench_merkle_proofs, bench_block_cache);
criterion_main!(benches);
