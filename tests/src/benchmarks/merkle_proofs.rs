//! # Merkle Proof Benchmarks
//!
//! Proof construction is O(n) in the transaction count per proof; a full
//! block of ~4000 transactions should stay well under a millisecond.

use btc_spv_relayer::{compute_merkle_root, create_proof, verify_proof, Hash, Transaction};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use rand::Rng;

fn random_transactions(count: usize) -> Vec<Transaction> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let raw: Vec<u8> = (0..250).map(|_| rng.gen()).collect();
            Transaction::new(raw)
        })
        .collect()
}

/// Root computation and proof construction across block sizes.
pub fn bench_proof_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle-proofs");

    for size in [1usize, 16, 500, 4_000] {
        let txs = random_transactions(size);
        let txids: Vec<Hash> = txs.iter().map(Transaction::txid).collect();
        let last = size - 1;

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("merkle_root", size), &txids, |b, txids| {
            b.iter(|| black_box(compute_merkle_root(txids)))
        });
        group.bench_with_input(BenchmarkId::new("create_proof_last", size), &txs, |b, txs| {
            b.iter(|| black_box(create_proof(txs, last)))
        });
    }

    group.finish();
}

/// Verification walks log2(n) levels.
pub fn bench_proof_verification(c: &mut Criterion) {
    let txs = random_transactions(4_000);
    let txids: Vec<Hash> = txs.iter().map(Transaction::txid).collect();
    let root = compute_merkle_root(&txids);
    let proof = create_proof(&txs, 1_337).expect("index in range");

    c.bench_function("merkle-proofs/verify_4000", |b| {
        b.iter(|| black_box(verify_proof(&txids[1_337], &proof, &root)))
    });
}

/// Register every benchmark of this module.
pub fn register_benchmarks(c: &mut Criterion) {
    bench_proof_construction(c);
    bench_proof_verification(c);
}
