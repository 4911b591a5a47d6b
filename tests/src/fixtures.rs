//! # Test Fixtures
//!
//! Deterministic Bitcoin-shaped chains. Headers carry real Merkle roots and
//! link by double SHA-256, so the relayer's checks apply to them unchanged.

use btc_spv_relayer::{compute_merkle_root, BlockHeader, Hash, IndexedBlock, Transaction};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Block at `height` on top of `parent` with `tx_count` transactions.
///
/// `salt` separates otherwise identical blocks, e.g. competing forks.
pub fn block(height: u64, parent: Hash, tx_count: usize, salt: u32) -> IndexedBlock {
    let transactions: Vec<Transaction> = (0..tx_count.max(1))
        .map(|i| {
            let mut raw = height.to_le_bytes().to_vec();
            raw.extend_from_slice(&(i as u32).to_le_bytes());
            raw.extend_from_slice(&salt.to_le_bytes());
            Transaction::new(raw)
        })
        .collect();
    let txids: Vec<Hash> = transactions.iter().map(Transaction::txid).collect();

    let header = BlockHeader {
        version: 0x2000_0000,
        prev_block: parent,
        merkle_root: compute_merkle_root(&txids),
        time: 1_700_000_000 + height as u32 * 600,
        bits: 0x1703_a30c,
        nonce: salt.wrapping_mul(31).wrapping_add(height as u32),
    };
    IndexedBlock::new(height, header, transactions)
}

/// `count` linked blocks starting at `start`.
pub fn chain(start: u64, count: usize, parent: Hash, tx_count: usize) -> Vec<IndexedBlock> {
    extend(start, count, parent, tx_count, 0)
}

/// Like [`chain`], with a salt so the blocks differ from the main chain.
pub fn fork(start: u64, count: usize, parent: Hash, salt: u32) -> Vec<IndexedBlock> {
    extend(start, count, parent, 2, salt)
}

fn extend(start: u64, count: usize, parent: Hash, tx_count: usize, salt: u32) -> Vec<IndexedBlock> {
    let mut blocks = Vec::with_capacity(count);
    let mut prev = parent;
    for height in start..start + count as u64 {
        let next = block(height, prev, tx_count, salt);
        prev = next.block_hash();
        blocks.push(next);
    }
    blocks
}
