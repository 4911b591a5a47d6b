//! Property-based tests for the cache, batching and Merkle proofs.

use std::sync::Arc;

use proptest::prelude::*;

use crate::algorithms::{chunk_blocks, compute_merkle_root, create_proof, verify_proof};
use crate::domain::cache::tests::linked_chain;
use crate::domain::{BlockCache, IndexedBlock, Transaction};

/// Arbitrary transaction lists with distinct payloads.
fn arb_transactions(max: usize) -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 1..max).prop_map(|raws| {
        raws.into_iter()
            .enumerate()
            .map(|(i, mut raw)| {
                raw.extend_from_slice(&(i as u32).to_le_bytes());
                Transaction::new(raw)
            })
            .collect()
    })
}

fn arc_chain(start: u64, count: usize) -> Vec<Arc<IndexedBlock>> {
    linked_chain(start, count, [0u8; 32])
        .into_iter()
        .map(Arc::new)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every transaction of a block is provable against the block's root
    #[test]
    fn prop_merkle_proofs_verify(txs in arb_transactions(40)) {
        let txids: Vec<_> = txs.iter().map(Transaction::txid).collect();
        let root = compute_merkle_root(&txids);

        for (index, txid) in txids.iter().enumerate() {
            let proof = create_proof(&txs, index).expect("index in range");
            prop_assert_eq!(proof.tx_index as usize, index);
            prop_assert!(verify_proof(txid, &proof, &root));
        }
    }

    /// A proof for one position does not verify a different transaction
    #[test]
    fn prop_merkle_proof_binds_txid(txs in arb_transactions(20)) {
        prop_assume!(txs.len() > 1);
        let txids: Vec<_> = txs.iter().map(Transaction::txid).collect();
        let root = compute_merkle_root(&txids);

        let proof = create_proof(&txs, 0).expect("index in range");
        prop_assert!(!verify_proof(&txids[1], &proof, &root));
    }

    /// Chunks cover the input exactly once, in order, within the size bound
    #[test]
    fn prop_chunks_cover_input(count in 0usize..60, size in 1usize..10) {
        let blocks = arc_chain(500, count);
        let batches = chunk_blocks(&blocks, size);

        prop_assert_eq!(batches.len(), count.div_ceil(size));
        let mut expected = 500u64;
        for batch in &batches {
            prop_assert!(!batch.is_empty() && batch.len() <= size);
            prop_assert_eq!(batch.from_height, expected);
            prop_assert_eq!(batch.to_height, expected + batch.len() as u64 - 1);
            expected = batch.to_height + 1;
        }
        prop_assert_eq!(expected, 500 + count as u64);
    }

    /// Adding past capacity keeps the newest `max` blocks, ascending
    #[test]
    fn prop_cache_sliding_window(max in 1usize..20, count in 1usize..60) {
        let cache = BlockCache::new(max).expect("positive capacity");
        for block in linked_chain(1_000, count, [0u8; 32]) {
            cache.add(block).expect("contiguous");
        }

        let held = count.min(max);
        prop_assert_eq!(cache.size(), held);
        let last = 1_000 + count as u64 - 1;
        prop_assert_eq!(cache.tip().map(|b| b.height), Some(last));
        prop_assert_eq!(cache.first().map(|b| b.height), Some(last + 1 - held as u64));

        let heights: Vec<u64> = cache.blocks().iter().map(|b| b.height).collect();
        prop_assert!(heights.windows(2).all(|w| w[1] == w[0] + 1));
    }

    /// find_block returns exactly the cached block at a height
    #[test]
    fn prop_cache_find_block(count in 1usize..40, probe in 0u64..100) {
        let cache = BlockCache::new(count).expect("positive capacity");
        let chain = linked_chain(30, count, [0u8; 32]);
        cache.init(chain.clone()).expect("sorted input");

        match cache.find_block(probe) {
            Some(block) => {
                prop_assert_eq!(block.height, probe);
                prop_assert_eq!(block.block_hash(), chain[(probe - 30) as usize].block_hash());
            }
            None => prop_assert!(probe < 30 || probe >= 30 + count as u64),
        }
    }
}
