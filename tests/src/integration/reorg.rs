//! # Reorg Tests
//!
//! Shallow reorgs are applied to the cache event by event. A reorg that
//! empties the cache, or events that contradict it, force a re-bootstrap.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use btc_spv_relayer::{
        BlockEvent, IndexedBlock, MockBtcNode, MockLightClient, RelayerApi, RelayerService,
    };

    use crate::fixtures::{chain, fork, init_tracing};
    use crate::integration::{config, steady_at, wait_until, TestRelayer};

    struct Harness {
        chain: Vec<IndexedBlock>,
        node: Arc<MockBtcNode>,
        light_client: Arc<MockLightClient>,
        relayer: TestRelayer,
    }

    /// Node and light client both at 20; relayer steady on 18..=20.
    async fn steady_harness() -> Harness {
        init_tracing();
        let chain = chain(0, 21, [0u8; 32], 3);
        let node = Arc::new(MockBtcNode::with_chain(chain.clone()));
        let light_client = Arc::new(MockLightClient::with_base(&chain[0]));
        light_client.preload(&chain);
        let relayer = RelayerService::new(config(), node.clone(), light_client.clone()).unwrap();

        relayer.start().await.unwrap();
        wait_until(|| steady_at(&relayer, 20)).await;
        Harness {
            chain,
            node,
            light_client,
            relayer,
        }
    }

    fn cached_hash(relayer: &TestRelayer, height: u64) -> Option<[u8; 32]> {
        relayer.cache().find_block(height).map(|b| b.block_hash())
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_block_reorg_applied_in_place() {
        let h = steady_harness().await;
        let replacement = fork(20, 2, h.chain[19].block_hash(), 7);

        h.node.disconnect_tip();
        for block in &replacement {
            h.node.connect(block.clone());
        }
        wait_until(|| steady_at(&h.relayer, 21)).await;

        assert_eq!(cached_hash(&h.relayer, 20), Some(replacement[0].block_hash()));
        assert_eq!(cached_hash(&h.relayer, 21), Some(replacement[1].block_hash()));
        assert_eq!(cached_hash(&h.relayer, 19), Some(h.chain[19].block_hash()));
        assert_eq!(
            h.light_client.tip().unwrap().hash,
            replacement[1].block_hash()
        );
        // Handled without a second bootstrap.
        assert_eq!(h.node.subscription_count(), 1);

        h.relayer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reorg_deeper_than_cache_rebootstraps() {
        let h = steady_harness().await;
        let replacement = fork(18, 4, h.chain[17].block_hash(), 11);

        for _ in 0..3 {
            h.node.disconnect_tip();
        }
        for block in &replacement {
            h.node.connect(block.clone());
        }

        wait_until(|| h.node.subscription_count() == 2).await;
        wait_until(|| steady_at(&h.relayer, 21)).await;

        for block in &replacement[1..] {
            assert_eq!(cached_hash(&h.relayer, block.height), Some(block.block_hash()));
        }
        let inserted: Vec<_> = h
            .light_client
            .inserted_headers()
            .iter()
            .map(|header| header.block_hash())
            .collect();
        let expected: Vec<_> = replacement.iter().map(|b| b.block_hash()).collect();
        assert_eq!(inserted, expected);
        assert!(h.relayer.is_running());

        h.relayer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_contradicting_event_rebootstraps_without_mutation() {
        let h = steady_harness().await;
        let rival = fork(19, 1, h.chain[18].block_hash(), 3).remove(0);

        // The cache holds a different block at 19.
        h.node.emit(BlockEvent::connected(19, rival.header));
        wait_until(|| h.node.subscription_count() == 2).await;
        wait_until(|| steady_at(&h.relayer, 20)).await;

        for height in 18..=20u64 {
            assert_eq!(
                cached_hash(&h.relayer, height),
                Some(h.chain[height as usize].block_hash())
            );
        }
        assert!(h.light_client.inserted_headers().is_empty());

        h.relayer.stop().await.unwrap();
    }
}
