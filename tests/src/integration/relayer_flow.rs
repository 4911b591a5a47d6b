//! # Relayer Flow Tests
//!
//! Node at heights 0..=30, light client synced to 24, k = 3.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use btc_spv_relayer::{
        verify_proof, IndexedBlock, MockBtcNode, MockLightClient, RelayerApi, RelayerConfig,
        RelayerError, RelayerService, WatchedTxids,
    };

    use crate::fixtures::{chain, init_tracing};
    use crate::integration::{config, steady_at, wait_until, TestRelayer};

    struct Harness {
        chain: Vec<IndexedBlock>,
        node: Arc<MockBtcNode>,
        light_client: Arc<MockLightClient>,
    }

    fn harness() -> Harness {
        init_tracing();
        let chain = chain(0, 35, [0u8; 32], 5);
        let node = Arc::new(MockBtcNode::with_chain(chain[..31].to_vec()));
        let light_client = Arc::new(MockLightClient::with_base(&chain[0]));
        light_client.preload(&chain[..25]);
        Harness {
            chain,
            node,
            light_client,
        }
    }

    fn relayer(h: &Harness) -> TestRelayer {
        RelayerService::new(config(), h.node.clone(), h.light_client.clone()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_backlog_then_live_headers_in_order() {
        let h = harness();
        let relayer = relayer(&h);
        relayer.start().await.unwrap();

        wait_until(|| steady_at(&relayer, 30)).await;
        for block in &h.chain[31..35] {
            h.node.connect(block.clone());
        }
        wait_until(|| steady_at(&relayer, 34)).await;

        let expected: Vec<_> = h.chain[25..35].iter().map(|b| b.header).collect();
        assert_eq!(h.light_client.inserted_headers(), expected);
        // Backlog of 25..=30 goes out in batches of two, then one per event.
        assert_eq!(h.light_client.insert_calls(), vec![2, 2, 2, 1, 1, 1, 1]);
        assert_eq!(relayer.cache().size(), 3);

        relayer.stop().await.unwrap();
        assert!(!relayer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_proofs_verify_against_headers() {
        let h = harness();
        let relayer = relayer(&h);
        relayer.start().await.unwrap();
        wait_until(|| steady_at(&relayer, 30)).await;

        for height in 28..=30u64 {
            let block = &h.chain[height as usize];
            for (index, tx) in block.transactions.iter().enumerate() {
                let proof = relayer.prove_transaction(height, index).unwrap();
                assert_eq!(proof.txid, tx.txid());
                assert!(verify_proof(
                    &proof.txid,
                    &proof.merkle_path,
                    &block.header.merkle_root
                ));
            }
        }
        assert!(matches!(
            relayer.prove_transaction(27, 0),
            Err(RelayerError::BlockNotFound(27))
        ));

        relayer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_watched_transactions_are_proven_to_light_client() {
        let h = harness();
        let watched = h.chain[32].transactions[3].txid();
        let relayer = relayer(&h).with_selector(Arc::new(WatchedTxids::new([watched])));
        relayer.start().await.unwrap();
        wait_until(|| steady_at(&relayer, 30)).await;

        h.node.connect(h.chain[31].clone());
        h.node.connect(h.chain[32].clone());
        wait_until(|| h.light_client.proofs().len() == 1).await;

        let proof = &h.light_client.proofs()[0];
        assert_eq!(proof.block_hash, h.chain[32].block_hash());
        assert_eq!(proof.tx_index, 3);

        relayer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resumes_from_light_client_tip() {
        let h = harness();
        let relayer = relayer(&h);
        relayer.start().await.unwrap();
        wait_until(|| steady_at(&relayer, 30)).await;
        relayer.stop().await.unwrap();

        // Blocks mined while stopped are picked up by the next bootstrap.
        for block in &h.chain[31..33] {
            h.node.push_block(block.clone());
        }
        relayer.start().await.unwrap();
        wait_until(|| steady_at(&relayer, 32)).await;
        assert_eq!(h.light_client.tip().unwrap().height, 32);
        assert_eq!(h.node.subscription_count(), 2);

        relayer.close().await.unwrap();
        assert!(h.node.is_stopped());
        assert!(h.light_client.is_stopped());
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "confirmation_depth": 12, "retry_max_sleep_ms": 60000 }"#;
        let parsed: RelayerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.confirmation_depth, 12);
        assert_eq!(parsed.retry_max_sleep_ms, 60_000);
        assert_eq!(parsed.btc_cache_size, RelayerConfig::default().btc_cache_size);
        parsed.validate().unwrap();

        let invalid: RelayerConfig = serde_json::from_str(r#"{ "btc_cache_size": 10 }"#).unwrap();
        let result = RelayerService::new(
            invalid,
            Arc::new(MockBtcNode::default()),
            Arc::new(MockLightClient::default()),
        );
        assert!(matches!(result, Err(RelayerError::InvalidConfig(_))));
    }
}
