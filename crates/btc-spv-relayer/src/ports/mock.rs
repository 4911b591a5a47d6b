// =============================================================================
// Mock Implementations for Testing
// =============================================================================

use super::outbound::{BlockEventStream, BtcNode, LightClient};
use crate::domain::{
    BlockEvent, BlockHeader, ChainTip, Hash, IndexedBlock, RelayerError, SpvProof, SpvStatus,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Capacity of each mock event stream.
const MOCK_EVENT_BUFFER: usize = 1024;

#[derive(Default)]
struct MockNodeState {
    chain: Vec<IndexedBlock>,
    side_blocks: HashMap<Hash, IndexedBlock>,
    subscribers: Vec<mpsc::Sender<BlockEvent>>,
    subscriptions: usize,
    tip_requests: Vec<Instant>,
    tail_requests: Vec<Instant>,
    fail_next: usize,
    stopped: bool,
}

/// In-memory Bitcoin node for testing.
#[derive(Default)]
pub struct MockBtcNode {
    state: Mutex<MockNodeState>,
}

impl MockBtcNode {
    /// Node whose best chain is `chain` (ascending, contiguous).
    pub fn with_chain(chain: Vec<IndexedBlock>) -> Self {
        Self {
            state: Mutex::new(MockNodeState {
                chain,
                ..Default::default()
            }),
        }
    }

    /// Extend the best chain silently (no event).
    pub fn push_block(&self, block: IndexedBlock) {
        self.state.lock().chain.push(block);
    }

    /// Extend the best chain and emit a connected event.
    pub fn connect(&self, block: IndexedBlock) {
        let event = BlockEvent::connected(block.height, block.header);
        self.state.lock().chain.push(block);
        self.emit(event);
    }

    /// Drop the best tip and emit a disconnected event.
    pub fn disconnect_tip(&self) -> Option<IndexedBlock> {
        let block = self.state.lock().chain.pop()?;
        self.emit(BlockEvent::disconnected(block.height, block.header));
        Some(block)
    }

    /// Make a block fetchable by hash without it being on the best chain.
    pub fn insert_side_block(&self, block: IndexedBlock) {
        self.state.lock().side_blocks.insert(block.block_hash(), block);
    }

    /// Deliver an arbitrary event to every live subscriber.
    pub fn emit(&self, event: BlockEvent) {
        let mut state = self.state.lock();
        state
            .subscribers
            .retain(|tx| tx.try_send(event.clone()).is_ok());
    }

    /// Fail the next `count` calls with a transient network error.
    pub fn fail_next(&self, count: usize) {
        self.state.lock().fail_next = count;
    }

    /// Number of `subscribe_new_blocks` calls so far.
    pub fn subscription_count(&self) -> usize {
        self.state.lock().subscriptions
    }

    /// Number of `get_tail_blocks_by_height` calls so far.
    pub fn tail_request_count(&self) -> usize {
        self.state.lock().tail_requests.len()
    }

    /// When each `get_tail_blocks_by_height` call was served.
    pub fn tail_request_times(&self) -> Vec<Instant> {
        self.state.lock().tail_requests.clone()
    }

    /// When each `get_tip_block` call was served.
    pub fn tip_request_times(&self) -> Vec<Instant> {
        self.state.lock().tip_requests.clone()
    }

    /// True once `stop` was called.
    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    fn check_failure(&self) -> Result<(), RelayerError> {
        let mut state = self.state.lock();
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(RelayerError::Network("mock node failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BtcNode for MockBtcNode {
    async fn get_tip_block(&self) -> Result<ChainTip, RelayerError> {
        self.check_failure()?;
        let mut state = self.state.lock();
        state.tip_requests.push(Instant::now());
        Ok(state
            .chain
            .last()
            .map(|block| ChainTip::new(block.block_hash(), block.height))
            .unwrap_or(ChainTip::new([0u8; 32], 0)))
    }

    async fn get_block_by_hash(&self, hash: Hash) -> Result<IndexedBlock, RelayerError> {
        self.check_failure()?;
        let state = self.state.lock();
        state
            .chain
            .iter()
            .find(|block| block.block_hash() == hash)
            .or_else(|| state.side_blocks.get(&hash))
            .cloned()
            .ok_or_else(|| RelayerError::Network("mock node: unknown block".to_string()))
    }

    async fn get_tail_blocks_by_height(
        &self,
        base_height: u64,
    ) -> Result<Vec<IndexedBlock>, RelayerError> {
        self.check_failure()?;
        let mut state = self.state.lock();
        state.tail_requests.push(Instant::now());
        match state.chain.first() {
            Some(first) if first.height <= base_height => Ok(state
                .chain
                .iter()
                .filter(|block| block.height >= base_height)
                .cloned()
                .collect()),
            _ => Err(RelayerError::Network(format!(
                "mock node: no blocks from height {}",
                base_height
            ))),
        }
    }

    async fn subscribe_new_blocks(&self) -> Result<BlockEventStream, RelayerError> {
        self.check_failure()?;
        let (tx, rx) = mpsc::channel(MOCK_EVENT_BUFFER);
        let mut state = self.state.lock();
        state.subscriptions += 1;
        state.subscribers.push(tx);
        Ok(rx)
    }

    async fn stop(&self) {
        let mut state = self.state.lock();
        state.stopped = true;
        state.subscribers.clear();
    }

    async fn wait_for_shutdown(&self) {}
}

#[derive(Default)]
struct MockLightClientState {
    known: HashMap<Hash, u64>,
    tip: Option<ChainTip>,
    inserted: Vec<BlockHeader>,
    insert_calls: Vec<usize>,
    proofs: Vec<SpvProof>,
    fail_next_inserts: usize,
    stopped: bool,
}

/// In-memory light client for testing.
///
/// Enforces header linkage the way a real verifier would: every new header
/// must extend a known block.
#[derive(Default)]
pub struct MockLightClient {
    state: Mutex<MockLightClientState>,
}

impl MockLightClient {
    /// Light client whose trusted base is `base`.
    pub fn with_base(base: &IndexedBlock) -> Self {
        let client = Self::default();
        {
            let mut state = client.state.lock();
            state.known.insert(base.block_hash(), base.height);
            state.tip = Some(ChainTip::new(base.block_hash(), base.height));
        }
        client
    }

    /// Mark blocks as already known (as if relayed earlier).
    pub fn preload(&self, blocks: &[IndexedBlock]) {
        let mut state = self.state.lock();
        for block in blocks {
            state.known.insert(block.block_hash(), block.height);
            if state.tip.map_or(true, |tip| block.height > tip.height) {
                state.tip = Some(ChainTip::new(block.block_hash(), block.height));
            }
        }
    }

    /// Fail the next `count` inserts with a transient network error.
    pub fn fail_next_inserts(&self, count: usize) {
        self.state.lock().fail_next_inserts = count;
    }

    /// Every header accepted so far, in submission order.
    pub fn inserted_headers(&self) -> Vec<BlockHeader> {
        self.state.lock().inserted.clone()
    }

    /// Size of every `insert_headers` call that reached the light client.
    pub fn insert_calls(&self) -> Vec<usize> {
        self.state.lock().insert_calls.clone()
    }

    /// Every proof handed to `verify_spv`.
    pub fn proofs(&self) -> Vec<SpvProof> {
        self.state.lock().proofs.clone()
    }

    /// Current tip.
    pub fn tip(&self) -> Option<ChainTip> {
        self.state.lock().tip
    }

    /// True once `stop` was called.
    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }
}

#[async_trait]
impl LightClient for MockLightClient {
    async fn insert_headers(&self, headers: &[BlockHeader]) -> Result<(), RelayerError> {
        let mut state = self.state.lock();
        if state.fail_next_inserts > 0 {
            state.fail_next_inserts -= 1;
            return Err(RelayerError::Network("mock light client failure".to_string()));
        }
        state.insert_calls.push(headers.len());

        let mut accepted = 0;
        for header in headers {
            let hash = header.block_hash();
            if state.known.contains_key(&hash) {
                continue;
            }
            let Some(parent_height) = state.known.get(&header.prev_block).copied() else {
                return Err(RelayerError::ParentNotFound(crate::domain::hash_to_hex(&hash)));
            };
            let height = parent_height + 1;
            state.known.insert(hash, height);
            state.inserted.push(*header);
            if state.tip.map_or(true, |tip| height > tip.height) {
                state.tip = Some(ChainTip::new(hash, height));
            }
            accepted += 1;
        }

        if accepted == 0 && !headers.is_empty() {
            return Err(RelayerError::HeaderAlreadySubmitted);
        }
        Ok(())
    }

    async fn contains_block(&self, hash: Hash) -> Result<bool, RelayerError> {
        Ok(self.state.lock().known.contains_key(&hash))
    }

    async fn get_latest_block_info(&self) -> Result<ChainTip, RelayerError> {
        Ok(self
            .state
            .lock()
            .tip
            .unwrap_or(ChainTip::new([0u8; 32], 0)))
    }

    async fn verify_spv(&self, proof: &SpvProof) -> Result<SpvStatus, RelayerError> {
        let mut state = self.state.lock();
        state.proofs.push(proof.clone());
        if state.known.contains_key(&proof.block_hash) {
            Ok(SpvStatus::Valid)
        } else {
            Ok(SpvStatus::Rejected { code: 1 })
        }
    }

    async fn stop(&self) {
        self.state.lock().stopped = true;
    }
}
