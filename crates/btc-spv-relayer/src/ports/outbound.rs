//! # Outbound Ports
//!
//! Traits for the external collaborators: the Bitcoin node and the remote
//! light client. Transport details (RPC, ZMQ, contract calls) live in the
//! adapters implementing them.

use crate::domain::{
    BlockEvent, BlockHeader, ChainTip, Hash, IndexedBlock, RelayerError, SpvProof, SpvStatus,
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Live block events, delivered in chain order by a single producer.
pub type BlockEventStream = mpsc::Receiver<BlockEvent>;

/// Bitcoin node connection - outbound port.
#[async_trait]
pub trait BtcNode: Send + Sync {
    /// Hash and height of the node's best block.
    async fn get_tip_block(&self) -> Result<ChainTip, RelayerError>;

    /// Full block by hash.
    async fn get_block_by_hash(&self, hash: Hash) -> Result<IndexedBlock, RelayerError>;

    /// Blocks from `base_height` to the current tip, ascending.
    async fn get_tail_blocks_by_height(
        &self,
        base_height: u64,
    ) -> Result<Vec<IndexedBlock>, RelayerError>;

    /// Subscribe to connect/disconnect events. Each call returns a fresh
    /// stream; earlier streams may be dropped by the caller.
    async fn subscribe_new_blocks(&self) -> Result<BlockEventStream, RelayerError>;

    /// Stop the connection and any event producers.
    async fn stop(&self);

    /// Wait until the connection is fully shut down.
    async fn wait_for_shutdown(&self);
}

/// Remote light client - outbound port.
#[async_trait]
pub trait LightClient: Send + Sync {
    /// Append headers, ascending, whose first parent the light client knows.
    async fn insert_headers(&self, headers: &[BlockHeader]) -> Result<(), RelayerError>;

    /// True if the light client holds the block.
    async fn contains_block(&self, hash: Hash) -> Result<bool, RelayerError>;

    /// Hash and height of the light client's tip.
    async fn get_latest_block_info(&self) -> Result<ChainTip, RelayerError>;

    /// Ask the light client to verify a transaction inclusion proof.
    async fn verify_spv(&self, proof: &SpvProof) -> Result<SpvStatus, RelayerError>;

    /// Stop the connection.
    async fn stop(&self);
}
