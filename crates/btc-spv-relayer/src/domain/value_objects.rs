//! # Domain Value Objects
//!
//! Immutable value types exchanged between the relayer and its ports.

use super::entities::{hash_to_hex, merkle_parent, BlockHeader};
use super::errors::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a live block event.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlockEventKind {
    /// Block joined the best chain.
    Connected,
    /// Block left the best chain (reorg).
    Disconnected,
}

/// Live block event delivered by the node adapter.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockEvent {
    /// Connect or disconnect.
    pub kind: BlockEventKind,
    /// Height of the block.
    pub height: u64,
    /// Header of the block.
    pub header: BlockHeader,
}

impl BlockEvent {
    /// Create a connected event.
    pub fn connected(height: u64, header: BlockHeader) -> Self {
        Self {
            kind: BlockEventKind::Connected,
            height,
            header,
        }
    }

    /// Create a disconnected event.
    pub fn disconnected(height: u64, header: BlockHeader) -> Self {
        Self {
            kind: BlockEventKind::Disconnected,
            height,
            header,
        }
    }

    /// Hash of the event's block.
    pub fn block_hash(&self) -> Hash {
        self.header.block_hash()
    }
}

/// Chain tip as reported by the node or the light client.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainTip {
    /// Tip block hash.
    pub hash: Hash,
    /// Tip block height.
    pub height: u64,
}

impl ChainTip {
    /// Create a new chain tip.
    pub fn new(hash: Hash, height: u64) -> Self {
        Self { hash, height }
    }
}

/// Merkle inclusion proof: sibling path from leaf to root, both excluded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerkleProof {
    /// Sibling hashes, leaf level first.
    pub sibling_hashes: Vec<Hash>,
    /// Index of the proven transaction in its block.
    pub tx_index: u32,
}

impl MerkleProof {
    /// Recompute the Merkle root from a leaf and this sibling path.
    ///
    /// An even index whose sibling is itself reproduces Bitcoin's
    /// odd-node duplication.
    pub fn root_from_leaf(&self, leaf: &Hash) -> Hash {
        let mut current = *leaf;
        let mut index = self.tx_index;
        for sibling in &self.sibling_hashes {
            current = if index & 1 == 1 {
                merkle_parent(sibling, &current)
            } else {
                merkle_parent(&current, sibling)
            };
            index >>= 1;
        }
        current
    }
}

/// SPV proof handed to the light client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpvProof {
    /// Block containing the transaction.
    pub block_hash: Hash,
    /// Proven transaction id.
    pub txid: Hash,
    /// Index of the transaction in the block.
    pub tx_index: u32,
    /// Merkle path to the header's merkle root.
    pub merkle_path: MerkleProof,
}

/// Light client verdict on an SPV proof.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpvStatus {
    /// Proof accepted.
    Valid,
    /// Proof rejected with the light client's result code.
    Rejected {
        /// Light client specific code
        code: i32,
    },
}

/// Contiguous run of headers submitted in one call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderBatch {
    /// Height of the first header.
    pub from_height: u64,
    /// Height of the last header.
    pub to_height: u64,
    /// Headers, ascending by height.
    pub headers: Vec<BlockHeader>,
}

impl HeaderBatch {
    /// Number of headers in the batch.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// True if the batch carries no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Outcome of one submission run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Headers sent to the light client.
    pub headers_submitted: usize,
    /// SPV proofs sent to the light client.
    pub proofs_submitted: usize,
}

/// Bootstrap state machine position.
///
/// ```text
/// [WaitingForNodeSync] → [CacheInit] → [BacklogSubmit] → [LiveSubscribe] → [Steady]
///          ↑                                                                  │
///          └──────────────── any failure (fixed delay, bounded) ──────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapState {
    /// Waiting for the local node to reach the light client tip.
    WaitingForNodeSync,
    /// Loading `[lc_tip - k + 1, node_tip]` into the cache.
    CacheInit,
    /// Catching the light client up to the cache tip.
    BacklogSubmit,
    /// Subscribing to live block events.
    LiveSubscribe,
    /// Cache trimmed to the confirmation window.
    Steady,
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WaitingForNodeSync => "waiting-for-node-sync",
            Self::CacheInit => "cache-init",
            Self::BacklogSubmit => "backlog-submit",
            Self::LiveSubscribe => "live-subscribe",
            Self::Steady => "steady",
        };
        f.write_str(name)
    }
}

/// Summary of a successful bootstrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Attempts used, including the successful one.
    pub attempts: u32,
    /// Cache size once steady.
    pub cache_size: usize,
    /// Cache tip height once steady.
    pub tip_height: u64,
    /// Backlog submission totals.
    pub submission: SubmissionReport,
}

/// Short display form for logs.
pub fn short_hash(hash: &Hash) -> String {
    let full = hash_to_hex(hash);
    full[..16].to_string()
}
