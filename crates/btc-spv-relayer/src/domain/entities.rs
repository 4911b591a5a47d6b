//! # Domain Entities
//!
//! Bitcoin headers, transactions and the height-indexed blocks the relayer
//! caches and submits.

use super::errors::{Hash, RelayerError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Serialized size of a Bitcoin block header.
pub const HEADER_SIZE: usize = 80;

/// Double SHA-256, as used for block hashes, txids and Merkle nodes.
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut output = [0u8; 32];
    output.copy_from_slice(&second);
    output
}

/// Parent of two Merkle nodes.
pub fn merkle_parent(left: &Hash, right: &Hash) -> Hash {
    let mut concat = [0u8; 64];
    concat[..32].copy_from_slice(left);
    concat[32..].copy_from_slice(right);
    double_sha256(&concat)
}

/// Hex rendering in Bitcoin display order (byte-reversed).
pub fn hash_to_hex(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Bitcoin block header.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block version.
    pub version: i32,
    /// Hash of the parent block.
    pub prev_block: Hash,
    /// Merkle root of the block's transactions.
    pub merkle_root: Hash,
    /// Unix timestamp.
    pub time: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// Proof-of-work nonce.
    pub nonce: u32,
}

impl BlockHeader {
    /// Decode a header from its 80-byte wire form.
    ///
    /// # Errors
    /// - `MalformedHeader` if `bytes` is not exactly 80 bytes long
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RelayerError> {
        if bytes.len() != HEADER_SIZE {
            return Err(RelayerError::MalformedHeader(bytes.len()));
        }

        let word = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        let mut prev_block = [0u8; 32];
        prev_block.copy_from_slice(&bytes[4..36]);
        let mut merkle_root = [0u8; 32];
        merkle_root.copy_from_slice(&bytes[36..68]);

        Ok(Self {
            version: i32::from_le_bytes(word(0)),
            prev_block,
            merkle_root,
            time: u32::from_le_bytes(word(68)),
            bits: u32::from_le_bytes(word(72)),
            nonce: u32::from_le_bytes(word(76)),
        })
    }

    /// Encode the header into its 80-byte wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_block);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.time.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// Block hash (identity of the block).
    pub fn block_hash(&self) -> Hash {
        double_sha256(&self.to_bytes())
    }
}

/// Raw Bitcoin transaction in its non-witness serialization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Serialized transaction bytes.
    pub raw: Vec<u8>,
}

impl Transaction {
    /// Wrap raw transaction bytes.
    pub fn new(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    /// Transaction id.
    pub fn txid(&self) -> Hash {
        double_sha256(&self.raw)
    }
}

/// A block together with its height in the chain.
///
/// Immutable once constructed; cached and batched behind an `Arc`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexedBlock {
    /// Block height.
    pub height: u64,
    /// Block header.
    pub header: BlockHeader,
    /// Transactions in block order (coinbase first).
    pub transactions: Vec<Transaction>,
}

impl IndexedBlock {
    /// Create a new indexed block.
    pub fn new(height: u64, header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            height,
            header,
            transactions,
        }
    }

    /// Block hash.
    pub fn block_hash(&self) -> Hash {
        self.header.block_hash()
    }

    /// Transaction ids in block order.
    pub fn txids(&self) -> Vec<Hash> {
        self.transactions.iter().map(Transaction::txid).collect()
    }
}
