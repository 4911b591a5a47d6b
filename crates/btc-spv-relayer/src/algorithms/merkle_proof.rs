//! # Merkle Proof Builder
//!
//! Bitcoin Merkle tree over transaction ids and inclusion proofs against it.

use crate::domain::{
    merkle_parent, Hash, IndexedBlock, MerkleProof, RelayerError, SpvProof, Transaction,
};

/// Build an inclusion proof for the transaction at `idx`.
///
/// # Algorithm
///
/// 1. Leaves are the txids, in block order
/// 2. At each level the sibling index is `min(index ^ 1, level_size - 1)`,
///    so an unpaired last node is its own sibling
/// 3. Record the sibling, then `index >>= 1`, `level_size = (level_size + 1) >> 1`
/// 4. Stop when the level holds a single node (the root)
///
/// # Errors
/// - `EmptyTxList` if `transactions` is empty
/// - `IndexOutOfRange` if `idx >= transactions.len()`
pub fn create_proof(transactions: &[Transaction], idx: usize) -> Result<MerkleProof, RelayerError> {
    if transactions.is_empty() {
        return Err(RelayerError::EmptyTxList);
    }
    if idx >= transactions.len() {
        return Err(RelayerError::IndexOutOfRange {
            index: idx,
            len: transactions.len(),
        });
    }
    let tx_index = u32::try_from(idx).map_err(|_| RelayerError::IndexOutOfRange {
        index: idx,
        len: transactions.len(),
    })?;

    let mut level: Vec<Hash> = transactions.iter().map(Transaction::txid).collect();
    let mut index = idx;
    let mut sibling_hashes = Vec::new();

    while level.len() > 1 {
        let sibling = (index ^ 1).min(level.len() - 1);
        sibling_hashes.push(level[sibling]);

        level = next_level(&level);
        index >>= 1;
    }

    Ok(MerkleProof {
        sibling_hashes,
        tx_index,
    })
}

/// Merkle root over a list of txids. All-zero for an empty list.
pub fn compute_merkle_root(txids: &[Hash]) -> Hash {
    if txids.is_empty() {
        return [0u8; 32];
    }

    let mut level = txids.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Check a proof against an expected root.
pub fn verify_proof(txid: &Hash, proof: &MerkleProof, expected_root: &Hash) -> bool {
    proof.root_from_leaf(txid) == *expected_root
}

/// Build the SPV proof for transaction `idx` of `block`.
pub fn build_spv_proof(block: &IndexedBlock, idx: usize) -> Result<SpvProof, RelayerError> {
    let merkle_path = create_proof(&block.transactions, idx)?;
    Ok(SpvProof {
        block_hash: block.block_hash(),
        txid: block.transactions[idx].txid(),
        tx_index: merkle_path.tx_index,
        merkle_path,
    })
}

/// Parent level, duplicating the last node of an odd level.
fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|pair| {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            merkle_parent(left, right)
        })
        .collect()
}
