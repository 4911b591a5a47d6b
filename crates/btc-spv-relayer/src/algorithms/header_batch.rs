//! # Header Batching
//!
//! Skips the prefix of a block run the light client already knows and splits
//! the remainder into bounded submission batches.

use crate::domain::{Hash, HeaderBatch, IndexedBlock, RelayerError};
use std::future::Future;
use std::sync::Arc;

/// Split `blocks` into contiguous batches of at most `chunk_size` headers.
///
/// Returns no batches for an empty input or a zero chunk size.
pub fn chunk_blocks(blocks: &[Arc<IndexedBlock>], chunk_size: usize) -> Vec<HeaderBatch> {
    if chunk_size == 0 || blocks.is_empty() {
        return Vec::new();
    }

    blocks
        .chunks(chunk_size)
        .map(|chunk| HeaderBatch {
            from_height: chunk[0].height,
            to_height: chunk[chunk.len() - 1].height,
            headers: chunk.iter().map(|block| block.header).collect(),
        })
        .collect()
}

/// Index of the first block the light client does not know yet, if any.
pub async fn find_start_point<F, Fut>(
    blocks: &[Arc<IndexedBlock>],
    mut contains: F,
) -> Result<Option<usize>, RelayerError>
where
    F: FnMut(Hash) -> Fut,
    Fut: Future<Output = Result<bool, RelayerError>>,
{
    for (index, block) in blocks.iter().enumerate() {
        if !contains(block.block_hash()).await? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Batches of headers still missing from the light client.
///
/// `contains` queries the light client; an empty result means every block is
/// already known and nothing needs submitting.
pub async fn prepare_batches<F, Fut>(
    blocks: &[Arc<IndexedBlock>],
    max_batch_size: usize,
    contains: F,
) -> Result<Vec<HeaderBatch>, RelayerError>
where
    F: FnMut(Hash) -> Fut,
    Fut: Future<Output = Result<bool, RelayerError>>,
{
    match find_start_point(blocks, contains).await? {
        Some(start_point) => Ok(chunk_blocks(&blocks[start_point..], max_batch_size)),
        None => Ok(Vec::new()),
    }
}
