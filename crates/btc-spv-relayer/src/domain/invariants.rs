//! # Domain Invariants
//!
//! Rules the block cache and the live event feed must satisfy.

use super::entities::{hash_to_hex, IndexedBlock};
use super::errors::{Hash, RelayerError};
use std::sync::Arc;

/// Smallest cache window accepted by configuration.
pub const MIN_BTC_CACHE_SIZE: usize = 1000;

/// Default reorg-safety window (k).
pub const DEFAULT_CONFIRMATION_DEPTH: u64 = 6;

/// Default maximum number of headers per light client call.
pub const DEFAULT_MAX_HEADERS_PER_SUBMISSION: usize = 100;

/// Invariant: cached blocks are strictly ascending and contiguous by height.
pub fn invariant_contiguous_heights(blocks: &[Arc<IndexedBlock>]) -> Result<(), RelayerError> {
    for window in blocks.windows(2) {
        let (prev, curr) = (&window[0], &window[1]);
        if curr.height != prev.height + 1 {
            return Err(RelayerError::UnorderedInput {
                previous: prev.height,
                got: curr.height,
            });
        }
    }
    Ok(())
}

/// Invariant: the cache never holds more than `max_entries` blocks.
pub fn invariant_within_capacity(len: usize, max_entries: usize) -> Result<(), RelayerError> {
    if len > max_entries {
        return Err(RelayerError::CacheOverflow { len, max_entries });
    }
    Ok(())
}

/// Invariant: a connected block must build directly on the cached tip.
pub fn invariant_extends_tip(
    prev_block: &Hash,
    tip_hash: &Hash,
    height: u64,
    tip_height: u64,
) -> Result<(), RelayerError> {
    if prev_block != tip_hash {
        return Err(RelayerError::Inconsistency(format!(
            "block at height {} has parent {}, cache tip {} is {}",
            height,
            hash_to_hex(prev_block),
            tip_height,
            hash_to_hex(tip_hash)
        )));
    }

    if height != tip_height + 1 {
        return Err(RelayerError::Inconsistency(format!(
            "block height {} does not follow cache tip {}",
            height, tip_height
        )));
    }

    Ok(())
}

/// Invariant: disconnects only ever remove the cached tip.
pub fn invariant_disconnects_tip(
    event_hash: &Hash,
    tip_hash: &Hash,
    height: u64,
) -> Result<(), RelayerError> {
    if event_hash != tip_hash {
        return Err(RelayerError::Inconsistency(format!(
            "disconnected block {} at height {} is not the cache tip {}",
            hash_to_hex(event_hash),
            height,
            hash_to_hex(tip_hash)
        )));
    }
    Ok(())
}
