//! # Block Cache
//!
//! Bounded, height-ordered window over the chain tail the relayer trusts.
//!
//! The first block is the oldest trusted ancestor and the last block is the
//! current tip. Every operation takes the lock internally and releases it
//! before returning, so callers never hold it across I/O.

use super::entities::IndexedBlock;
use super::errors::RelayerError;
use super::invariants::{invariant_contiguous_heights, invariant_within_capacity};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug)]
struct CacheInner {
    blocks: VecDeque<Arc<IndexedBlock>>,
    max_entries: usize,
}

/// Sliding window of recent blocks, oldest first.
#[derive(Debug)]
pub struct BlockCache {
    inner: RwLock<CacheInner>,
}

impl BlockCache {
    /// Create an empty cache bounded to `max_entries` blocks.
    ///
    /// # Errors
    /// - `InvalidCapacity` if `max_entries` is zero
    pub fn new(max_entries: usize) -> Result<Self, RelayerError> {
        if max_entries == 0 {
            return Err(RelayerError::InvalidCapacity(max_entries));
        }
        Ok(Self {
            inner: RwLock::new(CacheInner {
                blocks: VecDeque::with_capacity(max_entries.min(4096)),
                max_entries,
            }),
        })
    }

    /// Replace the cache contents with a sorted batch.
    ///
    /// # Errors
    /// - `CacheOverflow` if the batch is larger than the capacity
    /// - `UnorderedInput` if heights are not strictly ascending and contiguous
    pub fn init(&self, blocks: Vec<IndexedBlock>) -> Result<(), RelayerError> {
        let blocks: Vec<Arc<IndexedBlock>> = blocks.into_iter().map(Arc::new).collect();

        let mut inner = self.inner.write();
        invariant_within_capacity(blocks.len(), inner.max_entries)?;
        invariant_contiguous_heights(&blocks)?;
        inner.blocks = blocks.into();
        Ok(())
    }

    /// Append a block at the tip, evicting the oldest block when full.
    ///
    /// # Errors
    /// - `UnorderedInput` if the block does not directly follow the tip
    /// - `CacheOverflow` if the cache is already over its bound
    pub fn add(&self, block: impl Into<Arc<IndexedBlock>>) -> Result<(), RelayerError> {
        let block = block.into();

        let mut inner = self.inner.write();
        if let Some(tip) = inner.blocks.back() {
            if block.height != tip.height + 1 {
                return Err(RelayerError::UnorderedInput {
                    previous: tip.height,
                    got: block.height,
                });
            }
        }
        invariant_within_capacity(inner.blocks.len(), inner.max_entries)?;

        if inner.blocks.len() == inner.max_entries {
            inner.blocks.pop_front();
        }
        inner.blocks.push_back(block);
        Ok(())
    }

    /// Drop the tip block.
    ///
    /// # Errors
    /// - `EmptyCache` if there is nothing to remove
    pub fn remove_last(&self) -> Result<Arc<IndexedBlock>, RelayerError> {
        self.inner
            .write()
            .blocks
            .pop_back()
            .ok_or(RelayerError::EmptyCache)
    }

    /// Oldest cached block.
    pub fn first(&self) -> Option<Arc<IndexedBlock>> {
        self.inner.read().blocks.front().cloned()
    }

    /// Current tip.
    pub fn tip(&self) -> Option<Arc<IndexedBlock>> {
        self.inner.read().blocks.back().cloned()
    }

    /// Block at `height`, if cached.
    pub fn find_block(&self, height: u64) -> Option<Arc<IndexedBlock>> {
        let inner = self.inner.read();
        inner
            .blocks
            .binary_search_by_key(&height, |block| block.height)
            .ok()
            .and_then(|index| inner.blocks.get(index).cloned())
    }

    /// Change the capacity bound. Eviction is deferred to [`BlockCache::trim`].
    ///
    /// # Errors
    /// - `InvalidCapacity` if `max_entries` is zero
    pub fn resize(&self, max_entries: usize) -> Result<(), RelayerError> {
        if max_entries == 0 {
            return Err(RelayerError::InvalidCapacity(max_entries));
        }
        self.inner.write().max_entries = max_entries;
        Ok(())
    }

    /// Evict from the front until the cache fits its bound. Returns the
    /// number of evicted blocks.
    pub fn trim(&self) -> usize {
        let mut inner = self.inner.write();
        let excess = inner.blocks.len().saturating_sub(inner.max_entries);
        inner.blocks.drain(..excess);
        excess
    }

    /// Drop every cached block, keeping the bound.
    pub fn clear(&self) {
        self.inner.write().blocks.clear();
    }

    /// Number of cached blocks.
    pub fn size(&self) -> usize {
        self.inner.read().blocks.len()
    }

    /// True if no block is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.read().blocks.is_empty()
    }

    /// Current capacity bound.
    pub fn max_entries(&self) -> usize {
        self.inner.read().max_entries
    }

    /// Point-in-time snapshot of the cached blocks, oldest first.
    pub fn blocks(&self) -> Vec<Arc<IndexedBlock>> {
        self.inner.read().blocks.iter().cloned().collect()
    }
}
