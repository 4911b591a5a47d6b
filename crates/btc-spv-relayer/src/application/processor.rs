//! # Event Processor
//!
//! Steady-state loop: applies connect/disconnect events to the cache and
//! relays every newly connected block to the light client.
//!
//! ## Rules
//!
//! | Event | Condition | Action |
//! |-------|-----------|--------|
//! | Connected | below the cache window | ignored (stale) |
//! | Connected | same hash already cached | ignored (duplicate) |
//! | Connected | other hash at a cached height | re-bootstrap |
//! | Connected | parent is not the cache tip | re-bootstrap |
//! | Connected | extends the tip | cache, then submit |
//! | Disconnected | is the cache tip | drop the tip |
//! | Disconnected | anything else | re-bootstrap |
//!
//! A re-bootstrap leaves the cache untouched; the next bootstrap replaces it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::retry::RetryExecutor;
use crate::application::submitter::HeaderSubmitter;
use crate::domain::{
    invariant_disconnects_tip, invariant_extends_tip, short_hash, BlockCache, BlockEvent,
    BlockEventKind, RelayerError, SubmissionReport,
};
use crate::ports::{BlockEventStream, BtcNode, LightClient};

/// What a single event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// Block appended to the cache and relayed.
    Connected {
        /// Height of the new tip
        height: u64,
        /// What was sent to the light client
        report: SubmissionReport,
    },
    /// Cache tip removed.
    Disconnected {
        /// Height of the removed block
        height: u64,
    },
    /// Event for a height older than the cache window.
    Stale {
        /// Event height
        height: u64,
    },
    /// Event for a block the cache already holds.
    Duplicate {
        /// Event height
        height: u64,
    },
}

/// Why the processing loop returned.
#[derive(Debug)]
pub enum ProcessorExit {
    /// Shutdown was signalled.
    Shutdown,
    /// Cache and chain diverged; the caller must bootstrap again.
    Rebootstrap(RelayerError),
}

/// Consumes live block events for one relayer generation.
pub struct EventProcessor<N: BtcNode, L: LightClient> {
    cache: Arc<BlockCache>,
    node: Arc<N>,
    submitter: Arc<HeaderSubmitter<L>>,
    retry: RetryExecutor,
}

impl<N: BtcNode, L: LightClient> EventProcessor<N, L> {
    /// Create a processor over shared components.
    pub fn new(
        cache: Arc<BlockCache>,
        node: Arc<N>,
        submitter: Arc<HeaderSubmitter<L>>,
        retry: RetryExecutor,
    ) -> Self {
        Self {
            cache,
            node,
            submitter,
            retry,
        }
    }

    /// Process events until shutdown, a closed stream or a failure.
    ///
    /// # Errors
    /// Only fatal errors (see [`RelayerError::is_fatal`]); everything else
    /// ends the loop with [`ProcessorExit::Rebootstrap`].
    pub async fn run(&self, events: &mut BlockEventStream) -> Result<ProcessorExit, RelayerError> {
        let shutdown = self.retry.shutdown().clone();

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.wait() => return Ok(ProcessorExit::Shutdown),
                event = events.recv() => event,
            };

            let Some(event) = event else {
                warn!("[relayer] Block event stream closed");
                return Ok(ProcessorExit::Rebootstrap(RelayerError::Network(
                    "block event stream closed".to_string(),
                )));
            };

            match self.handle_event(&event).await {
                Ok(outcome) => debug!(?outcome, "[relayer] Event handled"),
                Err(RelayerError::Shutdown) => return Ok(ProcessorExit::Shutdown),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(
                        height = event.height,
                        block = %short_hash(&event.block_hash()),
                        error = %err,
                        "[relayer] Event processing failed, re-bootstrapping"
                    );
                    return Ok(ProcessorExit::Rebootstrap(err));
                }
            }
        }
    }

    /// Apply one event.
    ///
    /// # Errors
    /// - `Inconsistency` if the event contradicts the cache; the cache is
    ///   left as it was
    /// - fetch or submission failures for a connected block
    pub async fn handle_event(&self, event: &BlockEvent) -> Result<EventOutcome, RelayerError> {
        match event.kind {
            BlockEventKind::Connected => self.handle_connected(event).await,
            BlockEventKind::Disconnected => self.handle_disconnected(event),
        }
    }

    async fn handle_connected(&self, event: &BlockEvent) -> Result<EventOutcome, RelayerError> {
        let Some(first) = self.cache.first() else {
            return Err(RelayerError::Inconsistency(format!(
                "connected block at height {} with an empty cache",
                event.height
            )));
        };
        if event.height < first.height {
            debug!(height = event.height, "[relayer] Ignoring stale connected event");
            return Ok(EventOutcome::Stale {
                height: event.height,
            });
        }

        let event_hash = event.block_hash();
        if let Some(cached) = self.cache.find_block(event.height) {
            let cached_hash = cached.block_hash();
            if cached_hash == event_hash {
                return Ok(EventOutcome::Duplicate {
                    height: event.height,
                });
            }
            return Err(RelayerError::Inconsistency(format!(
                "connected block {} at height {} differs from cached {}",
                short_hash(&event_hash),
                event.height,
                short_hash(&cached_hash)
            )));
        }

        let block = self
            .retry
            .retry_value("get_block_by_hash", || self.node.get_block_by_hash(event_hash))
            .await?;
        let tip = self.cache.tip().ok_or(RelayerError::EmptyCache)?;
        invariant_extends_tip(&block.header.prev_block, &tip.block_hash(), block.height, tip.height)?;

        let block = Arc::new(block);
        self.cache.add(block.clone())?;
        info!(
            height = block.height,
            block = %short_hash(&event_hash),
            "[relayer] Block connected"
        );

        let report = self.submitter.submit_blocks(&[block]).await?;
        Ok(EventOutcome::Connected {
            height: event.height,
            report,
        })
    }

    fn handle_disconnected(&self, event: &BlockEvent) -> Result<EventOutcome, RelayerError> {
        let Some(tip) = self.cache.tip() else {
            return Err(RelayerError::Inconsistency(format!(
                "disconnected block at height {} with an empty cache",
                event.height
            )));
        };
        invariant_disconnects_tip(&event.block_hash(), &tip.block_hash(), event.height)?;

        let removed = self.cache.remove_last()?;
        info!(
            height = removed.height,
            block = %short_hash(&removed.block_hash()),
            "[relayer] Block disconnected"
        );
        Ok(EventOutcome::Disconnected {
            height: removed.height,
        })
    }
}
