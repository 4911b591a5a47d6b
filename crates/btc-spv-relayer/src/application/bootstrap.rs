//! # Bootstrap Controller
//!
//! Brings the relayer from an empty cache to a steady state that mirrors the
//! chain tail and is caught up with the light client.
//!
//! ```text
//! [WaitingForNodeSync] → [CacheInit] → [BacklogSubmit] → [LiveSubscribe] → [Steady]
//! ```
//!
//! Any failure aborts the attempt. Attempts repeat after a fixed delay until
//! the configured ceiling, after which the error is fatal.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::retry::RetryExecutor;
use crate::application::submitter::HeaderSubmitter;
use crate::config::RelayerConfig;
use crate::domain::{
    short_hash, BlockCache, BootstrapReport, BootstrapState, ChainTip, RelayerError,
    SubmissionReport,
};
use crate::ports::{BlockEventStream, BtcNode, LightClient};

/// Drives one relayer generation through bootstrap.
pub struct BootstrapController<N: BtcNode, L: LightClient> {
    config: RelayerConfig,
    cache: Arc<BlockCache>,
    node: Arc<N>,
    light_client: Arc<L>,
    submitter: Arc<HeaderSubmitter<L>>,
    retry: RetryExecutor,
}

impl<N: BtcNode, L: LightClient> BootstrapController<N, L> {
    /// Create a controller over shared components.
    pub fn new(
        config: RelayerConfig,
        cache: Arc<BlockCache>,
        node: Arc<N>,
        light_client: Arc<L>,
        submitter: Arc<HeaderSubmitter<L>>,
        retry: RetryExecutor,
    ) -> Self {
        Self {
            config,
            cache,
            node,
            light_client,
            submitter,
            retry,
        }
    }

    /// Run bootstrap attempts until one succeeds.
    ///
    /// Returns the live event stream subscribed during the successful attempt.
    ///
    /// # Errors
    /// - `BootstrapExhausted` once `bootstrap_max_attempts` attempts failed
    /// - `Shutdown` if shutdown is signalled
    pub async fn bootstrap_with_retries(
        &self,
    ) -> Result<(BlockEventStream, BootstrapReport), RelayerError> {
        let max_attempts = self.config.bootstrap_max_attempts;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let err = match self.bootstrap().await {
                Ok((events, submission)) => {
                    let report = BootstrapReport {
                        attempts,
                        cache_size: self.cache.size(),
                        tip_height: self.cache.tip().map_or(0, |tip| tip.height),
                        submission,
                    };
                    info!(
                        attempts,
                        cache_size = report.cache_size,
                        tip = report.tip_height,
                        headers = submission.headers_submitted,
                        "[relayer] Successfully bootstrapped"
                    );
                    return Ok((events, report));
                }
                Err(RelayerError::Shutdown) => return Err(RelayerError::Shutdown),
                Err(err) => err,
            };

            self.cache.clear();

            if attempts >= max_attempts {
                error!(attempts, error = %err, "[relayer] Bootstrap failed, giving up");
                return Err(RelayerError::BootstrapExhausted {
                    attempts,
                    last: Box::new(err),
                });
            }

            warn!(
                attempt = attempts,
                max_attempts,
                error = %err,
                "[relayer] Bootstrap attempt failed, retrying"
            );
            self.retry
                .shutdown()
                .sleep(self.config.bootstrap_attempt_fixed_delay())
                .await?;
        }
    }

    /// One bootstrap attempt.
    ///
    /// Reads are snapshot-based, so a tip that moves during the attempt is
    /// picked up by the subscription or the next attempt.
    pub async fn bootstrap(&self) -> Result<(BlockEventStream, SubmissionReport), RelayerError> {
        enter(BootstrapState::WaitingForNodeSync);
        let (node_tip, lc_tip) = self.wait_for_node_sync().await?;

        enter(BootstrapState::CacheInit);
        self.init_cache(&node_tip, &lc_tip).await?;

        enter(BootstrapState::BacklogSubmit);
        let submission = self.submitter.submit_blocks(&self.cache.blocks()).await?;

        enter(BootstrapState::LiveSubscribe);
        let events = self
            .retry
            .retry_value("subscribe_new_blocks", || self.node.subscribe_new_blocks())
            .await?;

        enter(BootstrapState::Steady);
        self.cache.resize(self.config.steady_cache_size())?;
        let evicted = self.cache.trim();
        debug!(evicted, size = self.cache.size(), "[relayer] Cache trimmed to confirmation window");

        Ok((events, submission))
    }

    /// Poll until the node is past genesis and at least as high as the
    /// light client.
    async fn wait_for_node_sync(&self) -> Result<(ChainTip, ChainTip), RelayerError> {
        loop {
            let node_tip = self
                .retry
                .retry_value("get_tip_block", || self.node.get_tip_block())
                .await?;
            let lc_tip = self
                .retry
                .retry_value("get_latest_block_info", || {
                    self.light_client.get_latest_block_info()
                })
                .await?;

            if node_tip.height > 0 && node_tip.height >= lc_tip.height {
                debug!(
                    node_height = node_tip.height,
                    lc_height = lc_tip.height,
                    "[relayer] Node synced past light client tip"
                );
                return Ok((node_tip, lc_tip));
            }

            info!(
                node_height = node_tip.height,
                lc_height = lc_tip.height,
                "[relayer] Waiting for node to catch up with light client"
            );
            self.retry
                .shutdown()
                .sleep(self.config.node_sync_poll_interval())
                .await?;
        }
    }

    /// Load `[lc_tip - k + 1, node_tip]` into the cache.
    async fn init_cache(&self, node_tip: &ChainTip, lc_tip: &ChainTip) -> Result<(), RelayerError> {
        self.cache.resize(self.config.btc_cache_size)?;

        let base_height = (lc_tip.height + 1).saturating_sub(self.config.confirmation_depth);
        let blocks = self
            .retry
            .retry_value("get_tail_blocks_by_height", || {
                self.node.get_tail_blocks_by_height(base_height)
            })
            .await?;

        match blocks.first() {
            Some(first) if first.height == base_height => {}
            first => {
                return Err(RelayerError::Inconsistency(format!(
                    "node returned tail starting at {:?}, expected {}",
                    first.map(|block| block.height),
                    base_height
                )));
            }
        }

        self.cache.init(blocks)?;
        debug!(
            base_height,
            node_tip = node_tip.height,
            node_hash = %short_hash(&node_tip.hash),
            size = self.cache.size(),
            "[relayer] Cache initialized"
        );
        Ok(())
    }
}

fn enter(state: BootstrapState) {
    debug!(state = %state, "[relayer] Bootstrap state");
}
