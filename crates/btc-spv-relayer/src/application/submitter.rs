//! # Header Submitter
//!
//! Relays a run of blocks to the light client: headers first, deduplicated
//! against what the light client already holds, then SPV proofs for the
//! transactions a [`ProofSelector`] picks out.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::algorithms::{build_spv_proof, prepare_batches};
use crate::application::retry::RetryExecutor;
use crate::domain::{
    hash_to_hex, short_hash, Hash, IndexedBlock, RelayerError, SpvStatus, SubmissionReport,
};
use crate::ports::LightClient;

/// Chooses which transactions of a block get an SPV proof.
pub trait ProofSelector: Send + Sync {
    /// Indices of the transactions to prove, ascending.
    fn select(&self, block: &IndexedBlock) -> Vec<usize>;
}

/// Relay headers only.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProofs;

impl ProofSelector for NoProofs {
    fn select(&self, _block: &IndexedBlock) -> Vec<usize> {
        Vec::new()
    }
}

/// Prove every transaction whose txid is in the watch set.
#[derive(Clone, Debug, Default)]
pub struct WatchedTxids {
    txids: HashSet<Hash>,
}

impl WatchedTxids {
    /// Watch the given txids.
    pub fn new(txids: impl IntoIterator<Item = Hash>) -> Self {
        Self {
            txids: txids.into_iter().collect(),
        }
    }
}

impl ProofSelector for WatchedTxids {
    fn select(&self, block: &IndexedBlock) -> Vec<usize> {
        block
            .txids()
            .iter()
            .enumerate()
            .filter(|(_, txid)| self.txids.contains(*txid))
            .map(|(index, _)| index)
            .collect()
    }
}

/// Submits headers and proofs through the retry executor.
pub struct HeaderSubmitter<L: LightClient> {
    light_client: Arc<L>,
    retry: RetryExecutor,
    max_headers_per_submission: usize,
    selector: Arc<dyn ProofSelector>,
}

impl<L: LightClient> HeaderSubmitter<L> {
    /// Create a submitter.
    pub fn new(
        light_client: Arc<L>,
        retry: RetryExecutor,
        max_headers_per_submission: usize,
        selector: Arc<dyn ProofSelector>,
    ) -> Self {
        Self {
            light_client,
            retry,
            max_headers_per_submission,
            selector,
        }
    }

    /// Bring the light client up to date with `blocks` (ascending, contiguous).
    ///
    /// Blocks the light client already holds are skipped; proofs are only
    /// built for blocks whose headers were submitted in this call.
    pub async fn submit_blocks(
        &self,
        blocks: &[Arc<IndexedBlock>],
    ) -> Result<SubmissionReport, RelayerError> {
        let mut report = SubmissionReport::default();

        let batches = prepare_batches(blocks, self.max_headers_per_submission, |hash| {
            self.contains_block(hash)
        })
        .await?;

        let Some(first) = batches.first() else {
            debug!(blocks = blocks.len(), "[relayer] Light client already holds every block");
            return Ok(report);
        };
        let first_new_height = first.from_height;

        for batch in &batches {
            self.retry
                .retry_do(|| self.light_client.insert_headers(&batch.headers))
                .await?;
            info!(
                from = batch.from_height,
                to = batch.to_height,
                count = batch.len(),
                "[relayer] Submitted headers"
            );
            report.headers_submitted += batch.len();
        }

        for block in blocks.iter().filter(|b| b.height >= first_new_height) {
            report.proofs_submitted += self.submit_proofs(block).await?;
        }

        Ok(report)
    }

    /// Submit SPV proofs for the selected transactions of `block`.
    pub async fn submit_proofs(&self, block: &IndexedBlock) -> Result<usize, RelayerError> {
        let mut submitted = 0;
        for index in self.selector.select(block) {
            let proof = build_spv_proof(block, index)?;
            let status = self
                .retry
                .retry_do(|| self.light_client.verify_spv(&proof))
                .await?;

            match status {
                Some(SpvStatus::Valid) | None => {
                    info!(
                        height = block.height,
                        txid = %hash_to_hex(&proof.txid),
                        "[relayer] SPV proof accepted"
                    );
                }
                Some(SpvStatus::Rejected { code }) => {
                    warn!(
                        height = block.height,
                        block = %short_hash(&proof.block_hash),
                        txid = %hash_to_hex(&proof.txid),
                        code,
                        "[relayer] SPV proof rejected"
                    );
                }
            }
            submitted += 1;
        }
        Ok(submitted)
    }

    async fn contains_block(&self, hash: Hash) -> Result<bool, RelayerError> {
        let known = self
            .retry
            .retry_do(|| self.light_client.contains_block(hash))
            .await?;
        Ok(known.unwrap_or(false))
    }
}
