//! # Inbound Ports
//!
//! API trait defining what the relayer exposes to the embedding process.

use crate::domain::{RelayerError, SpvProof};
use async_trait::async_trait;

/// Relayer API - inbound port.
#[async_trait]
pub trait RelayerApi: Send + Sync {
    /// Spawn the relayer worker: bootstrap, then follow live events.
    ///
    /// Fails with `AlreadyRunning` while a worker is live. A worker that
    /// already exited on its own is reaped and replaced; its fatal error is
    /// logged and discarded. Call `stop` first to observe that error.
    async fn start(&self) -> Result<(), RelayerError>;

    /// Stop the worker. A no-op when already stopped.
    ///
    /// Returns the fatal error that ended the worker, if any.
    async fn stop(&self) -> Result<(), RelayerError>;

    /// True while a worker is live.
    fn is_running(&self) -> bool;

    /// Resolve once the worker has exited, for whatever reason.
    async fn wait_for_exit(&self);

    /// SPV proof for transaction `tx_index` of the cached block at `height`.
    fn prove_transaction(&self, height: u64, tx_index: usize) -> Result<SpvProof, RelayerError>;
}
