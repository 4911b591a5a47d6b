//! # Relayer Service
//!
//! Owns the worker task of the relayer and implements [`RelayerApi`].
//!
//! ## Lifecycle
//!
//! ```text
//! start ─→ spawn worker ─→ bootstrap ─→ process events ─┐
//!                              ↑                         │ inconsistency
//!                              └─────────────────────────┘
//! stop ──→ signal shutdown ─→ join worker ─→ fatal error or Ok
//! ```
//!
//! Each `start` creates a fresh generation: a new shutdown signal and new
//! retry executor, submitter, bootstrap controller and event processor. The
//! cache is shared across generations and replaced by every bootstrap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::algorithms::build_spv_proof;
use crate::application::bootstrap::BootstrapController;
use crate::application::processor::{EventProcessor, ProcessorExit};
use crate::application::retry::RetryExecutor;
use crate::application::submitter::{HeaderSubmitter, NoProofs, ProofSelector};
use crate::config::RelayerConfig;
use crate::domain::{BlockCache, RelayerError, SpvProof};
use crate::ports::{BtcNode, LightClient, RelayerApi};
use crate::shutdown::{shutdown_channel, ShutdownSignal};

struct Worker {
    signal: ShutdownSignal,
    handle: JoinHandle<Result<(), RelayerError>>,
}

/// Relayer service - keeps a light client in sync with a Bitcoin node.
pub struct RelayerService<N: BtcNode + 'static, L: LightClient + 'static> {
    config: RelayerConfig,
    node: Arc<N>,
    light_client: Arc<L>,
    cache: Arc<BlockCache>,
    selector: Arc<dyn ProofSelector>,
    worker: Mutex<Option<Worker>>,
    running: Arc<AtomicBool>,
    exited: Arc<watch::Sender<bool>>,
}

impl<N: BtcNode + 'static, L: LightClient + 'static> RelayerService<N, L> {
    /// Create a stopped relayer.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration does not validate
    pub fn new(config: RelayerConfig, node: Arc<N>, light_client: Arc<L>) -> Result<Self, RelayerError> {
        config.validate()?;
        let cache = Arc::new(BlockCache::new(config.btc_cache_size)?);
        let (exited, _) = watch::channel(true);
        Ok(Self {
            config,
            node,
            light_client,
            cache,
            selector: Arc::new(NoProofs),
            worker: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
            exited: Arc::new(exited),
        })
    }

    /// Choose which transactions get SPV proofs. Applies from the next `start`.
    pub fn with_selector(mut self, selector: Arc<dyn ProofSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &RelayerConfig {
        &self.config
    }

    /// Shared block cache.
    pub fn cache(&self) -> &Arc<BlockCache> {
        &self.cache
    }

    /// Stop the worker, then the node and light client connections.
    pub async fn close(&self) -> Result<(), RelayerError> {
        let result = self.stop().await;
        self.node.stop().await;
        self.light_client.stop().await;
        self.node.wait_for_shutdown().await;
        info!("[relayer] Connections closed");
        result
    }

    fn spawn_worker(&self) -> Worker {
        let (signal, listener) = shutdown_channel();
        let retry = RetryExecutor::from_config(&self.config, listener);
        let submitter = Arc::new(HeaderSubmitter::new(
            self.light_client.clone(),
            retry.clone(),
            self.config.max_headers_per_submission,
            self.selector.clone(),
        ));
        let bootstrap = BootstrapController::new(
            self.config.clone(),
            self.cache.clone(),
            self.node.clone(),
            self.light_client.clone(),
            submitter.clone(),
            retry.clone(),
        );
        let processor = EventProcessor::new(self.cache.clone(), self.node.clone(), submitter, retry);

        self.running.store(true, Ordering::SeqCst);
        self.exited.send_replace(false);
        let running = self.running.clone();
        let exited = self.exited.clone();

        // The inner task may panic inside an adapter. The outer task always
        // clears the flags and turns the panic into `WorkerFailed`.
        let handle = tokio::spawn(async move {
            let result = match tokio::spawn(run_worker(bootstrap, processor)).await {
                Ok(result) => result,
                Err(err) => {
                    error!(error = %err, "[relayer] Worker task failed, relayer stopping");
                    Err(RelayerError::WorkerFailed(err.to_string()))
                }
            };
            running.store(false, Ordering::SeqCst);
            exited.send_replace(true);
            result
        });

        Worker { signal, handle }
    }
}

/// Bootstrap, follow events, and bootstrap again whenever the processor
/// reports an inconsistency.
async fn run_worker<N: BtcNode, L: LightClient>(
    bootstrap: BootstrapController<N, L>,
    processor: EventProcessor<N, L>,
) -> Result<(), RelayerError> {
    loop {
        let (mut events, _report) = match bootstrap.bootstrap_with_retries().await {
            Ok(bootstrapped) => bootstrapped,
            Err(RelayerError::Shutdown) => return Ok(()),
            Err(err) => {
                error!(error = %err, "[relayer] Fatal error, relayer stopping");
                return Err(err);
            }
        };

        match processor.run(&mut events).await {
            Ok(ProcessorExit::Shutdown) => return Ok(()),
            Ok(ProcessorExit::Rebootstrap(reason)) => {
                warn!(reason = %reason, "[relayer] Re-bootstrapping");
            }
            Err(err) => {
                error!(error = %err, "[relayer] Fatal error, relayer stopping");
                return Err(err);
            }
        }
    }
}

async fn join(worker: Worker) -> Result<(), RelayerError> {
    worker.signal.trigger();
    worker
        .handle
        .await
        .map_err(|err| RelayerError::WorkerFailed(err.to_string()))?
}

#[async_trait]
impl<N: BtcNode + 'static, L: LightClient + 'static> RelayerApi for RelayerService<N, L> {
    async fn start(&self) -> Result<(), RelayerError> {
        let mut worker = self.worker.lock().await;

        if let Some(previous) = worker.take() {
            if !previous.handle.is_finished() {
                *worker = Some(previous);
                return Err(RelayerError::AlreadyRunning);
            }
            if let Err(err) = join(previous).await {
                warn!(error = %err, "[relayer] Discarding error of previous worker");
            }
        }

        *worker = Some(self.spawn_worker());
        info!(
            confirmation_depth = self.config.confirmation_depth,
            "[relayer] Relayer started"
        );
        Ok(())
    }

    async fn stop(&self) -> Result<(), RelayerError> {
        let mut worker = self.worker.lock().await;
        let Some(current) = worker.take() else {
            return Ok(());
        };
        let result = join(current).await;
        info!("[relayer] Relayer stopped");
        result
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn wait_for_exit(&self) {
        let mut exited = self.exited.subscribe();
        loop {
            let done = *exited.borrow_and_update();
            if done || exited.changed().await.is_err() {
                return;
            }
        }
    }

    fn prove_transaction(&self, height: u64, tx_index: usize) -> Result<SpvProof, RelayerError> {
        let block = self
            .cache
            .find_block(height)
            .ok_or(RelayerError::BlockNotFound(height))?;
        build_spv_proof(&block, tx_index)
    }
}
