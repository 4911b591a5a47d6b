//! # Bitcoin SPV Relayer
//!
//! Keeps a remote Bitcoin light client in sync with a local Bitcoin node.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! The relayer mirrors the tail of the Bitcoin chain in a bounded cache,
//! submits every new header to the light client in order, handles chain
//! reorganizations, and builds Merkle inclusion proofs for transactions in
//! cached blocks.
//!
//! ## Failure Handling
//!
//! | Failure | Handling |
//! |---------|----------|
//! | Transient network error | Bounded exponential backoff with jitter |
//! | Header already submitted | Treated as success |
//! | Invalid header / unknown parent | Returned immediately |
//! | Cache and chain disagree | Full re-bootstrap |
//! | Bootstrap keeps failing | Fatal, reported from `stop` |
//!
//! ## Module Structure
//!
//! ```text
//! btc-spv-relayer/
//! ├── domain/          # Blocks, BlockCache, events, proofs, errors
//! ├── algorithms/      # Merkle proofs, header batching
//! ├── ports/           # RelayerApi (inbound) + BtcNode/LightClient (outbound)
//! ├── application/     # Retry, submitter, bootstrap, event processor, service
//! ├── shutdown.rs      # Cancellation shared by every blocking loop
//! └── config.rs        # RelayerConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod shutdown;

#[cfg(test)]
mod proptest;

// Re-exports
pub use algorithms::{
    build_spv_proof, chunk_blocks, compute_merkle_root, create_proof, find_start_point,
    prepare_batches, verify_proof,
};
pub use application::{
    BootstrapController, EventOutcome, EventProcessor, HeaderSubmitter, NoProofs,
    ProcessorExit, ProofSelector, RelayerService, RetryExecutor, RetryPolicy, WatchedTxids,
};
pub use config::RelayerConfig;
pub use domain::{
    BlockCache, BlockEvent, BlockEventKind, BlockHeader, BootstrapReport, BootstrapState,
    ChainTip, ErrorClass, ErrorKind, Hash, HeaderBatch, IndexedBlock, MerkleProof, RelayerError,
    SpvProof, SpvStatus, SubmissionReport, Transaction,
    DEFAULT_CONFIRMATION_DEPTH, DEFAULT_MAX_HEADERS_PER_SUBMISSION, MIN_BTC_CACHE_SIZE,
};
pub use ports::{
    BlockEventStream, BtcNode, LightClient, MockBtcNode, MockLightClient, RelayerApi,
};
pub use shutdown::{shutdown_channel, ShutdownListener, ShutdownSignal};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
