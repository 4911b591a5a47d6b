//! # Domain Errors
//!
//! Error taxonomy for the relayer. Every error maps to an [`ErrorKind`]
//! (its identity) and an [`ErrorClass`] (how callers must react to it).

use thiserror::Error;

/// Hash type alias (32-byte double SHA-256, internal byte order).
pub type Hash = [u8; 32];

/// Relayer error types.
#[derive(Debug, Error)]
pub enum RelayerError {
    /// `init` was handed more blocks than the cache may hold, or the cache
    /// could not restore its bound on `add`.
    #[error("Block cache overflow: {len} blocks > {max_entries} max entries")]
    CacheOverflow {
        /// Number of blocks that would be held
        len: usize,
        /// Configured capacity
        max_entries: usize,
    },

    /// Blocks were not strictly ascending and contiguous by height.
    #[error("Unordered block input: height {got} follows {previous}")]
    UnorderedInput {
        /// Height of the preceding block
        previous: u64,
        /// Offending height
        got: u64,
    },

    /// Operation needs at least one cached block.
    #[error("Block cache is empty")]
    EmptyCache,

    /// Cache capacity must be positive.
    #[error("Invalid cache capacity: {0}")]
    InvalidCapacity(usize),

    /// Merkle proof requested over an empty transaction list.
    #[error("Cannot build a Merkle proof over an empty transaction list")]
    EmptyTxList,

    /// Transaction index is not inside the block.
    #[error("Transaction index {index} out of range for {len} transactions")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of transactions
        len: usize,
    },

    /// Header bytes could not be decoded.
    #[error("Malformed block header: expected 80 bytes, got {0}")]
    MalformedHeader(usize),

    /// Light client rejected a header as invalid.
    #[error("Header invalid: {0}")]
    HeaderInvalid(String),

    /// Light client does not know the parent of a submitted header.
    #[error("Parent not found for header {0}")]
    ParentNotFound(String),

    /// Light client already holds the submitted header.
    #[error("Header already submitted")]
    HeaderAlreadySubmitted,

    /// Network or RPC failure talking to the node or the light client.
    #[error("Network error: {0}")]
    Network(String),

    /// Retry budget exhausted on a transient failure.
    #[error("Retry timed out after {attempts} attempts: {source}")]
    Timeout {
        /// Number of invocations made
        attempts: u32,
        /// Last error observed
        #[source]
        source: Box<RelayerError>,
    },

    /// Cache and live chain disagree; only a full re-bootstrap can recover.
    #[error("Chain inconsistency: {0}")]
    Inconsistency(String),

    /// Bootstrap kept failing until its attempt ceiling.
    #[error("Bootstrap failed after {attempts} attempts: {last}")]
    BootstrapExhausted {
        /// Attempts made
        attempts: u32,
        /// Error of the final attempt
        last: Box<RelayerError>,
    },

    /// No cached block at the requested height.
    #[error("Block not found at height {0}")]
    BlockNotFound(u64),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `start` called while a worker is still live.
    #[error("Relayer is already running")]
    AlreadyRunning,

    /// Shutdown was signalled while the operation was blocked.
    #[error("Relayer is shutting down")]
    Shutdown,

    /// The worker task panicked or was aborted.
    #[error("Relayer worker failed: {0}")]
    WorkerFailed(String),
}

/// Identity of an error, used by retry policies to match errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`RelayerError::CacheOverflow`]
    CacheOverflow,
    /// See [`RelayerError::UnorderedInput`]
    UnorderedInput,
    /// See [`RelayerError::EmptyCache`]
    EmptyCache,
    /// See [`RelayerError::InvalidCapacity`]
    InvalidCapacity,
    /// See [`RelayerError::EmptyTxList`]
    EmptyTxList,
    /// See [`RelayerError::IndexOutOfRange`]
    IndexOutOfRange,
    /// See [`RelayerError::MalformedHeader`]
    MalformedHeader,
    /// See [`RelayerError::HeaderInvalid`]
    HeaderInvalid,
    /// See [`RelayerError::ParentNotFound`]
    ParentNotFound,
    /// See [`RelayerError::HeaderAlreadySubmitted`]
    HeaderAlreadySubmitted,
    /// See [`RelayerError::Network`]
    Network,
    /// See [`RelayerError::Timeout`]
    Timeout,
    /// See [`RelayerError::Inconsistency`]
    Inconsistency,
    /// See [`RelayerError::BootstrapExhausted`]
    BootstrapExhausted,
    /// See [`RelayerError::BlockNotFound`]
    BlockNotFound,
    /// See [`RelayerError::InvalidConfig`]
    InvalidConfig,
    /// See [`RelayerError::AlreadyRunning`]
    AlreadyRunning,
    /// See [`RelayerError::Shutdown`]
    Shutdown,
    /// See [`RelayerError::WorkerFailed`]
    WorkerFailed,
}

/// How a failed network operation is handled by the retry executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Returned immediately, never retried.
    Unrecoverable,
    /// Desired end state already holds; treated as success.
    Expected,
    /// Retried with bounded exponential backoff.
    Transient,
}

impl RelayerError {
    /// Identity of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CacheOverflow { .. } => ErrorKind::CacheOverflow,
            Self::UnorderedInput { .. } => ErrorKind::UnorderedInput,
            Self::EmptyCache => ErrorKind::EmptyCache,
            Self::InvalidCapacity(_) => ErrorKind::InvalidCapacity,
            Self::EmptyTxList => ErrorKind::EmptyTxList,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::MalformedHeader(_) => ErrorKind::MalformedHeader,
            Self::HeaderInvalid(_) => ErrorKind::HeaderInvalid,
            Self::ParentNotFound(_) => ErrorKind::ParentNotFound,
            Self::HeaderAlreadySubmitted => ErrorKind::HeaderAlreadySubmitted,
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Inconsistency(_) => ErrorKind::Inconsistency,
            Self::BootstrapExhausted { .. } => ErrorKind::BootstrapExhausted,
            Self::BlockNotFound(_) => ErrorKind::BlockNotFound,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::AlreadyRunning => ErrorKind::AlreadyRunning,
            Self::Shutdown => ErrorKind::Shutdown,
            Self::WorkerFailed(_) => ErrorKind::WorkerFailed,
        }
    }

    /// Errors that stop the relayer instead of triggering a re-bootstrap.
    ///
    /// `CacheOverflow` and `UnorderedInput` only reach the event loop from
    /// `BlockCache::add`, where they mean the cache invariant was broken.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::BootstrapExhausted { .. }
                | Self::CacheOverflow { .. }
                | Self::UnorderedInput { .. }
                | Self::WorkerFailed(_)
        )
    }
}
