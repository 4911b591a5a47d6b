//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports:
//! retries, header submission, bootstrap, live event processing and the
//! relayer service tying them together.

pub mod bootstrap;
pub mod processor;
pub mod retry;
pub mod service;
pub mod submitter;

pub use bootstrap::BootstrapController;
pub use processor::{EventOutcome, EventProcessor, ProcessorExit};
pub use retry::{RetryExecutor, RetryPolicy, EXPECTED_ERRORS, UNRECOVERABLE_ERRORS};
pub use service::RelayerService;
pub use submitter::{HeaderSubmitter, NoProofs, ProofSelector, WatchedTxids};
