//! # Algorithms Module
//!
//! Pure relayer algorithms: Merkle proofs and header batching.

pub mod header_batch;
pub mod merkle_proof;

pub use header_batch::{chunk_blocks, find_start_point, prepare_batches};
pub use merkle_proof::{build_spv_proof, compute_merkle_root, create_proof, verify_proof};
