//! # Relayer Benchmarks
//!
//! Hot paths of the relayer: proof construction over large blocks and cache
//! operations in the steady-state window.

pub mod block_cache;
pub mod merkle_proofs;
