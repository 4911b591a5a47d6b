//! # Bitcoin SPV Relayer Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Merkle proof and cache performance
//! ├── fixtures.rs       # Chain builders shared by tests and benches
//! └── integration/      # Relayer flows against in-memory node and light client
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p relayer-tests
//!
//! # Integration flows with logs
//! RUST_LOG=btc_spv_relayer=debug cargo test -p relayer-tests integration::
//!
//! # Benchmarks
//! cargo bench -p relayer-tests
//! ```

pub mod benchmarks;
pub mod fixtures;
