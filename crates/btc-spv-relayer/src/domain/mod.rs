//! # Domain Module
//!
//! Core domain types for the relayer: Bitcoin blocks, the block cache,
//! live events, proofs and the error taxonomy.

pub mod cache;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use cache::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
