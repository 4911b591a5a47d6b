//! # Ports Module
//!
//! Hexagonal architecture ports: the inbound relayer API and the outbound
//! Bitcoin node / light client dependencies, plus in-memory mocks.

pub mod inbound;
pub mod mock;
pub mod outbound;

pub use inbound::RelayerApi;
pub use mock::{MockBtcNode, MockLightClient};
pub use outbound::{BlockEventStream, BtcNode, LightClient};
