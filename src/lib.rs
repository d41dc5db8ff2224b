//! RPC endpoint health reactor.
//!
//! Keeps a dapp client pointed at a live JSON-RPC endpoint: probes primary
//! endpoints, blocks the ones that fail, falls back when needed and resets
//! itself when a network would otherwise be left with nothing.

// Foundations
pub mod clock;
pub mod config;
pub mod error;
pub mod network;
pub mod storage;
pub mod transport;

// Health and selection
pub mod health;
pub mod selection;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ReactorConfig;
pub use error::{ReactorError, ReactorResult};
pub use health::{EndpointHealthChecker, EndpointHealthContext, ProbeOutcome};
pub use lifecycle::CancelSignal;
pub use network::NetworkId;
pub use selection::EndpointSelector;
