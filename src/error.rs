//! Crate-level error type.
//!
//! Probe failures never surface here: they are absorbed by the failure
//! tracker and blocklist. Only configuration problems and the terminal
//! "nothing is live" condition reach callers.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::network::NetworkId;
use crate::transport::TransportError;

/// Errors returned by the consumer-facing surface.
#[derive(Debug, Error)]
pub enum ReactorError {
    /// The requested network is not in the catalog.
    #[error("Unknown network {0}")]
    UnknownNetwork(NetworkId),

    /// The network has neither primary nor fallback endpoints.
    #[error("Network {0} has no endpoints configured")]
    EmptyNetwork(NetworkId),

    /// Every eligible endpoint failed its health check.
    #[error("No live endpoint for network {0}")]
    NoLiveEndpoint(NetworkId),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client could not be built.
    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),

    /// Session store could not be opened.
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for reactor operations.
pub type ReactorResult<T> = Result<T, ReactorError>;
