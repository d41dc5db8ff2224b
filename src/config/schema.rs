//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the reactor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the endpoint reactor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReactorConfig {
    /// Network the client runs on. Defaults to the first catalog entry.
    pub default_network: Option<u64>,

    /// Network catalog: primary and fallback endpoints per network.
    pub networks: Vec<NetworkConfig>,

    /// Probe timeout and blocking policy.
    pub health_check: HealthCheckConfig,

    /// How a live endpoint is picked for connections.
    pub selection: SelectionConfig,

    /// Session store backing.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ReactorConfig {
    /// Network id the client runs on.
    pub fn run_network_id(&self) -> Option<u64> {
        self.default_network
            .or_else(|| self.networks.first().map(|n| n.network_id))
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NetworkConfig {
    /// Chain id (e.g., 56 for BNB Smart Chain).
    pub network_id: u64,

    /// Human readable chain name.
    pub chain_name: String,

    /// Primary JSON-RPC endpoints. Order matters; duplicates weight selection.
    #[serde(default)]
    pub rpc_urls: Vec<String>,

    /// Endpoints substituted when every primary endpoint is blocked.
    #[serde(default)]
    pub fallback_rpc_urls: Vec<String>,

    /// Native currency, needed to add the chain to a wallet.
    #[serde(default)]
    pub native_currency: Option<NativeCurrency>,

    /// Block explorers, needed to add the chain to a wallet.
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

/// Native currency metadata.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Window in seconds within which failures accumulate.
    pub failure_window_secs: u64,

    /// Failures within the window before an endpoint is blocked.
    pub max_failed_connections: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            failure_window_secs: 15 * 60,
            max_failed_connections: 1,
        }
    }
}

/// Load balancing strategy over live endpoints.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Rotate through live endpoints.
    #[default]
    RoundRobin,
    /// Always use the first live endpoint in catalog order.
    Ordered,
}

/// Selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SelectionConfig {
    pub strategy: SelectionStrategy,
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the session. In-memory when absent.
    pub path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
