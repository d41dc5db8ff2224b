//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the catalog is usable (ids unique, endpoints present and parseable)
//! - Validate value ranges (timeouts, window and threshold > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReactorConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ReactorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no networks configured")]
    NoNetworks,

    #[error("network {0} is configured more than once")]
    DuplicateNetwork(u64),

    #[error("network {0} has no primary or fallback endpoints")]
    EmptyNetwork(u64),

    #[error("network {network}: invalid endpoint '{url}': {reason}")]
    InvalidUrl {
        network: u64,
        url: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("default network {0} is not in the catalog")]
    UnknownDefaultNetwork(u64),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ReactorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.networks.is_empty() {
        errors.push(ValidationError::NoNetworks);
    }

    let mut seen = HashSet::new();
    for network in &config.networks {
        if !seen.insert(network.network_id) {
            errors.push(ValidationError::DuplicateNetwork(network.network_id));
        }

        if network.rpc_urls.is_empty() && network.fallback_rpc_urls.is_empty() {
            errors.push(ValidationError::EmptyNetwork(network.network_id));
        }

        for url in network.rpc_urls.iter().chain(&network.fallback_rpc_urls) {
            if let Err(reason) = check_endpoint_url(url) {
                errors.push(ValidationError::InvalidUrl {
                    network: network.network_id,
                    url: url.clone(),
                    reason,
                });
            }
        }
    }

    let health = &config.health_check;
    if health.timeout_secs == 0 {
        errors.push(ValidationError::Zero("health_check.timeout_secs"));
    }
    if health.failure_window_secs == 0 {
        errors.push(ValidationError::Zero("health_check.failure_window_secs"));
    }
    if health.max_failed_connections == 0 {
        errors.push(ValidationError::Zero("health_check.max_failed_connections"));
    }

    if let Some(id) = config.default_network {
        if !config.networks.iter().any(|n| n.network_id == id) {
            errors.push(ValidationError::UnknownDefaultNetwork(id));
        }
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(
            obs.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}
