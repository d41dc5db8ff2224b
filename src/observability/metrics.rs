//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reactor_probes_total` (counter): probes by method, outcome
//! - `reactor_endpoint_health` (gauge): 1=alive, 0=failed, per endpoint
//! - `reactor_endpoints_blocked_total` (counter): blocks by network
//! - `reactor_blocklist_size` (gauge): current blocklist entries
//! - `reactor_failsafe_resets_total` (counter): failsafe resets by network
//!
//! Recording is a no-op until a recorder is installed.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on `addr`. Requires a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(method: &'static str, outcome: &'static str) {
    counter!("reactor_probes_total", "method" => method, "outcome" => outcome).increment(1);
}

pub fn record_endpoint_health(uri: &str, alive: bool) {
    gauge!("reactor_endpoint_health", "endpoint" => uri.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}

pub fn record_endpoint_blocked(network: u64) {
    counter!("reactor_endpoints_blocked_total", "network" => network.to_string()).increment(1);
}

pub fn record_blocklist_size(size: usize) {
    gauge!("reactor_blocklist_size").set(size as f64);
}

pub fn record_failsafe_reset(network: u64) {
    counter!("reactor_failsafe_resets_total", "network" => network.to_string()).increment(1);
}
