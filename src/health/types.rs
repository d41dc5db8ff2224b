//! Health records, probe methods and probe outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::clock::Timestamp;
use crate::transport::TransportError;

/// Per-endpoint failure record, persisted as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStats {
    #[serde(default)]
    pub failed_connection_count: u32,
    #[serde(default)]
    pub last_failed_connection_at: Timestamp,
}

impl ConnectionStats {
    /// Record produced by one more failure at `now`.
    ///
    /// Failures accumulate while the previous one is younger than `window`;
    /// otherwise the count restarts at 1.
    pub fn next_failure(self, now: Timestamp, window: Duration) -> Self {
        let window_ms = window.as_millis() as u64;
        let within_window = now.saturating_sub(self.last_failed_connection_at) < window_ms;

        let failed_connection_count = if self.failed_connection_count > 0 && within_window {
            self.failed_connection_count + 1
        } else {
            1
        };

        Self {
            failed_connection_count,
            last_failed_connection_at: now,
        }
    }
}

/// Health probe RPC methods, issued in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    /// `net_peerCount`: a freshly restarted node reports zero peers.
    PeerCount,
    /// `eth_syncing`: anything but `false` means the node is catching up.
    Syncing,
}

impl ProbeMethod {
    pub const SEQUENCE: [ProbeMethod; 2] = [ProbeMethod::PeerCount, ProbeMethod::Syncing];

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeMethod::PeerCount => "net_peerCount",
            ProbeMethod::Syncing => "eth_syncing",
        }
    }

    pub fn request_id(self) -> u64 {
        match self {
            ProbeMethod::PeerCount => 74,
            ProbeMethod::Syncing => 67,
        }
    }

    pub fn is_valid(self, result: &Value) -> bool {
        is_valid_result(self.as_str(), result)
    }
}

/// Validity predicate for a probe result, keyed by RPC method name.
///
/// A peer count is rejected only when it encodes zero. Unrecognized methods
/// are always invalid.
pub fn is_valid_result(method: &str, result: &Value) -> bool {
    match method {
        "net_peerCount" => !is_zero_hex_quantity(result),
        "eth_syncing" => *result == Value::Bool(false),
        _ => false,
    }
}

fn is_zero_hex_quantity(result: &Value) -> bool {
    let Some(raw) = result.as_str() else {
        return false;
    };
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(digits) => !digits.is_empty() && digits.chars().all(|c| c == '0'),
        None => false,
    }
}

/// Why a probe sequence failed.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("{method} failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("{method} returned unhealthy result {result}")]
    Invalid { method: &'static str, result: Value },

    #[error("{method} timed out after {after:?}")]
    Timeout {
        method: &'static str,
        after: Duration,
    },

    #[error("probe cancelled")]
    Cancelled,

    #[error("probe task aborted: {0}")]
    Aborted(String),
}

impl ProbeFailure {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeFailure::Transport { .. } => "transport",
            ProbeFailure::Invalid { .. } => "invalid",
            ProbeFailure::Timeout { .. } => "timeout",
            ProbeFailure::Cancelled => "cancelled",
            ProbeFailure::Aborted(_) => "aborted",
        }
    }
}

/// Result of checking one endpoint.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Every probe passed; carries the endpoint unchanged.
    Alive(String),
    Failed(ProbeFailure),
}

impl ProbeOutcome {
    pub fn is_alive(&self) -> bool {
        matches!(self, ProbeOutcome::Alive(_))
    }

    pub fn alive_uri(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Alive(uri) => Some(uri),
            ProbeOutcome::Failed(_) => None,
        }
    }

    pub fn into_alive(self) -> Option<String> {
        match self {
            ProbeOutcome::Alive(uri) => Some(uri),
            ProbeOutcome::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINUTE: u64 = 60_000;
    const WINDOW: Duration = Duration::from_secs(15 * 60);

    #[test]
    fn test_first_failure_starts_at_one() {
        let stats = ConnectionStats::default().next_failure(5 * MINUTE, WINDOW);
        assert_eq!(stats.failed_connection_count, 1);
        assert_eq!(stats.last_failed_connection_at, 5 * MINUTE);
    }

    #[test]
    fn test_failures_accumulate_within_window() {
        let stats = ConnectionStats {
            failed_connection_count: 2,
            last_failed_connection_at: 100 * MINUTE,
        };
        let next = stats.next_failure(110 * MINUTE, WINDOW);
        assert_eq!(next.failed_connection_count, 3);
        assert_eq!(next.last_failed_connection_at, 110 * MINUTE);
    }

    #[test]
    fn test_window_expiry_restarts_count() {
        let stats = ConnectionStats {
            failed_connection_count: 4,
            last_failed_connection_at: 100 * MINUTE,
        };
        assert_eq!(stats.next_failure(116 * MINUTE, WINDOW).failed_connection_count, 1);
        // Exactly at the window edge counts as elapsed
        assert_eq!(stats.next_failure(115 * MINUTE, WINDOW).failed_connection_count, 1);
    }

    #[test]
    fn test_stats_json_shape() {
        let stats = ConnectionStats {
            failed_connection_count: 1,
            last_failed_connection_at: 42,
        };
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            json!({"failedConnectionCount": 1, "lastFailedConnectionAt": 42})
        );
        let empty: ConnectionStats = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ConnectionStats::default());
    }

    #[test]
    fn test_peer_count_validity() {
        assert!(!is_valid_result("net_peerCount", &json!("0x0")));
        assert!(!is_valid_result("net_peerCount", &json!("0x00")));
        assert!(is_valid_result("net_peerCount", &json!("0x1")));
        assert!(is_valid_result("net_peerCount", &json!("0x19")));
        assert!(is_valid_result("net_peerCount", &json!("0xffffffffffffffffffffffffffffffffffff")));
    }

    #[test]
    fn test_peer_count_only_rejects_zero() {
        assert!(is_valid_result("net_peerCount", &json!("garbage")));
        assert!(is_valid_result("net_peerCount", &json!("0x")));
        assert!(is_valid_result("net_peerCount", &json!(3)));
        assert!(is_valid_result("net_peerCount", &json!(0)));
        assert!(is_valid_result("net_peerCount", &Value::Null));
    }

    #[test]
    fn test_syncing_validity() {
        assert!(is_valid_result("eth_syncing", &json!(false)));
        assert!(!is_valid_result("eth_syncing", &json!(true)));
        assert!(!is_valid_result(
            "eth_syncing",
            &json!({"currentBlock": "0x10", "highestBlock": "0x20"})
        ));
        assert!(!is_valid_result("eth_syncing", &json!("false")));
    }

    #[test]
    fn test_unrecognized_method_is_invalid() {
        assert!(!is_valid_result("eth_blockNumber", &json!("0x10")));
        assert!(!is_valid_result("", &json!(false)));
    }

    #[test]
    fn test_probe_method_sequence() {
        assert_eq!(ProbeMethod::SEQUENCE[0].as_str(), "net_peerCount");
        assert_eq!(ProbeMethod::SEQUENCE[1].as_str(), "eth_syncing");
        assert!(ProbeMethod::Syncing.is_valid(&json!(false)));
    }

    #[test]
    fn test_outcome_accessors() {
        let alive = ProbeOutcome::Alive("https://a".into());
        assert!(alive.is_alive());
        assert_eq!(alive.alive_uri(), Some("https://a"));

        let failed = ProbeOutcome::Failed(ProbeFailure::Cancelled);
        assert!(!failed.is_alive());
        assert!(failed.alive_uri().is_none());
        assert!(failed.into_alive().is_none());
        assert_eq!(ProbeFailure::Cancelled.kind(), "cancelled");
    }
}
