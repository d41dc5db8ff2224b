//! Two-phase endpoint liveness probe.
//!
//! # Responsibilities
//! - Probe `net_peerCount`, then `eth_syncing`, stopping at the first failure
//! - Bound every probe with its own timeout
//! - Feed failures into the tracker / blocklist
//!
//! # Design Decisions
//! - Transport errors, timeouts, unhealthy results and cancellation are all
//!   one failure; callers only see Alive or Failed
//! - Failures are always recorded before the outcome is returned

use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use crate::health::context::EndpointHealthContext;
use crate::health::types::{ProbeFailure, ProbeMethod, ProbeOutcome};
use crate::lifecycle::cancel::CancelToken;
use crate::network::NetworkId;
use crate::observability::metrics;
use crate::transport::{RpcRequest, RpcTransport};

pub struct EndpointHealthChecker {
    context: Arc<EndpointHealthContext>,
    transport: Arc<dyn RpcTransport>,
    timeout: Duration,
}

impl EndpointHealthChecker {
    pub fn new(context: Arc<EndpointHealthContext>, transport: Arc<dyn RpcTransport>) -> Self {
        let timeout = context.probe_timeout();
        Self {
            context,
            transport,
            timeout,
        }
    }

    pub fn context(&self) -> &Arc<EndpointHealthContext> {
        &self.context
    }

    /// Probe `uri`; returns it unchanged if alive.
    pub async fn check_node_status(&self, uri: &str, network_id: NetworkId) -> ProbeOutcome {
        let result = self.run_probes(uri).await;
        self.conclude(uri, network_id, result)
    }

    /// Like `check_node_status`, but a triggered token ends the probe as a
    /// failure.
    pub async fn check_node_status_cancellable(
        &self,
        uri: &str,
        network_id: NetworkId,
        mut cancel: CancelToken,
    ) -> ProbeOutcome {
        let result = if cancel.is_cancelled() {
            Err(ProbeFailure::Cancelled)
        } else {
            tokio::select! {
                result = self.run_probes(uri) => result,
                _ = cancel.cancelled() => Err(ProbeFailure::Cancelled),
            }
        };
        self.conclude(uri, network_id, result)
    }

    /// Record a failure that happened outside the probe itself.
    pub fn record_failure(
        &self,
        uri: &str,
        network_id: NetworkId,
        failure: ProbeFailure,
    ) -> ProbeOutcome {
        self.conclude(uri, network_id, Err(failure))
    }

    fn conclude(
        &self,
        uri: &str,
        network_id: NetworkId,
        result: Result<(), ProbeFailure>,
    ) -> ProbeOutcome {
        match result {
            Ok(()) => {
                tracing::debug!(endpoint = %uri, network = %network_id, "Endpoint alive");
                metrics::record_endpoint_health(uri, true);
                ProbeOutcome::Alive(uri.to_string())
            }
            Err(failure) => {
                let disposition = self.context.report_failure(uri, network_id);
                tracing::warn!(
                    endpoint = %uri,
                    network = %network_id,
                    error = %failure,
                    disposition = ?disposition,
                    "Endpoint health check failed"
                );
                metrics::record_endpoint_health(uri, false);
                ProbeOutcome::Failed(failure)
            }
        }
    }

    async fn run_probes(&self, uri: &str) -> Result<(), ProbeFailure> {
        for method in ProbeMethod::SEQUENCE {
            self.query(uri, method).await?;
        }
        Ok(())
    }

    async fn query(&self, uri: &str, method: ProbeMethod) -> Result<(), ProbeFailure> {
        let request = RpcRequest::new(method.as_str(), method.request_id());
        let name = method.as_str();

        let outcome = match time::timeout(self.timeout, self.transport.call(uri, &request)).await {
            Ok(Ok(result)) if method.is_valid(&result) => Ok(()),
            Ok(Ok(result)) => Err(ProbeFailure::Invalid {
                method: name,
                result,
            }),
            Ok(Err(source)) => Err(ProbeFailure::Transport {
                method: name,
                source,
            }),
            Err(_) => Err(ProbeFailure::Timeout {
                method: name,
                after: self.timeout,
            }),
        };

        let label = match &outcome {
            Ok(()) => "ok",
            Err(failure) => failure.kind(),
        };
        metrics::record_probe(name, label);
        outcome
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::HealthCheckConfig;
    use crate::lifecycle::cancel::CancelSignal;
    use crate::network::{NetworkCatalog, NetworkConfig};
    use crate::storage::MemoryStore;
    use crate::transport::TransportError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted reply for one (endpoint, method) pair.
    #[derive(Clone)]
    pub(crate) enum Reply {
        Result(Value),
        Status(u16),
        Hang,
    }

    /// Transport answering from a script; unscripted calls are healthy.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        replies: Mutex<HashMap<(String, &'static str), Reply>>,
        pub(crate) calls: Mutex<Vec<(String, &'static str)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn reply(&self, uri: &str, method: &'static str, reply: Reply) {
            self.replies
                .lock()
                .unwrap()
                .insert((uri.to_string(), method), reply);
        }

        pub(crate) fn fail(&self, uri: &str) {
            self.reply(uri, "net_peerCount", Reply::Status(500));
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn call(&self, uri: &str, request: &RpcRequest) -> Result<Value, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((uri.to_string(), request.method));
            let reply = self
                .replies
                .lock()
                .unwrap()
                .get(&(uri.to_string(), request.method))
                .cloned();

            match reply {
                Some(Reply::Result(value)) => Ok(value),
                Some(Reply::Status(code)) => Err(TransportError::Status(code)),
                Some(Reply::Hang) => std::future::pending().await,
                None => Ok(match request.method {
                    "net_peerCount" => json!("0x19"),
                    _ => json!(false),
                }),
            }
        }
    }

    pub(crate) fn context_with(
        primary: &[&str],
        fallback: &[&str],
    ) -> (Arc<MemoryStore>, Arc<EndpointHealthContext>) {
        let catalog = NetworkCatalog::new(vec![NetworkConfig {
            network_id: 56,
            chain_name: "bsc".into(),
            rpc_urls: primary.iter().map(|s| s.to_string()).collect(),
            fallback_rpc_urls: fallback.iter().map(|s| s.to_string()).collect(),
            native_currency: None,
            block_explorer_urls: Vec::new(),
        }]);
        let store = Arc::new(MemoryStore::new());
        let settings = HealthCheckConfig {
            timeout_secs: 1,
            ..HealthCheckConfig::default()
        };
        let ctx = EndpointHealthContext::with_clock(
            Arc::new(catalog),
            store.clone(),
            settings,
            Arc::new(ManualClock::new(1_000_000)),
        );
        (store, Arc::new(ctx))
    }

    fn checker(transport: Arc<ScriptedTransport>) -> (Arc<MemoryStore>, EndpointHealthChecker) {
        let (store, ctx) = context_with(&["https://a", "https://b"], &[]);
        (store, EndpointHealthChecker::new(ctx, transport))
    }

    #[tokio::test]
    async fn test_healthy_node_is_alive() {
        let transport = Arc::new(ScriptedTransport::default());
        let (store, checker) = checker(transport.clone());

        let outcome = checker.check_node_status("https://a", NetworkId(56)).await;
        assert_eq!(outcome.alive_uri(), Some("https://a"));
        assert_eq!(transport.call_count(), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_zero_peers_short_circuits() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.reply("https://a", "net_peerCount", Reply::Result(json!("0x0")));
        let (_, checker) = checker(transport.clone());

        let outcome = checker.check_node_status("https://a", NetworkId(56)).await;
        assert!(matches!(
            outcome,
            ProbeOutcome::Failed(ProbeFailure::Invalid { method: "net_peerCount", .. })
        ));
        // eth_syncing never issued
        assert_eq!(transport.call_count(), 1);
        assert!(checker.context().blocklist().is_blocked("https://a"));
    }

    #[tokio::test]
    async fn test_syncing_node_fails() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.reply(
            "https://a",
            "eth_syncing",
            Reply::Result(json!({"currentBlock": "0x1", "highestBlock": "0x2"})),
        );
        let (_, checker) = checker(transport.clone());

        let outcome = checker.check_node_status("https://a", NetworkId(56)).await;
        assert!(matches!(
            outcome,
            ProbeOutcome::Failed(ProbeFailure::Invalid { method: "eth_syncing", .. })
        ));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_is_recorded() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.fail("https://b");
        let (_, checker) = checker(transport);

        let outcome = checker.check_node_status("https://b", NetworkId(56)).await;
        assert!(matches!(
            outcome,
            ProbeOutcome::Failed(ProbeFailure::Transport {
                source: TransportError::Status(500),
                ..
            })
        ));
        assert!(checker.context().blocklist().is_blocked("https://b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_probe_times_out() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.reply("https://a", "eth_syncing", Reply::Hang);
        let (_, checker) = checker(transport);

        let outcome = checker.check_node_status("https://a", NetworkId(56)).await;
        assert!(matches!(
            outcome,
            ProbeOutcome::Failed(ProbeFailure::Timeout { method: "eth_syncing", .. })
        ));
        assert!(checker.context().blocklist().is_blocked("https://a"));
    }

    #[tokio::test]
    async fn test_cancelled_probe_is_recorded() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.reply("https://a", "net_peerCount", Reply::Hang);
        let (_, checker) = checker(transport);

        let signal = CancelSignal::new();
        let token = signal.token();
        signal.trigger();

        let outcome = checker
            .check_node_status_cancellable("https://a", NetworkId(56), token)
            .await;
        assert!(matches!(outcome, ProbeOutcome::Failed(ProbeFailure::Cancelled)));
        assert!(checker.context().blocklist().is_blocked("https://a"));
    }
}
