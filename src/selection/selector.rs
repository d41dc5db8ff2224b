//! Endpoint selection and health sweeps for a network.
//!
//! # Responsibilities
//! - Filter a network's primary endpoints against the blocklist
//! - Substitute the fallback tier when nothing primary is left
//! - Probe every eligible endpoint concurrently
//! - Gate re-discovery with the retry-once guard

use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::SelectionStrategy;
use crate::error::{ReactorError, ReactorResult};
use crate::health::{EndpointHealthChecker, EndpointHealthContext, ProbeFailure, ProbeOutcome};
use crate::lifecycle::cancel::CancelSignal;
use crate::network::NetworkId;
use crate::selection::{balancer_for, LoadBalancer};
use crate::transport::RpcTransport;

/// Orchestrates catalog, blocklist and health checker for callers.
pub struct EndpointSelector {
    context: Arc<EndpointHealthContext>,
    checker: Arc<EndpointHealthChecker>,
    balancer: Box<dyn LoadBalancer>,
}

impl EndpointSelector {
    pub fn new(context: Arc<EndpointHealthContext>, transport: Arc<dyn RpcTransport>) -> Self {
        Self::with_strategy(context, transport, SelectionStrategy::default())
    }

    pub fn with_strategy(
        context: Arc<EndpointHealthContext>,
        transport: Arc<dyn RpcTransport>,
        strategy: SelectionStrategy,
    ) -> Self {
        let checker = Arc::new(EndpointHealthChecker::new(context.clone(), transport));
        Self {
            context,
            checker,
            balancer: balancer_for(strategy),
        }
    }

    pub fn context(&self) -> &Arc<EndpointHealthContext> {
        &self.context
    }

    pub fn checker(&self) -> &Arc<EndpointHealthChecker> {
        &self.checker
    }

    /// Primary endpoints not on the blocklist, or the fallback list verbatim
    /// if none remain.
    ///
    /// Each blocklist entry removes one occurrence of its URI, so duplicated
    /// primaries keep their remaining copies.
    pub fn get_eligible_endpoints(&self, network_id: NetworkId) -> ReactorResult<Vec<String>> {
        let network = self.context.catalog().get(network_id)?;
        if network.primary_uris().is_empty() && network.fallback_uris().is_empty() {
            return Err(ReactorError::EmptyNetwork(network_id));
        }

        let mut blocked: HashSet<String> =
            self.context.blocklist().snapshot().into_keys().collect();
        let eligible: Vec<String> = network
            .primary_uris()
            .iter()
            .filter(|uri| !blocked.remove(uri.as_str()))
            .cloned()
            .collect();

        if eligible.is_empty() {
            tracing::debug!(network = %network_id, "All primary endpoints blocked, using fallbacks");
            return Ok(network.fallback_uris().to_vec());
        }
        Ok(eligible)
    }

    /// Probe every eligible endpoint concurrently.
    ///
    /// Outcomes are in eligible-list order. Failed probes have already been
    /// recorded against the tracker / blocklist when this returns.
    pub async fn check_all_nodes_status(
        &self,
        network_id: NetworkId,
    ) -> ReactorResult<Vec<ProbeOutcome>> {
        let checked = self.probe_all(network_id, None).await?;
        Ok(checked.into_iter().map(|(_, outcome)| outcome).collect())
    }

    /// As `check_all_nodes_status`; triggering `cancel` fails the probes
    /// still in flight.
    pub async fn check_all_nodes_status_cancellable(
        &self,
        network_id: NetworkId,
        cancel: &CancelSignal,
    ) -> ReactorResult<Vec<ProbeOutcome>> {
        let checked = self.check_endpoints_cancellable(network_id, cancel).await?;
        Ok(checked.into_iter().map(|(_, outcome)| outcome).collect())
    }

    /// Cancellable sweep that pairs each outcome with the endpoint it was
    /// taken from.
    pub async fn check_endpoints_cancellable(
        &self,
        network_id: NetworkId,
        cancel: &CancelSignal,
    ) -> ReactorResult<Vec<(String, ProbeOutcome)>> {
        self.probe_all(network_id, Some(cancel)).await
    }

    /// Endpoints that passed a fresh health check.
    pub async fn live_endpoints(&self, network_id: NetworkId) -> ReactorResult<Vec<String>> {
        let outcomes = self.check_all_nodes_status(network_id).await?;
        Ok(outcomes
            .into_iter()
            .filter_map(ProbeOutcome::into_alive)
            .collect())
    }

    /// Pick a live endpoint, re-running discovery once per session if the
    /// first sweep finds nothing.
    pub async fn connect_endpoint(&self, network_id: NetworkId) -> ReactorResult<String> {
        let live = self.live_endpoints(network_id).await?;
        if let Some(uri) = self.balancer.next_endpoint(&live) {
            return Ok(uri);
        }

        if self.retry_on_invalid() {
            tracing::info!(network = %network_id, "No live endpoint, retrying discovery");
            let live = self.live_endpoints(network_id).await?;
            if let Some(uri) = self.balancer.next_endpoint(&live) {
                return Ok(uri);
            }
        }

        tracing::error!(network = %network_id, "No live endpoint available");
        Err(ReactorError::NoLiveEndpoint(network_id))
    }

    /// True exactly once per session.
    pub fn retry_on_invalid(&self) -> bool {
        self.context.retry_on_invalid()
    }

    async fn probe_all(
        &self,
        network_id: NetworkId,
        cancel: Option<&CancelSignal>,
    ) -> ReactorResult<Vec<(String, ProbeOutcome)>> {
        let uris = self.get_eligible_endpoints(network_id)?;

        // Spawned so a dropped caller cannot leave a probe unrecorded
        let handles: Vec<_> = uris
            .iter()
            .map(|uri| {
                let checker = self.checker.clone();
                let uri = uri.clone();
                let token = cancel.map(CancelSignal::token);
                tokio::spawn(async move {
                    match token {
                        Some(token) => {
                            checker
                                .check_node_status_cancellable(&uri, network_id, token)
                                .await
                        }
                        None => checker.check_node_status(&uri, network_id).await,
                    }
                })
            })
            .collect();

        let joined = join_all(handles).await;

        let outcomes: Vec<(String, ProbeOutcome)> = uris
            .into_iter()
            .zip(joined)
            .map(|(uri, result)| {
                let outcome = match result {
                    Ok(outcome) => outcome,
                    Err(e) => self.checker.record_failure(
                        &uri,
                        network_id,
                        ProbeFailure::Aborted(e.to_string()),
                    ),
                };
                (uri, outcome)
            })
            .collect();

        let alive = outcomes.iter().filter(|(_, o)| o.is_alive()).count();
        tracing::info!(
            network = %network_id,
            probed = outcomes.len(),
            alive,
            blocked = self.context.blocklist().len(),
            "Endpoint health sweep complete"
        );
        Ok(outcomes)
    }
}
